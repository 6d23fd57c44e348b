// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Enva CLI entrypoint.
//!
//! Shell integration: `eval "$(enva hook bash)"`, `eval "$(enva hook zsh)"` or
//! `enva hook fish | source`. The hook runs `enva export` at every prompt so values follow `cd`.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};

use enva::config::Config;
use enva::editor::{edit_text, render_local_file};
use enva::model::{Entry, Key, ResolvedValue};
use enva::path::{find_root, Scope};
use enva::resolve::Resolver;
use enva::shell::{
    format_key_value, hook_script, parse_env_file, plan_export, LoadedState, Shell,
};

const LOG_ENV: &str = "ENVA_LOG";

#[derive(Parser)]
#[command(name = "enva")]
#[command(about = "Per-directory environment variables with inheritance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Profile to read and write (overrides ENVA_PROFILE)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Database file (overrides ENVA_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print shell hook code (bash, zsh, fish)
    Hook {
        #[arg(value_parser = parse_shell)]
        shell: Shell,
    },
    /// Print export/unset lines for the current directory
    Export,
    /// Set a variable at the current directory
    Set {
        /// KEY=VALUE
        assignment: String,
        /// Description stored next to the value
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Remove a variable from the current directory
    Unset { key: String },
    /// List effective variables, sorted by key
    Ls {
        /// Only values defined at the current directory
        #[arg(long)]
        local: bool,
        /// Emit JSON with provenance
        #[arg(long)]
        json: bool,
    },
    /// List directories that hold values for the active profile
    Scopes {
        /// Only directories inside the current project root
        #[arg(long)]
        here: bool,
    },
    /// Edit local variables in $EDITOR
    Edit,
    /// Run a command with the effective variables merged into the environment
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Launch the interactive TUI
    Tui,
}

fn parse_shell(raw: &str) -> Result<Shell, String> {
    raw.parse::<Shell>().map_err(|err| err.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli) {
        eprintln!("enva: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "warn"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if cli.quiet {
        builder.filter_level(LevelFilter::Error);
    }
    if matches!(cli.command, Commands::Tui) && env::var_os(LOG_ENV).is_none() {
        builder.filter_level(LevelFilter::Off);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Hook { shell } = &cli.command {
        print!("{}", hook_script(*shell));
        return Ok(());
    }

    let config = Config::load(cli.db, cli.profile).context("failed to load configuration")?;
    debug!("database {} profile {}", config.db_path.display(), config.profile);
    let mut resolver = config.open_resolver().context("failed to open database")?;
    let cwd = env::current_dir().context("failed to get cwd")?;

    match cli.command {
        Commands::Hook { .. } => Ok(()),
        Commands::Export => export(&resolver, &cwd),
        Commands::Set { assignment, description } => {
            set(&mut resolver, &cwd, &assignment, description)
        }
        Commands::Unset { key } => unset(&mut resolver, &cwd, &key),
        Commands::Ls { local, json } => ls(&resolver, &cwd, local, json),
        Commands::Scopes { here } => scopes(&resolver, &cwd, here),
        Commands::Edit => edit(&mut resolver, &cwd, &config.editor),
        Commands::Run { command } => run_command(&resolver, &cwd, &command),
        Commands::Tui => enva::tui::run(resolver, &cwd, config.editor).context("tui failed"),
    }
}

fn export(resolver: &Resolver, cwd: &Path) -> Result<()> {
    let ctx = resolver.resolve(cwd).context("failed to resolve environment")?;
    let plan = plan_export(&ctx, &LoadedState::from_env());
    print!("{}", plan.script());
    if let Some(status) = plan.status {
        eprintln!("enva: {status}");
    }
    Ok(())
}

fn set(resolver: &mut Resolver, cwd: &Path, assignment: &str, description: Option<String>) -> Result<()> {
    let Some((raw_key, value)) = assignment.split_once('=') else {
        bail!("invalid format: expected KEY=VALUE");
    };
    let key = Key::new(raw_key.trim())?;
    let scope = Scope::canonicalize(cwd)?;
    let entry = Entry::new(value).with_description(description);
    resolver.set_value(&scope, &key, &entry).context("failed to set variable")?;
    println!("Set {key} at {scope}");
    Ok(())
}

fn unset(resolver: &mut Resolver, cwd: &Path, raw_key: &str) -> Result<()> {
    let key = Key::new(raw_key)?;
    let scope = Scope::canonicalize(cwd)?;
    if resolver.delete_value(&scope, &key).context("failed to unset variable")? {
        println!("Unset {key} at {scope}");
        return Ok(());
    }

    let ctx = resolver.resolve(cwd).context("failed to resolve environment")?;
    match ctx.get(key.as_str()) {
        Some(value) => println!("{key} is not set here (inherited from {})", value.defined_at),
        None => println!("{key} is not set at {scope}"),
    }
    Ok(())
}

fn ls(resolver: &Resolver, cwd: &Path, local: bool, json: bool) -> Result<()> {
    let ctx = resolver.resolve(cwd).context("failed to resolve environment")?;
    let values: Vec<&ResolvedValue> = if local { ctx.local() } else { ctx.sorted() };

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &values).context("failed to encode JSON")?;
        writeln!(stdout)?;
    } else {
        for value in values {
            writeln!(stdout, "{}", format_key_value(value.key.as_str(), &value.value))?;
        }
    }
    Ok(())
}

fn scopes(resolver: &Resolver, cwd: &Path, here: bool) -> Result<()> {
    let root = if here { Some(find_root(&Scope::canonicalize(cwd)?)) } else { None };
    let summaries = resolver.store().scopes(resolver.profile()).context("failed to list scopes")?;
    let mut stdout = io::stdout().lock();
    for summary in summaries {
        if root.as_ref().is_some_and(|root| !root.is_ancestor_of(&summary.scope)) {
            continue;
        }
        writeln!(stdout, "{}\t{}", summary.value_count, summary.scope)?;
    }
    Ok(())
}

fn edit(resolver: &mut Resolver, cwd: &Path, editor: &str) -> Result<()> {
    let scope = Scope::canonicalize(cwd)?;
    let original = resolver.local_values(&scope).context("failed to get local vars")?;
    let initial = render_local_file(&original);
    let edited = edit_text(editor, &initial)?;
    if edited == initial {
        println!("No changes at {scope}");
        return Ok(());
    }

    let entries = parse_env_file(&edited)?;
    resolver.replace_local_values(&scope, &entries).context("failed to sync vars")?;
    println!("Updated local vars at {scope}");
    Ok(())
}

fn run_command(resolver: &Resolver, cwd: &Path, command: &[String]) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("no command specified");
    };
    let ctx = resolver.resolve(cwd).context("failed to resolve environment")?;

    let mut child = Command::new(program);
    child.args(args);
    for value in ctx.sorted() {
        child.env(value.key.as_str(), &value.value);
    }
    exec(child, program)
}

#[cfg(unix)]
fn exec(mut command: Command, program: &str) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let err = command.exec();
    Err(err).with_context(|| format!("command not found: {program}"))
}

#[cfg(not(unix))]
fn exec(mut command: Command, program: &str) -> Result<()> {
    let status = command.status().with_context(|| format!("command not found: {program}"))?;
    std::process::exit(status.code().unwrap_or(1));
}
