// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! External editor round trip for the local values of a directory.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::model::{Entry, Key};
use crate::shell::{format_assignment, single_quote};

const FILE_HEADER: &str = "# enva: one KEY=value per line, `# text` after a value is its description.\n\
# Lines removed here are deleted from this directory.\n";

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to write temporary file {path}: {source}")]
    WriteTemp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read edited file {path}: {source}")]
    ReadBack {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid editor temp path")]
    InvalidPath,
    #[error("failed to run editor command `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("editor command failed with status {0}")]
    Failed(ExitStatus),
}

/// `VISUAL`, then `EDITOR`, then `vi`. Blank variables are skipped.
pub fn resolve_editor_command() -> String {
    env::var("VISUAL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env::var("EDITOR").ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_owned())
}

/// Text handed to the editor: a comment header and one assignment per key, sorted.
pub fn render_local_file(values: &BTreeMap<Key, Entry>) -> String {
    let mut out = String::from(FILE_HEADER);
    for (key, entry) in values {
        out.push_str(&format_assignment(key, entry));
        out.push('\n');
    }
    out
}

/// Opens `initial` in `command` and returns the saved text.
///
/// Blocks until the editor exits. The temp file is removed whether or not the editor succeeds.
pub fn edit_text(command: &str, initial: &str) -> Result<String, EditorError> {
    let path = write_temp_file(initial)?;
    let launched = launch_editor_command(command, &path);
    let edited = fs::read_to_string(&path)
        .map_err(|source| EditorError::ReadBack { path: path.clone(), source });
    let _ = fs::remove_file(&path);

    launched?;
    edited
}

fn write_temp_file(content: &str) -> Result<PathBuf, EditorError> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    let mut path = env::temp_dir();
    path.push(format!("enva-edit-{}-{ts}.env", std::process::id()));
    fs::write(&path, content).map_err(|source| EditorError::WriteTemp { path: path.clone(), source })?;
    Ok(path)
}

fn launch_editor_command(command: &str, path: &Path) -> Result<(), EditorError> {
    let path_text = path.to_string_lossy();
    if path_text.starts_with('-') {
        return Err(EditorError::InvalidPath);
    }

    debug!("launching editor `{command}` on {}", path.display());
    let status = Command::new("sh")
        .arg("-lc")
        .arg(format!("{command} {}", single_quote(path_text.as_ref())))
        .status()
        .map_err(|source| EditorError::Launch { command: command.to_owned(), source })?;
    if !status.success() {
        return Err(EditorError::Failed(status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{edit_text, render_local_file, EditorError};
    use crate::model::{Entry, Key};
    use crate::shell::parse_env_file;

    #[test]
    fn rendered_file_parses_back_to_the_same_values() {
        let mut values = BTreeMap::new();
        values.insert(Key::new("PLAIN").unwrap(), Entry::new("abc"));
        values.insert(
            Key::new("SPACED").unwrap(),
            Entry::new("two words").with_description(Some("note".to_owned())),
        );
        values.insert(Key::new("QUOTE").unwrap(), Entry::new("it's\nmultiline"));

        let text = render_local_file(&values);
        assert!(text.starts_with("# enva:"));
        assert_eq!(parse_env_file(&text).unwrap(), values);
    }

    #[test]
    fn edit_text_returns_editor_output() {
        let edited = edit_text("sh -c 'printf \"KEY=new\\n\" > \"$1\"' --", "KEY=old\n").unwrap();
        assert_eq!(edited, "KEY=new\n");
    }

    #[test]
    fn unchanged_when_editor_is_a_noop() {
        assert_eq!(edit_text("true", "A=1\n").unwrap(), "A=1\n");
    }

    #[test]
    fn failing_editor_is_an_error() {
        let err = edit_text("false", "A=1\n").unwrap_err();
        assert!(matches!(err, EditorError::Failed(_)));
    }
}
