// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use log::warn;

use crate::model::{is_valid_key, ResolveContext};
use crate::shell::{format_export, format_unset};

/// Shell variable listing the keys loaded by the previous export, `:`-separated.
pub const LOADED_KEYS_VAR: &str = "__ENVA_LOADED_KEYS";
/// Shell variable holding the directory of the previous export.
pub const LOADED_PATH_VAR: &str = "__ENVA_LOADED_PATH";

/// What the previous `enva export` in this shell left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedState {
    keys: Vec<String>,
    path: Option<String>,
}

impl LoadedState {
    /// Reads the tracking variables of the current process.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(LOADED_KEYS_VAR).ok().as_deref(),
            std::env::var(LOADED_PATH_VAR).ok().as_deref(),
        )
    }

    pub fn from_vars(keys: Option<&str>, path: Option<&str>) -> Self {
        let keys = keys
            .unwrap_or_default()
            .split(':')
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect();
        let path = path.filter(|path| !path.is_empty()).map(str::to_owned);
        Self { keys, path }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Shell lines to move from the previous state to the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub lines: Vec<String>,
    /// Short notice for stderr, when anything visible changed.
    pub status: Option<String>,
    pub loaded: usize,
    pub unloaded: usize,
}

impl ExportPlan {
    /// Lines ready to be `eval`ed, newline terminated.
    pub fn script(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Diffs `previous` against the freshly resolved `ctx`.
///
/// Keys that disappeared are unset, every current value is exported, and the tracking
/// variables are refreshed (or unset once nothing remains loaded).
pub fn plan_export(ctx: &ResolveContext, previous: &LoadedState) -> ExportPlan {
    let current = ctx.sorted();
    let current_keys: BTreeSet<&str> = current.iter().map(|value| value.key.as_str()).collect();
    let previous_keys: BTreeSet<&str> = previous.keys.iter().map(String::as_str).collect();

    let mut lines = Vec::new();
    let mut unloaded = 0;
    for key in &previous_keys {
        if current_keys.contains(key) {
            continue;
        }
        if !is_valid_key(key) {
            warn!("ignoring invalid key {key:?} in {LOADED_KEYS_VAR}");
            continue;
        }
        lines.push(format_unset(key));
        unloaded += 1;
    }

    let mut loaded = 0;
    for value in &current {
        lines.push(format_export(value.key.as_str(), &value.value));
        if !previous_keys.contains(value.key.as_str()) {
            loaded += 1;
        }
    }

    let target = ctx.target().to_string();
    if !current.is_empty() {
        let joined = current.iter().map(|value| value.key.as_str()).collect::<Vec<_>>().join(":");
        lines.push(format_export(LOADED_KEYS_VAR, &joined));
        lines.push(format_export(LOADED_PATH_VAR, &target));
    } else if !previous.is_empty() {
        lines.push(format_unset(LOADED_KEYS_VAR));
        lines.push(format_unset(LOADED_PATH_VAR));
    }

    let moved = previous.path() != Some(target.as_str());
    let status = if unloaded > 0 && current.is_empty() {
        Some(format!("unloaded {unloaded} var(s)"))
    } else if (loaded > 0 || unloaded > 0) && moved {
        Some(format!("loaded {} var(s)", current.len()))
    } else {
        None
    };

    ExportPlan { lines, status, loaded, unloaded }
}
