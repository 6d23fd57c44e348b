// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shell-facing text: export/unset lines, assignment parsing, prompt hooks and the
//! loaded-keys diff between successive `enva export` runs.

pub mod format;
pub mod hook;
pub mod loaded;
pub mod parse;

pub use format::{format_assignment, format_export, format_key_value, format_unset, single_quote};
pub use hook::{hook_script, Shell, UnsupportedShell};
pub use loaded::{plan_export, ExportPlan, LoadedState, LOADED_KEYS_VAR, LOADED_PATH_VAR};
pub use parse::{parse_assignment, parse_env_file, AssignmentError, ParseError};
