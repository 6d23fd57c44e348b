// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Entry, Key};

/// `export KEY='value'`, safe to `eval` in any POSIX shell.
pub fn format_export(key: &str, value: &str) -> String {
    format!("export {key}={}", single_quote(value))
}

pub fn format_unset(key: &str) -> String {
    format!("unset {key}")
}

/// `KEY=value` without quoting, for display and clipboard.
pub fn format_key_value(key: &str, value: &str) -> String {
    format!("{key}={value}")
}

/// Editable `KEY=value # description` line; quotes the value only when a bare form would not
/// parse back to the same text.
pub fn format_assignment(key: &Key, entry: &Entry) -> String {
    let value = if needs_quoting(&entry.value) {
        single_quote(&entry.value)
    } else {
        entry.value.clone()
    };
    match entry.description.as_deref().map(str::trim).filter(|text| !text.is_empty()) {
        Some(description) => {
            let description = description.replace(['\n', '\r'], " ");
            format!("{key}={value} # {description}")
        }
        None => format!("{key}={value}"),
    }
}

/// Wraps `value` in single quotes; embedded quotes become `'\''`.
pub fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn needs_quoting(value: &str) -> bool {
    !value.chars().all(|ch| {
        ch.is_ascii_alphanumeric()
            || matches!(ch, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | ',' | '=' | '~' | '?' | '&')
    })
}
