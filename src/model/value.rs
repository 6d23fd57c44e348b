// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use crate::model::{Key, Profile};
use crate::path::Scope;

/// Value text plus an optional description, as written to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Entry {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entry {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), description: None }
    }

    /// Empty or whitespace-only descriptions are dropped.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|text| !text.trim().is_empty());
        self
    }
}

/// One persisted row: at most one per `(scope, profile, key)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub scope: Scope,
    pub profile: Profile,
    pub key: Key,
    pub value: String,
    pub description: Option<String>,
    /// SQLite `CURRENT_TIMESTAMP` text (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub updated_at: String,
}

impl StoredValue {
    pub fn entry(&self) -> Entry {
        Entry { value: self.value.clone(), description: self.description.clone() }
    }
}

/// Effective value of a key after folding the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedValue {
    pub key: Key,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scope whose definition is in effect.
    pub defined_at: Scope,
    /// Shallower scope whose definition was replaced, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Scope>,
}

impl ResolvedValue {
    pub fn is_overridden(&self) -> bool {
        self.overrides.is_some()
    }

    pub fn entry(&self) -> Entry {
        Entry { value: self.value.clone(), description: self.description.clone() }
    }
}
