// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;

/// Profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "default";
/// Environment variable selecting the profile for a whole process invocation.
pub const PROFILE_ENV: &str = "ENVA_PROFILE";

/// Namespace partitioning stored values (for example `default` or `production`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Profile(String);

impl Profile {
    /// Blank names map to [`DEFAULT_PROFILE`].
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self::default()
        } else if trimmed.len() == name.len() {
            Self(name)
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// Profile named by `ENVA_PROFILE`, or the default.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV).map(Self::new).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PROFILE
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self(DEFAULT_PROFILE.to_owned())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Profile {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
