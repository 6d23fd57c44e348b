// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration, resolved once at startup from flags and the environment.

use std::env;
use std::path::PathBuf;

use crate::editor::resolve_editor_command;
use crate::model::Profile;
use crate::resolve::Resolver;
use crate::store::{default_db_path, SqliteStore, StoreError};

/// Overrides the database location.
pub const DB_ENV: &str = "ENVA_DB";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot locate a home directory; set {DB_ENV} or pass --db")]
    NoHome,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub profile: Profile,
    pub editor: String,
}

impl Config {
    /// `--db`, then `ENVA_DB`, then the per-user default. `--profile`, then `ENVA_PROFILE`.
    pub fn load(db: Option<PathBuf>, profile: Option<String>) -> Result<Self, ConfigError> {
        let db_path = match db.or_else(db_from_env) {
            Some(path) => path,
            None => default_db_path().ok_or(ConfigError::NoHome)?,
        };
        let profile = match profile {
            Some(name) => Profile::new(name),
            None => Profile::from_env(),
        };
        Ok(Self { db_path, profile, editor: resolve_editor_command() })
    }

    pub fn open_resolver(&self) -> Result<Resolver, ConfigError> {
        let store = SqliteStore::open(&self.db_path)?;
        Ok(Resolver::new(store, self.profile.clone()))
    }
}

fn db_from_env() -> Option<PathBuf> {
    env::var_os(DB_ENV).filter(|value| !value.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Config;

    #[test]
    fn explicit_flags_win() {
        let config = Config::load(Some(PathBuf::from("/tmp/x.db")), Some("staging".to_owned())).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.profile.as_str(), "staging");
        assert!(!config.editor.is_empty());
    }

    #[test]
    fn blank_profile_flag_falls_back_to_default() {
        let config = Config::load(Some(PathBuf::from("/tmp/x.db")), Some("  ".to_owned())).unwrap();
        assert!(config.profile.is_default());
    }

    #[test]
    fn opens_resolver_at_configured_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db = tmp.path().join("nested").join("enva.db");
        let config = Config::load(Some(db.clone()), None).unwrap();
        let resolver = config.open_resolver().unwrap();
        assert_eq!(resolver.store().path(), Some(db.as_path()));
    }
}
