// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use crate::model::{Entry, Key, Profile, StoredValue};
use crate::path::Scope;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS env_scopes (
  path TEXT PRIMARY KEY,
  label TEXT,
  created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS env_vars (
  path TEXT NOT NULL,
  profile TEXT NOT NULL,
  key TEXT NOT NULL,
  value TEXT NOT NULL,
  description TEXT,
  updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
  PRIMARY KEY (path, profile, key)
);

CREATE INDEX IF NOT EXISTS idx_env_vars_path_profile ON env_vars(path, profile);
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO env_vars (path, profile, key, value, description, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
ON CONFLICT(path, profile, key)
DO UPDATE SET value = excluded.value, description = excluded.description, updated_at = CURRENT_TIMESTAMP
"#;

const DELETE_SQL: &str = "DELETE FROM env_vars WHERE path = ?1 AND profile = ?2 AND key = ?3";

const SELECT_COLUMNS: &str = "SELECT path, profile, key, value, description, updated_at FROM env_vars";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot prepare database directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A known scope and how many values it holds for the queried profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSummary {
    pub scope: Scope,
    pub label: Option<String>,
    pub created_at: String,
    pub value_count: usize,
}

/// `~/.local/share/enva/enva.db`, or `None` when no home directory is known.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".local").join("share").join("enva").join("enva.db"))
}

#[derive(Debug)]
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;
        }
        let conn = Connection::open(&path)?;
        debug!("opened store {}", path.display());
        let store = Self { path: Some(path), conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self { path: None, conn: Connection::open_in_memory()? };
        store.migrate()?;
        Ok(store)
    }

    /// Database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        if !self.has_column("env_vars", "description")? {
            debug!("adding description column to env_vars");
            self.conn.execute_batch("ALTER TABLE env_vars ADD COLUMN description TEXT")?;
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool, StoreError> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for name in names {
            if name? == column {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Every value stored at any of `scopes`, ordered by path then key.
    pub fn values_for_scopes(
        &self,
        scopes: &[Scope],
        profile: &Profile,
    ) -> Result<Vec<StoredValue>, StoreError> {
        if scopes.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (0..scopes.len())
            .map(|idx| format!("?{}", idx + 2))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "{SELECT_COLUMNS} WHERE profile = ?1 AND path IN ({placeholders}) ORDER BY path, key"
        );
        let mut bindings = Vec::with_capacity(scopes.len() + 1);
        bindings.push(profile.as_str().to_owned());
        bindings.extend(scopes.iter().map(Scope::storage_key));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings.iter()), stored_value_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Values stored exactly at `scope`, ordered by key.
    pub fn values_for_scope(
        &self,
        scope: &Scope,
        profile: &Profile,
    ) -> Result<Vec<StoredValue>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE path = ?1 AND profile = ?2 ORDER BY key"))?;
        let rows = stmt.query_map(
            params![scope.storage_key(), profile.as_str()],
            stored_value_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get(
        &self,
        scope: &Scope,
        profile: &Profile,
        key: &Key,
    ) -> Result<Option<StoredValue>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE path = ?1 AND profile = ?2 AND key = ?3"),
                params![scope.storage_key(), profile.as_str(), key.as_str()],
                stored_value_from_row,
            )
            .optional()?)
    }

    /// Inserts or overwrites one value, creating the scope row on first write.
    pub fn upsert(
        &mut self,
        scope: &Scope,
        profile: &Profile,
        key: &Key,
        entry: &Entry,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        ensure_scope_tx(&tx, scope)?;
        upsert_tx(&tx, scope, profile, key, entry)?;
        tx.commit()?;
        debug!("set {key} at {scope} [{profile}]");
        Ok(())
    }

    /// Upserts every entry or none of them.
    pub fn upsert_batch(
        &mut self,
        scope: &Scope,
        profile: &Profile,
        entries: &BTreeMap<Key, Entry>,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        ensure_scope_tx(&tx, scope)?;
        for (key, entry) in entries {
            upsert_tx(&tx, scope, profile, key, entry)?;
        }
        tx.commit()?;
        debug!("set {} value(s) at {scope} [{profile}]", entries.len());
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete(&mut self, scope: &Scope, profile: &Profile, key: &Key) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute(DELETE_SQL, params![scope.storage_key(), profile.as_str(), key.as_str()])?;
        debug!("delete {key} at {scope} [{profile}]: {removed} row(s)");
        Ok(removed > 0)
    }

    /// Deletes every key or none of them; returns the number of rows removed.
    pub fn delete_batch(
        &mut self,
        scope: &Scope,
        profile: &Profile,
        keys: &[Key],
    ) -> Result<usize, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let removed = delete_keys_tx(&tx, scope, profile, keys.iter())?;
        tx.commit()?;
        debug!("deleted {removed} value(s) at {scope} [{profile}]");
        Ok(removed)
    }

    /// Makes the values at `scope` exactly `entries`: keys not listed are deleted, the rest upserted.
    pub fn replace_scope(
        &mut self,
        scope: &Scope,
        profile: &Profile,
        entries: &BTreeMap<Key, Entry>,
    ) -> Result<(), StoreError> {
        let current = self.values_for_scope(scope, profile)?;
        let stale: Vec<Key> = current
            .into_iter()
            .map(|stored| stored.key)
            .filter(|key| !entries.contains_key(key))
            .collect();

        let tx = self.conn.transaction()?;
        delete_keys_tx(&tx, scope, profile, stale.iter())?;
        if !entries.is_empty() {
            ensure_scope_tx(&tx, scope)?;
        }
        for (key, entry) in entries {
            upsert_tx(&tx, scope, profile, key, entry)?;
        }
        tx.commit()?;
        debug!(
            "replaced values at {scope} [{profile}]: {} kept, {} removed",
            entries.len(),
            stale.len()
        );
        Ok(())
    }

    /// All known scopes ordered by path, with their value count under `profile`.
    pub fn scopes(&self, profile: &Profile) -> Result<Vec<ScopeSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.path, s.label, COALESCE(s.created_at, ''), COUNT(v.key)
            FROM env_scopes s
            LEFT JOIN env_vars v ON v.path = s.path AND v.profile = ?1
            GROUP BY s.path
            ORDER BY s.path
            "#,
        )?;
        let rows = stmt.query_map(params![profile.as_str()], |row| {
            Ok(ScopeSummary {
                scope: Scope::from_canonical(row.get::<_, String>(0)?),
                label: row.get(1)?,
                created_at: row.get(2)?,
                value_count: row.get::<_, i64>(3)?.try_into().unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn ensure_scope_tx(tx: &Transaction<'_>, scope: &Scope) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO env_scopes (path, created_at) VALUES (?1, CURRENT_TIMESTAMP)",
        params![scope.storage_key()],
    )?;
    Ok(())
}

fn upsert_tx(
    tx: &Transaction<'_>,
    scope: &Scope,
    profile: &Profile,
    key: &Key,
    entry: &Entry,
) -> Result<(), StoreError> {
    tx.execute(
        UPSERT_SQL,
        params![
            scope.storage_key(),
            profile.as_str(),
            key.as_str(),
            entry.value,
            entry.description
        ],
    )?;
    Ok(())
}

fn delete_keys_tx<'k>(
    tx: &Transaction<'_>,
    scope: &Scope,
    profile: &Profile,
    keys: impl Iterator<Item = &'k Key>,
) -> Result<usize, StoreError> {
    let mut stmt = tx.prepare(DELETE_SQL)?;
    let path = scope.storage_key();
    let mut removed = 0;
    for key in keys {
        removed += stmt.execute(params![path, profile.as_str(), key.as_str()])?;
    }
    Ok(removed)
}

fn stored_value_from_row(row: &Row<'_>) -> rusqlite::Result<StoredValue> {
    let raw_key: String = row.get(2)?;
    let key = Key::new(raw_key)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err)))?;
    Ok(StoredValue {
        scope: Scope::from_canonical(row.get::<_, String>(0)?),
        profile: Profile::new(row.get::<_, String>(1)?),
        key,
        value: row.get(3)?,
        description: row.get(4)?,
        updated_at: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}
