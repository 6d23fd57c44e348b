// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Resolution engine.
//!
//! A directory resolves to the values stored along its chain (project root down to the
//! directory), folded shallow to deep so the closest definition wins. Each replaced definition
//! is remembered as the `overrides` origin of its replacement.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use crate::model::{Entry, Key, Profile, ResolveContext, ResolvedValue, StoredValue};
use crate::path::{build_chain, find_root, PathError, Scope};
use crate::store::{SqliteStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("cannot load values: {0}")]
    Store(#[from] StoreError),
}

/// Store handle bound to one profile.
#[derive(Debug)]
pub struct Resolver {
    store: SqliteStore,
    profile: Profile,
}

impl Resolver {
    pub fn new(store: SqliteStore, profile: Profile) -> Self {
        Self { store, profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Builds a fresh context for `dir`. Either every step succeeds or nothing is returned.
    pub fn resolve(&self, dir: impl AsRef<Path>) -> Result<ResolveContext, ResolveError> {
        let target = Scope::canonicalize(dir)?;
        let root = find_root(&target);
        let chain = build_chain(&root, &target);
        debug!("resolving {target} through {} scope(s) [{}]", chain.len(), self.profile);

        let rows = self.store.values_for_scopes(&chain, &self.profile)?;
        let values = merge_chain(&chain, rows);
        Ok(ResolveContext::new(target, root, chain, values, self.profile.clone()))
    }

    pub fn local_values(&self, scope: &Scope) -> Result<BTreeMap<Key, Entry>, StoreError> {
        Ok(self
            .store
            .values_for_scope(scope, &self.profile)?
            .into_iter()
            .map(|stored| {
                let entry = stored.entry();
                (stored.key, entry)
            })
            .collect())
    }

    pub fn local_value(&self, scope: &Scope, key: &Key) -> Result<Option<Entry>, StoreError> {
        Ok(self.store.get(scope, &self.profile, key)?.map(|stored| stored.entry()))
    }

    pub fn set_value(&mut self, scope: &Scope, key: &Key, entry: &Entry) -> Result<(), StoreError> {
        self.store.upsert(scope, &self.profile, key, entry)
    }

    pub fn set_values(
        &mut self,
        scope: &Scope,
        entries: &BTreeMap<Key, Entry>,
    ) -> Result<(), StoreError> {
        self.store.upsert_batch(scope, &self.profile, entries)
    }

    pub fn delete_value(&mut self, scope: &Scope, key: &Key) -> Result<bool, StoreError> {
        self.store.delete(scope, &self.profile, key)
    }

    /// Makes the local values at `scope` exactly `entries`.
    pub fn replace_local_values(
        &mut self,
        scope: &Scope,
        entries: &BTreeMap<Key, Entry>,
    ) -> Result<(), StoreError> {
        self.store.replace_scope(scope, &self.profile, entries)
    }
}

/// Folds `rows` in chain order, root first.
///
/// Rows for scopes outside `chain` are ignored.
pub fn merge_chain(chain: &[Scope], rows: Vec<StoredValue>) -> BTreeMap<Key, ResolvedValue> {
    let mut by_scope: BTreeMap<Scope, Vec<StoredValue>> = BTreeMap::new();
    for row in rows {
        by_scope.entry(row.scope.clone()).or_default().push(row);
    }

    let mut resolved: BTreeMap<Key, ResolvedValue> = BTreeMap::new();
    for scope in chain {
        let Some(rows) = by_scope.remove(scope) else {
            continue;
        };
        for row in rows {
            let overrides = resolved.get(&row.key).map(|prior| prior.defined_at.clone());
            resolved.insert(
                row.key.clone(),
                ResolvedValue {
                    key: row.key,
                    value: row.value,
                    description: row.description,
                    defined_at: scope.clone(),
                    overrides,
                },
            );
        }
    }
    resolved
}

#[cfg(test)]
mod tests;
