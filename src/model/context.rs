// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::model::{Entry, Key, Profile, ResolvedValue};
use crate::path::Scope;

/// Immutable result of one resolution.
///
/// Rebuilt after every write or directory change, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    target: Scope,
    root: Scope,
    chain: Vec<Scope>,
    values: BTreeMap<Key, ResolvedValue>,
    profile: Profile,
}

impl ResolveContext {
    pub fn new(
        target: Scope,
        root: Scope,
        chain: Vec<Scope>,
        values: BTreeMap<Key, ResolvedValue>,
        profile: Profile,
    ) -> Self {
        Self { target, root, chain, values, profile }
    }

    pub fn target(&self) -> &Scope {
        &self.target
    }

    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// Scopes from root to target, inclusive.
    pub fn chain(&self) -> &[Scope] {
        &self.chain
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn values(&self) -> &BTreeMap<Key, ResolvedValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.values.get(key)
    }

    /// All effective values, key ascending.
    pub fn sorted(&self) -> Vec<&ResolvedValue> {
        self.values.values().collect()
    }

    /// Values defined exactly at the target, key ascending.
    pub fn local(&self) -> Vec<&ResolvedValue> {
        self.values.values().filter(|value| self.is_local(value)).collect()
    }

    pub fn is_local(&self, value: &ResolvedValue) -> bool {
        value.defined_at == self.target
    }

    /// Local values as a writable key to entry map.
    pub fn local_entries(&self) -> BTreeMap<Key, Entry> {
        self.local().into_iter().map(|value| (value.key.clone(), value.entry())).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::ResolveContext;
    use crate::model::{Key, Profile, ResolvedValue};
    use crate::path::Scope;

    fn resolved(key: &str, value: &str, at: &str, overrides: Option<&str>) -> ResolvedValue {
        ResolvedValue {
            key: Key::new(key).unwrap(),
            value: value.to_owned(),
            description: None,
            defined_at: Scope::from_canonical(at),
            overrides: overrides.map(Scope::from_canonical),
        }
    }

    fn context() -> ResolveContext {
        let values: BTreeMap<_, _> = [
            resolved("ZED", "z", "/proj/app", None),
            resolved("ALPHA", "a", "/proj", None),
            resolved("MID", "m", "/proj/app", Some("/proj")),
        ]
        .into_iter()
        .map(|value| (value.key.clone(), value))
        .collect();
        ResolveContext::new(
            Scope::from_canonical("/proj/app"),
            Scope::from_canonical("/proj"),
            vec![Scope::from_canonical("/proj"), Scope::from_canonical("/proj/app")],
            values,
            Profile::default(),
        )
    }

    #[test]
    fn sorted_view_orders_by_key() {
        let ctx = context();
        let keys: Vec<&str> = ctx.sorted().iter().map(|value| value.key.as_str()).collect();
        assert_eq!(keys, vec!["ALPHA", "MID", "ZED"]);
    }

    #[test]
    fn local_view_keeps_target_definitions_only() {
        let ctx = context();
        let keys: Vec<&str> = ctx.local().iter().map(|value| value.key.as_str()).collect();
        assert_eq!(keys, vec!["MID", "ZED"]);
        assert!(!ctx.is_local(ctx.get("ALPHA").unwrap()));
        assert_eq!(ctx.local_entries().len(), 2);
    }

    #[test]
    fn overridden_flag_follows_provenance() {
        let ctx = context();
        assert!(ctx.get("MID").unwrap().is_overridden());
        assert!(!ctx.get("ZED").unwrap().is_overridden());
    }
}
