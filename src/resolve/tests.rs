// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::PathBuf;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::{merge_chain, ResolveError, Resolver};
use crate::model::{Entry, Key, Profile, StoredValue};
use crate::path::{Scope, MARKER_FILE};
use crate::store::SqliteStore;

struct ResolveTestCtx {
    _tmp: TempDir,
    proj: PathBuf,
    resolver: Resolver,
}

impl ResolveTestCtx {
    fn scope(&self, rel: &str) -> Scope {
        let path = if rel.is_empty() { self.proj.clone() } else { self.proj.join(rel) };
        fs::create_dir_all(&path).unwrap();
        Scope::canonicalize(path).unwrap()
    }

    fn set(&mut self, rel: &str, key: &str, value: &str) {
        let scope = self.scope(rel);
        self.resolver.set_value(&scope, &Key::new(key).unwrap(), &Entry::new(value)).unwrap();
    }
}

#[fixture]
fn ctx() -> ResolveTestCtx {
    let tmp = TempDir::new().unwrap();
    let proj = fs::canonicalize(tmp.path()).unwrap().join("proj");
    fs::create_dir_all(&proj).unwrap();
    fs::write(proj.join(MARKER_FILE), "").unwrap();
    let resolver = Resolver::new(SqliteStore::open_in_memory().unwrap(), Profile::default());
    ResolveTestCtx { _tmp: tmp, proj, resolver }
}

#[rstest]
fn grandchild_inherits_and_overrides(mut ctx: ResolveTestCtx) {
    ctx.set("", "ROOT_VAR", "root_value");
    ctx.set("", "SHARED", "from_root");
    ctx.set("child", "SHARED", "from_child");

    let grandchild = ctx.scope("child/grandchild");
    let resolved = ctx.resolver.resolve(grandchild.as_path()).unwrap();

    assert_eq!(resolved.root(), &ctx.scope(""));
    assert_eq!(resolved.chain().len(), 3);
    assert_eq!(resolved.len(), 2);

    let root_var = resolved.get("ROOT_VAR").unwrap();
    assert_eq!(root_var.value, "root_value");
    assert!(!root_var.is_overridden());
    assert_eq!(root_var.defined_at, ctx.scope(""));

    let shared = resolved.get("SHARED").unwrap();
    assert_eq!(shared.value, "from_child");
    assert!(shared.is_overridden());
    assert_eq!(shared.overrides, Some(ctx.scope("")));
    assert_eq!(shared.defined_at, ctx.scope("child"));
    assert!(resolved.local().is_empty());
}

#[rstest]
fn override_origin_is_the_immediately_shallower_definer(mut ctx: ResolveTestCtx) {
    ctx.set("", "K", "0");
    ctx.set("a", "K", "1");
    ctx.set("a/b", "K", "2");

    let resolved = ctx.resolver.resolve(ctx.scope("a/b")).unwrap();
    let value = resolved.get("K").unwrap();
    assert_eq!(value.value, "2");
    assert_eq!(value.overrides, Some(ctx.scope("a")));
    assert_eq!(resolved.local().len(), 1);
}

#[rstest]
fn values_outside_the_chain_are_ignored(mut ctx: ResolveTestCtx) {
    ctx.set("sibling", "K", "nope");
    ctx.set("a", "OTHER", "yes");

    let resolved = ctx.resolver.resolve(ctx.scope("a")).unwrap();
    assert!(resolved.get("K").is_none());
    assert!(resolved.get("OTHER").is_some());
}

#[rstest]
fn values_above_the_root_are_not_inherited(mut ctx: ResolveTestCtx) {
    let above = Scope::canonicalize(ctx.proj.parent().unwrap()).unwrap();
    ctx.resolver.set_value(&above, &Key::new("ABOVE").unwrap(), &Entry::new("x")).unwrap();

    let resolved = ctx.resolver.resolve(ctx.scope("a")).unwrap();
    assert!(resolved.get("ABOVE").is_none());
}

#[rstest]
fn profile_partitions_resolution(ctx: ResolveTestCtx) {
    let scope = ctx.scope("");
    let key = Key::new("K").unwrap();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.upsert(&scope, &Profile::default(), &key, &Entry::new("default")).unwrap();
    store.upsert(&scope, &Profile::new("production"), &key, &Entry::new("prod")).unwrap();

    let prod = Resolver::new(store, Profile::new("production"));
    let resolved = prod.resolve(&ctx.proj).unwrap();
    assert_eq!(resolved.get("K").unwrap().value, "prod");
    assert_eq!(resolved.profile(), &Profile::new("production"));
}

#[rstest]
fn missing_directory_fails_without_context(ctx: ResolveTestCtx) {
    let err = ctx.resolver.resolve(ctx.proj.join("does-not-exist")).unwrap_err();
    assert!(matches!(err, ResolveError::Path(_)), "got {err:?}");
}

#[rstest]
fn replace_local_values_round_trips(mut ctx: ResolveTestCtx) {
    ctx.set("a", "X", "1");
    let scope = ctx.scope("a");
    let before = ctx.resolver.local_values(&scope).unwrap();
    ctx.set("a", "Y", "2");
    ctx.resolver.replace_local_values(&scope, &before).unwrap();
    assert_eq!(ctx.resolver.local_values(&scope).unwrap(), before);
    assert_eq!(
        ctx.resolver.local_value(&scope, &Key::new("X").unwrap()).unwrap(),
        Some(Entry::new("1"))
    );
}

#[test]
fn merge_keeps_deepest_and_flags_only_redefined_keys() {
    let chain = ["/r", "/r/a", "/r/a/b"].map(Scope::from_canonical).to_vec();
    let row = |scope: &str, key: &str, value: &str| StoredValue {
        scope: Scope::from_canonical(scope),
        profile: Profile::default(),
        key: Key::new(key).unwrap(),
        value: value.to_owned(),
        description: None,
        updated_at: String::new(),
    };
    let merged = merge_chain(
        &chain,
        vec![row("/r", "A", "r"), row("/r/a/b", "A", "b"), row("/r/a", "B", "a"), row("/x", "C", "x")],
    );

    assert_eq!(merged.len(), 2);
    assert_eq!(merged["A"].value, "b");
    assert_eq!(merged["A"].overrides, Some(Scope::from_canonical("/r")));
    assert_eq!(merged["B"].overrides, None);
}
