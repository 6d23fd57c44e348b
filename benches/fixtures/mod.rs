// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use enva::model::{Entry, Key, Profile, ResolvedValue};
use enva::path::{Scope, MARKER_FILE};
use enva::resolve::Resolver;
use enva::store::SqliteStore;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 4 levels, 50 keys per level.
    Shallow,
    /// 16 levels, 200 keys per level.
    Deep,
}

impl Case {
    fn shape(self) -> (usize, usize) {
        match self {
            Self::Shallow => (4, 50),
            Self::Deep => (16, 200),
        }
    }
}

pub struct Tree {
    _tmp: TempDir,
    pub resolver: Resolver,
    pub leaf: PathBuf,
    pub chain: Vec<Scope>,
}

/// A project root with a marker and a straight chain of nested directories. Every level
/// defines `keys` values; half of them shadow the level above.
pub fn tree(case: Case) -> Tree {
    let (depth, keys) = case.shape();
    let tmp = TempDir::new().expect("temp dir");
    let root = fs::canonicalize(tmp.path()).expect("canonical temp dir").join("proj");
    fs::create_dir_all(&root).expect("create root");
    fs::write(root.join(MARKER_FILE), "").expect("write marker");

    let mut resolver =
        Resolver::new(SqliteStore::open_in_memory().expect("open store"), Profile::default());
    let mut dir = root;
    let mut chain = Vec::with_capacity(depth);
    for level in 0..depth {
        if level > 0 {
            dir = dir.join(format!("level{level}"));
            fs::create_dir_all(&dir).expect("create level");
        }
        let scope = Scope::canonicalize(&dir).expect("canonical level");
        let entries = (0..keys)
            .map(|idx| {
                let name = if idx % 2 == 0 { format!("SHARED_{idx}") } else { format!("L{level}_KEY_{idx}") };
                let key = Key::new(name).expect("valid key");
                (key, Entry::new(format!("value-{level}-{idx}")))
            })
            .collect::<BTreeMap<_, _>>();
        resolver.set_values(&scope, &entries).expect("seed level");
        chain.push(scope);
    }

    Tree { _tmp: tmp, resolver, leaf: dir, chain }
}

/// Resolved values shaped like a real project listing.
pub fn resolved_values(count: usize) -> Vec<ResolvedValue> {
    let scope = Scope::canonicalize(std::env::temp_dir()).expect("canonical temp dir");
    let prefixes = ["DATABASE", "API", "AWS", "LOG", "FEATURE", "CACHE", "SMTP", "REDIS"];
    (0..count)
        .map(|idx| {
            let prefix = prefixes[idx % prefixes.len()];
            ResolvedValue {
                key: Key::new(format!("{prefix}_SETTING_{idx}")).expect("valid key"),
                value: format!("https://{}.example.com/{idx}?mode=bench", prefix.to_ascii_lowercase()),
                description: None,
                defined_at: scope.clone(),
                overrides: None,
            }
        })
        .collect()
}
