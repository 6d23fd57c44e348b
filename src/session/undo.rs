// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use log::debug;

use crate::model::{Entry, Key};
use crate::path::Scope;
use crate::resolve::Resolver;
use crate::store::StoreError;

/// Enough prior state to reverse the most recent local mutation exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// `prior` is `None` when the key did not exist locally before the write.
    Set { scope: Scope, key: Key, prior: Option<Entry> },
    Delete { scope: Scope, key: Key, prior: Entry },
    /// Full local map of `scope` before a batch write.
    BatchImport { scope: Scope, prior: BTreeMap<Key, Entry> },
}

impl UndoAction {
    pub fn scope(&self) -> &Scope {
        match self {
            Self::Set { scope, .. } | Self::Delete { scope, .. } | Self::BatchImport { scope, .. } => {
                scope
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Set { key, .. } => format!("set {key}"),
            Self::Delete { key, .. } => format!("delete {key}"),
            Self::BatchImport { .. } => "import".to_owned(),
        }
    }

    /// Writes the inverse of the recorded mutation.
    pub fn revert(&self, resolver: &mut Resolver) -> Result<(), StoreError> {
        debug!("undo {} at {}", self.describe(), self.scope());
        match self {
            Self::Set { scope, key, prior: Some(prior) } | Self::Delete { scope, key, prior } => {
                resolver.set_value(scope, key, prior)
            }
            Self::Set { scope, key, prior: None } => resolver.delete_value(scope, key).map(|_| ()),
            Self::BatchImport { scope, prior } => resolver.replace_local_values(scope, prior),
        }
    }
}
