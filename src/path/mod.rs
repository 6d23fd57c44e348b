// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scope paths: canonicalization, root boundary discovery and chain building.
//!
//! Every comparison of "is this the same directory" goes through [`Scope`], which can only be
//! obtained from [`Scope::canonicalize`]. Raw path strings are never compared directly.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

/// Marker file that pins the root boundary of a project.
pub const MARKER_FILE: &str = ".enva";
/// Version-control metadata directory used as a fallback root boundary.
pub const VCS_DIR: &str = ".git";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path does not exist: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot resolve path {}: {source}", path.display())]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A canonical (absolute, symlink-resolved) directory path used as a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Scope(PathBuf);

impl Scope {
    /// Resolves `path` (absolute or relative) to its canonical form.
    pub fn canonicalize(path: impl AsRef<Path>) -> Result<Self, PathError> {
        let path = path.as_ref();
        std::fs::canonicalize(path).map(Self).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                PathError::NotFound { path: path.to_path_buf(), source }
            } else {
                PathError::Unresolvable { path: path.to_path_buf(), source }
            }
        })
    }

    /// Wraps a path that was canonical when it was persisted.
    pub(crate) fn from_canonical(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Key used for the `path` column of the store.
    pub fn storage_key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }

    /// Parent scope; `None` at the filesystem root.
    ///
    /// The parent of a canonical path is itself canonical, so no re-resolution is needed.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|parent| Self(parent.to_path_buf()))
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn is_ancestor_of(&self, other: &Scope) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for Scope {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Walks up from `start` to the closest project boundary.
///
/// At each directory a marker file wins over a version-control directory; the first directory
/// satisfying either stops the walk. Degrades to the filesystem root.
pub fn find_root(start: &Scope) -> Scope {
    let mut current = start.clone();
    loop {
        if has_marker_file(current.as_path()) {
            debug!("root boundary at {current} (marker file)");
            return current;
        }
        if has_vcs_dir(current.as_path()) {
            debug!("root boundary at {current} (version control)");
            return current;
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => {
                debug!("root boundary at filesystem root {current}");
                return current;
            }
        }
    }
}

fn has_marker_file(dir: &Path) -> bool {
    std::fs::metadata(dir.join(MARKER_FILE)).is_ok_and(|meta| !meta.is_dir())
}

fn has_vcs_dir(dir: &Path) -> bool {
    std::fs::metadata(dir.join(VCS_DIR)).is_ok_and(|meta| meta.is_dir())
}

/// Ordered scopes from `root` down to `target`, inclusive on both ends.
///
/// `root` must be an ancestor of `target`. If it is not, the walk stops at the filesystem root
/// instead of looping.
pub fn build_chain(root: &Scope, target: &Scope) -> Vec<Scope> {
    let mut chain = vec![target.clone()];
    let mut current = target.clone();
    while &current != root {
        match current.parent() {
            Some(parent) if parent != current => {
                chain.push(parent.clone());
                current = parent;
            }
            _ => break,
        }
    }
    chain.reverse();
    chain
}
