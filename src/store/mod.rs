// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for scoped values.
//!
//! A single SQLite file holds every scope and profile. Rows are keyed by
//! `(scope path, profile, key)`; batch writes run in one transaction.

pub mod sqlite;

pub use sqlite::{default_db_path, ScopeSummary, SqliteStore, StoreError};
