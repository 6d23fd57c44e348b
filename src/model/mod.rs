// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Keys and profiles are validated newtypes; stored rows, resolved values and the immutable
//! resolution context are plain data.

pub mod context;
pub mod key;
pub mod profile;
pub mod value;

pub use context::ResolveContext;
pub use key::{is_valid_key, Key, KeyError};
pub use profile::{Profile, DEFAULT_PROFILE, PROFILE_ENV};
pub use value::{Entry, ResolvedValue, StoredValue};
