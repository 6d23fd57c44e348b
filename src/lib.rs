// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Enva: directory-scoped environment values with inheritance.
//!
//! Values are stored per canonical directory and profile in SQLite. A directory sees every value
//! defined between its project root and itself, the deepest definition winning. The crate
//! provides the resolution engine, shell integration, a session state machine and the TUI
//! built on top of it.

pub mod config;
pub mod editor;
pub mod model;
pub mod path;
pub mod resolve;
pub mod search;
pub mod session;
pub mod shell;
pub mod store;
pub mod tui;
