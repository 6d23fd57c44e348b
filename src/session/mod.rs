// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interactive session state machine.
//!
//! A [`Session`] wraps a resolver and the current [`ResolveContext`]. Every mutation goes through
//! the resolver, records a single-slot undo, then swaps in a freshly resolved context and
//! recomputes the ranked result list from scratch.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::model::{Entry, Key, KeyError, ResolveContext, ResolvedValue};
use crate::resolve::{ResolveError, Resolver};
use crate::search::{rank, SearchResult};
use crate::shell::{format_export, format_key_value, parse_env_file, ParseError};
use crate::store::StoreError;

mod input;
mod modal;
mod undo;

pub use input::TextInput;
pub use modal::{EditField, EditState, Modal, HELP_BINDINGS};
pub use undo::UndoAction;

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("No valid KEY=value lines found")]
    NothingToImport,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Effective,
    Local,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Effective => "effective",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Searching,
    Modal(Modal),
}

/// Work that needs the real terminal, executed by the front-end between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalAction {
    /// Round-trip the local values through `$EDITOR`.
    EditLocal,
    /// Put text on the clipboard.
    Copy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    pub expires_at: Instant,
}

impl Toast {
    pub fn is_active(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Added,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The value is defined at an ancestor; nothing was changed.
    Inherited,
    /// No value with that key is visible here.
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: Vec<Key>,
    pub updated: Vec<Key>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.added.len() + self.updated.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    Nothing,
    Undone(String),
}

pub struct Session {
    resolver: Resolver,
    ctx: ResolveContext,
    view: ViewMode,
    mode: Mode,
    search: TextInput,
    results: Vec<SearchResult>,
    cursor: usize,
    offset: usize,
    viewport_rows: usize,
    toast: Option<Toast>,
    undo: Option<UndoAction>,
    pending_external_action: Option<ExternalAction>,
    should_quit: bool,
}

impl Session {
    pub fn new(resolver: Resolver, ctx: ResolveContext) -> Self {
        let mut session = Self {
            resolver,
            ctx,
            view: ViewMode::Effective,
            mode: Mode::Browsing,
            search: TextInput::single_line(""),
            results: Vec::new(),
            cursor: 0,
            offset: 0,
            viewport_rows: 20,
            toast: None,
            undo: None,
            pending_external_action: None,
            should_quit: false,
        };
        session.refresh_results();
        session
    }

    /// Resolves `dir` and starts a session there.
    pub fn open(resolver: Resolver, dir: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let ctx = resolver.resolve(dir)?;
        Ok(Self::new(resolver, ctx))
    }

    pub fn ctx(&self) -> &ResolveContext {
        &self.ctx
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn modal(&self) -> Option<&Modal> {
        match &self.mode {
            Mode::Modal(modal) => Some(modal),
            _ => None,
        }
    }

    pub fn search_input(&self) -> &TextInput {
        &self.search
    }

    pub fn search_query(&self) -> String {
        self.search.text()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn pending_undo(&self) -> Option<&UndoAction> {
        self.undo.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected(&self) -> Option<&ResolvedValue> {
        self.results.get(self.cursor).map(|result| &result.value)
    }

    pub fn is_local(&self, value: &ResolvedValue) -> bool {
        self.ctx.is_local(value)
    }

    pub fn take_external_action(&mut self) -> Option<ExternalAction> {
        self.pending_external_action.take()
    }

    /// Number of table rows the front-end can show; keeps the cursor inside the window.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.ensure_cursor_visible();
    }

    pub fn set_toast(&mut self, message: impl Into<String>) {
        self.push_toast(message.into(), false);
    }

    pub fn set_error_toast(&mut self, message: impl Into<String>) {
        self.push_toast(message.into(), true);
    }

    fn push_toast(&mut self, message: String, is_error: bool) {
        self.toast = Some(Toast { message, is_error, expires_at: Instant::now() + TOAST_TTL });
    }

    fn clear_expired_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| !toast.is_active(now)) {
            self.toast = None;
        }
    }

    // Results and scrolling.

    fn refresh_results(&mut self) {
        let query = self.search.text();
        self.results = match self.view {
            ViewMode::Effective => rank(self.ctx.sorted(), &query),
            ViewMode::Local => rank(self.ctx.local(), &query),
        };
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.results.len().saturating_sub(1));
    }

    fn ensure_cursor_visible(&mut self) {
        let visible = self.viewport_rows.max(1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + visible {
            self.offset = self.cursor + 1 - visible;
        }
    }

    fn half_page(&self) -> usize {
        (self.viewport_rows / 2).max(1)
    }

    pub fn move_down(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_add(n);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn move_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
        self.ensure_cursor_visible();
    }

    pub fn move_to_top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.cursor = self.results.len().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ViewMode::Effective => ViewMode::Local,
            ViewMode::Local => ViewMode::Effective,
        };
        self.set_toast(match self.view {
            ViewMode::Local => "Showing local vars only",
            ViewMode::Effective => "Showing effective vars",
        });
        self.refresh_results();
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search.set_text(query);
        self.refresh_results();
    }

    fn clear_search_query(&mut self) {
        if !self.search.is_empty() {
            self.search.clear();
            self.refresh_results();
        }
    }

    // Mutations.

    fn reload(&mut self) -> Result<(), SessionError> {
        let ctx = self.resolver.resolve(self.ctx.target().as_path())?;
        self.ctx = ctx;
        self.refresh_results();
        Ok(())
    }

    fn record_undo(&mut self, action: UndoAction) {
        debug!("undo slot now holds {}", action.describe());
        self.undo = Some(action);
    }

    /// Writes `entry` under `raw_key` at the session directory.
    ///
    /// The key is validated before anything is written.
    pub fn set_value(&mut self, raw_key: &str, entry: Entry) -> Result<SetOutcome, SessionError> {
        let key = Key::new(raw_key)?;
        let scope = self.ctx.target().clone();
        let prior = self.resolver.local_value(&scope, &key)?;
        self.resolver.set_value(&scope, &key, &entry)?;
        let outcome = if prior.is_some() { SetOutcome::Updated } else { SetOutcome::Added };
        self.record_undo(UndoAction::Set { scope, key, prior });
        self.reload()?;
        Ok(outcome)
    }

    /// Deletes a local value. Inherited values are left untouched.
    pub fn delete_value(&mut self, raw_key: &str) -> Result<DeleteOutcome, SessionError> {
        let key = Key::new(raw_key)?;
        match self.ctx.get(key.as_str()) {
            None => return Ok(DeleteOutcome::Missing),
            Some(value) if !self.ctx.is_local(value) => return Ok(DeleteOutcome::Inherited),
            Some(_) => {}
        }
        let scope = self.ctx.target().clone();
        let Some(prior) = self.resolver.local_value(&scope, &key)? else {
            return Ok(DeleteOutcome::Missing);
        };
        self.resolver.delete_value(&scope, &key)?;
        self.record_undo(UndoAction::Delete { scope, key, prior });
        self.reload()?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Parses `text` and upserts every assignment in one batch.
    ///
    /// Any invalid line rejects the whole import without writing.
    pub fn import(&mut self, text: &str) -> Result<ImportReport, SessionError> {
        let parsed = parse_env_file(text)?;
        if parsed.is_empty() {
            return Err(SessionError::NothingToImport);
        }
        let scope = self.ctx.target().clone();
        let prior = self.resolver.local_values(&scope)?;

        let mut report = ImportReport::default();
        for key in parsed.keys() {
            if prior.contains_key(key) {
                report.updated.push(key.clone());
            } else {
                report.added.push(key.clone());
            }
        }

        self.resolver.set_values(&scope, &parsed)?;
        self.record_undo(UndoAction::BatchImport { scope, prior });
        self.reload()?;
        Ok(report)
    }

    /// Makes the local values exactly `entries`. Returns `false` when nothing changed.
    pub fn replace_local(&mut self, entries: BTreeMap<Key, Entry>) -> Result<bool, SessionError> {
        let scope = self.ctx.target().clone();
        let prior = self.resolver.local_values(&scope)?;
        if prior == entries {
            return Ok(false);
        }
        self.resolver.replace_local_values(&scope, &entries)?;
        self.record_undo(UndoAction::BatchImport { scope, prior });
        self.reload()?;
        Ok(true)
    }

    /// Applies text edited outside the session (the `$EDITOR` round trip).
    pub fn sync_local_text(&mut self, text: &str) -> Result<bool, SessionError> {
        let entries = parse_env_file(text)?;
        self.replace_local(entries)
    }

    /// Current local values as written at the session directory.
    pub fn local_entries(&self) -> Result<BTreeMap<Key, Entry>, SessionError> {
        Ok(self.resolver.local_values(self.ctx.target())?)
    }

    /// Reverts the last mutation. On failure the action stays in the slot.
    pub fn undo(&mut self) -> Result<UndoOutcome, SessionError> {
        let Some(action) = self.undo.take() else {
            return Ok(UndoOutcome::Nothing);
        };
        if let Err(err) = action.revert(&mut self.resolver) {
            self.undo = Some(action);
            return Err(err.into());
        }
        self.reload()?;
        Ok(UndoOutcome::Undone(action.describe()))
    }

    // Key handling.

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        self.clear_expired_toast(now);
        match self.mode {
            Mode::Modal(_) => self.handle_modal_key(key),
            Mode::Searching => self.handle_search_key(key),
            Mode::Browsing => self.handle_browse_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('d') if ctrl => self.move_down(self.half_page()),
            KeyCode::Char('u') if ctrl => self.move_up(self.half_page()),
            _ if ctrl => {}
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.mode = Mode::Searching,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(1),
            KeyCode::Char('g') | KeyCode::Home => self.move_to_top(),
            KeyCode::Char('G') | KeyCode::End => self.move_to_bottom(),
            KeyCode::PageDown => self.move_down(self.half_page()),
            KeyCode::PageUp => self.move_up(self.half_page()),
            KeyCode::Char('t') => self.toggle_view(),
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(value) = self.selected() {
                    let state = EditState::existing(value);
                    self.mode = Mode::Modal(Modal::Edit(state));
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Modal(Modal::Edit(EditState::new_value())),
            KeyCode::Char('A') => self.mode = Mode::Modal(Modal::bulk_import()),
            KeyCode::Char('E') => self.pending_external_action = Some(ExternalAction::EditLocal),
            KeyCode::Char('v') => {
                if let Some(value) = self.selected() {
                    let key = value.key.clone();
                    self.mode = Mode::Modal(Modal::ViewValue { key, scroll: 0 });
                }
            }
            KeyCode::Char('?') => self.mode = Mode::Modal(Modal::Help { scroll: 0 }),
            KeyCode::Char('x') => self.request_delete(),
            KeyCode::Char('u') => self.undo_with_toast(),
            KeyCode::Char('y') => {
                if let Some(value) = self.selected() {
                    let text = format_key_value(value.key.as_str(), &value.value);
                    let message = format!("Copied: {}=...", value.key);
                    self.pending_external_action = Some(ExternalAction::Copy(text));
                    self.set_toast(message);
                }
            }
            KeyCode::Char('Y') => {
                if let Some(value) = self.selected() {
                    let text = format_export(value.key.as_str(), &value.value);
                    self.pending_external_action = Some(ExternalAction::Copy(text));
                    self.set_toast("Copied export line");
                }
            }
            KeyCode::Esc => self.clear_search_query(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => self.mode = Mode::Browsing,
            KeyCode::Esc => {
                if self.search.is_empty() {
                    self.mode = Mode::Browsing;
                } else {
                    self.clear_search_query();
                }
            }
            KeyCode::Down => self.move_down(1),
            KeyCode::Up => self.move_up(1),
            _ => {
                if self.search.handle_key(&key) {
                    self.refresh_results();
                }
            }
        }
    }

    fn request_delete(&mut self) {
        let Some(value) = self.selected() else {
            return;
        };
        if self.ctx.is_local(value) {
            let key = value.key.clone();
            self.mode = Mode::Modal(Modal::ConfirmDelete { key });
        } else {
            self.set_error_toast("Can only delete local vars");
        }
    }

    fn undo_with_toast(&mut self) {
        match self.undo() {
            Ok(UndoOutcome::Nothing) => self.set_error_toast("Nothing to undo"),
            Ok(UndoOutcome::Undone(_)) => self.set_toast("Undone"),
            Err(err) => self.set_error_toast(format!("Undo error: {err}")),
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Mode::Modal(modal) = std::mem::replace(&mut self.mode, Mode::Browsing) else {
            return;
        };
        self.mode = match modal {
            Modal::Edit(state) => self.handle_edit_key(state, key),
            Modal::BulkImport { input, error } => self.handle_bulk_import_key(input, error, key),
            Modal::ViewValue { key: value_key, scroll } => {
                self.handle_view_value_key(value_key, scroll, key)
            }
            Modal::Help { scroll } => self.handle_help_key(scroll, key),
            Modal::ConfirmDelete { key: value_key } => self.handle_confirm_delete_key(value_key, key),
        };
    }

    fn handle_edit_key(&mut self, mut state: EditState, key: KeyEvent) -> Mode {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Mode::Browsing,
            KeyCode::Char('s') if ctrl => return self.save_edit(state),
            KeyCode::Tab => state.focus_next(),
            KeyCode::BackTab => state.focus_prev(),
            KeyCode::Enter if state.focus == EditField::Key => state.focus_next(),
            KeyCode::Enter if state.focus == EditField::Description => return self.save_edit(state),
            _ => {
                if state.focused_input().handle_key(&key) {
                    state.error = None;
                }
            }
        }
        Mode::Modal(Modal::Edit(state))
    }

    fn save_edit(&mut self, mut state: EditState) -> Mode {
        let raw_key = state.key.text();
        let description = Some(state.description.text());
        let entry = Entry::new(state.value.text()).with_description(description);
        match self.set_value(raw_key.trim(), entry) {
            Ok(outcome) => {
                let verb = match outcome {
                    SetOutcome::Added => "Added",
                    SetOutcome::Updated => "Updated",
                };
                self.set_toast(format!("{verb} {}", raw_key.trim()));
                Mode::Browsing
            }
            Err(SessionError::Resolve(err)) => {
                self.set_error_toast(format!("Reload error: {err}"));
                Mode::Browsing
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Mode::Modal(Modal::Edit(state))
            }
        }
    }

    fn handle_bulk_import_key(
        &mut self,
        mut input: TextInput,
        mut error: Option<String>,
        key: KeyEvent,
    ) -> Mode {
        match key.code {
            KeyCode::Esc => return Mode::Browsing,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.import(&input.text()) {
                    Ok(report) => {
                        self.set_toast(format!(
                            "Imported {} (added {}, updated {})",
                            report.total(),
                            report.added.len(),
                            report.updated.len()
                        ));
                        return Mode::Browsing;
                    }
                    Err(SessionError::Resolve(err)) => {
                        self.set_error_toast(format!("Reload error: {err}"));
                        return Mode::Browsing;
                    }
                    Err(err) => error = Some(err.to_string()),
                }
            }
            _ => {
                if input.handle_key(&key) {
                    error = None;
                }
            }
        }
        Mode::Modal(Modal::BulkImport { input, error })
    }

    fn handle_view_value_key(&mut self, value_key: Key, scroll: u16, key: KeyEvent) -> Mode {
        let lines = self
            .ctx
            .get(value_key.as_str())
            .map_or(1, |value| value.value.split('\n').count());
        let max_scroll = u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX);
        let scroll = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('v') => {
                return Mode::Browsing;
            }
            KeyCode::Char('j') | KeyCode::Down => scroll.saturating_add(1).min(max_scroll),
            KeyCode::Char('k') | KeyCode::Up => scroll.saturating_sub(1),
            _ => scroll,
        };
        Mode::Modal(Modal::ViewValue { key: value_key, scroll })
    }

    /// Rows of the help list that fit on screen.
    pub fn help_visible_rows(&self) -> usize {
        self.viewport_rows.saturating_sub(4).max(5)
    }

    fn handle_help_key(&mut self, scroll: u16, key: KeyEvent) -> Mode {
        let max_scroll = HELP_BINDINGS.len().saturating_sub(self.help_visible_rows());
        let max_scroll = u16::try_from(max_scroll).unwrap_or(u16::MAX);
        let scroll = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                return Mode::Browsing;
            }
            KeyCode::Char('j') | KeyCode::Down => scroll.saturating_add(1).min(max_scroll),
            KeyCode::Char('k') | KeyCode::Up => scroll.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => 0,
            KeyCode::Char('G') | KeyCode::End => max_scroll,
            _ => scroll,
        };
        Mode::Modal(Modal::Help { scroll })
    }

    fn handle_confirm_delete_key(&mut self, value_key: Key, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.delete_value(value_key.as_str()) {
                    Ok(DeleteOutcome::Deleted) => self.set_toast(format!("Deleted {value_key}")),
                    Ok(DeleteOutcome::Inherited) => self.set_error_toast("Can only delete local vars"),
                    Ok(DeleteOutcome::Missing) => self.set_error_toast(format!("{value_key} no longer exists")),
                    Err(err) => self.set_error_toast(format!("Delete error: {err}")),
                }
                Mode::Browsing
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Browsing,
            _ => Mode::Modal(Modal::ConfirmDelete { key: value_key }),
        }
    }
}
