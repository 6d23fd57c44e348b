// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! A thin ratatui + crossterm shell around [`Session`]: the session owns every state
//! transition, this module draws it and performs the actions that need the real terminal
//! (the `$EDITOR` round trip and OSC 52 clipboard writes).

use std::{io, path::Path, time::Duration};

use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::editor::{edit_text, render_local_file, EditorError};
use crate::model::ResolvedValue;
use crate::resolve::{ResolveError, Resolver};
use crate::search::SearchResult;
use crate::session::{
    EditField, EditState, ExternalAction, Mode, Modal, Session, SessionError, TextInput, ViewMode,
    HELP_BINDINGS,
};

mod theme;

use theme::{ThemeError, TuiTheme};

/// Rows taken by everything but the table body: header, search bar, table borders, column
/// header and status line.
const CHROME_ROWS: u16 = 6;
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Runs the interactive browser for `dir` until the user quits.
pub fn run(resolver: Resolver, dir: &Path, editor: String) -> Result<(), TuiError> {
    let theme = TuiTheme::from_env()?;
    let session = Session::open(resolver, dir)?;
    debug!("tui session at {}", session.ctx().target());
    let mut app = App::new(session, theme, editor);
    let mut terminal = TerminalSession::new()?;

    while !app.session.should_quit() {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                    if let Some(action) = app.session.take_external_action() {
                        let result = match action {
                            ExternalAction::EditLocal => terminal
                                .run_external_action(|| app.edit_local_in_editor()),
                            ExternalAction::Copy(text) => app.copy(&text),
                        };
                        if let Err(err) = result {
                            app.session.set_error_toast(format!("External action failed: {err}"));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

struct App {
    session: Session,
    theme: TuiTheme,
    editor: String,
}

impl App {
    fn new(session: Session, theme: TuiTheme, editor: String) -> Self {
        Self { session, theme, editor }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.session.handle_key(key);
    }

    fn copy(&mut self, text: &str) -> Result<(), String> {
        copy_to_clipboard(text).map_err(|err| format!("Clipboard error: {err}"))
    }

    fn edit_local_in_editor(&mut self) -> Result<(), String> {
        let original = self.session.local_entries().map_err(|err| err.to_string())?;
        let initial = render_local_file(&original);
        let edited = edit_text(&self.editor, &initial).map_err(|err: EditorError| err.to_string())?;
        if edited == initial {
            self.session.set_toast("Edit cancelled (no changes)");
            return Ok(());
        }

        match self.session.sync_local_text(&edited) {
            Ok(true) => self.session.set_toast("Synced local vars from editor"),
            Ok(false) => self.session.set_toast("No changes"),
            Err(SessionError::Parse(err)) => {
                self.session.set_error_toast(format!("Edit rejected: {err}"));
            }
            Err(err) => return Err(err.to_string()),
        }
        Ok(())
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }

    /// Leaves the alternate screen for the duration of `action`.
    fn run_external_action(
        &mut self,
        action: impl FnOnce() -> Result<(), String>,
    ) -> Result<(), String> {
        let _suspend = TerminalSuspendGuard::new(&mut self.terminal)
            .map_err(|err| format!("terminal suspend failed: {err}"))?;
        action()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

struct TerminalSuspendGuard<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'a> TerminalSuspendGuard<'a> {
    fn new(terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Self> {
        terminal.show_cursor()?;
        disable_raw_mode()?;

        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            let _ = enable_raw_mode();
            let _ = execute!(terminal.backend_mut(), EnterAlternateScreen);
            let _ = terminal.hide_cursor();
            let _ = ratatui::backend::Backend::flush(terminal.backend_mut());
            return Err(err);
        }

        ratatui::backend::Backend::flush(terminal.backend_mut())?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSuspendGuard<'_> {
    fn drop(&mut self) {
        let _ = enable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), EnterAlternateScreen);
        let _ = self.terminal.clear();
        let _ = self.terminal.hide_cursor();
        let _ = ratatui::backend::Backend::flush(self.terminal.backend_mut());
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text)))
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    app.session.set_viewport_rows(usize::from(area.height.saturating_sub(CHROME_ROWS).max(1)));

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    let (header_area, search_area, table_area, status_area) =
        (layout[0], layout[1], layout[2], layout[3]);

    frame.render_widget(Paragraph::new(header_line(&app.session, &app.theme)), header_area);

    frame.render_widget(Paragraph::new(search_line(&app.session, &app.theme)), search_area);
    if app.session.mode() == &Mode::Searching {
        let query_cursor = app.session.search_input().cursor_pos();
        let cursor_x = search_area
            .x
            .saturating_add(2)
            .saturating_add(u16::try_from(query_cursor).unwrap_or(u16::MAX))
            .min(search_area.right().saturating_sub(1));
        frame.set_cursor_position((cursor_x, search_area.y));
    }

    render_table(frame, &app.session, &app.theme, table_area);
    frame.render_widget(Paragraph::new(status_line(&app.session, &app.theme)), status_area);
    let position = Paragraph::new(position_line(&app.session, &app.theme)).alignment(Alignment::Right);
    frame.render_widget(position, status_area);

    if let Some(modal) = app.session.modal() {
        render_modal(frame, &app.session, &app.theme, modal, area);
    }
}

// Header, table, status line and modal rendering.
include!("chrome.rs");
