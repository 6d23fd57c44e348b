// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

const BADGE_LOCAL: &str = "●";
const BADGE_OVERRIDE: &str = "◆";
const BADGE_INHERITED: &str = "○";
const NEWLINE_GLYPH: char = '⏎';
const KEY_COLUMN_MAX: u16 = 40;

fn header_line(session: &Session, theme: &TuiTheme) -> Line<'static> {
    let ctx = session.ctx();
    let mut spans = vec![
        Span::styled(" enva ".to_owned(), theme.title_style()),
        Span::styled(ctx.target().to_string(), theme.base_style()),
    ];
    if ctx.root() != ctx.target() {
        spans.push(Span::styled(format!("  (root {})", ctx.root()), theme.dim_style()));
    }
    push_footer_entry(&mut spans, "view", session.view().label(), theme);
    push_footer_entry(&mut spans, "profile", ctx.profile().as_str(), theme);
    Line::from(spans)
}

fn search_line(session: &Session, theme: &TuiTheme) -> Line<'static> {
    let query = session.search_query();
    let searching = session.mode() == &Mode::Searching;
    if query.is_empty() && !searching {
        return Line::from(Span::styled(" / to search".to_owned(), theme.dim_style()));
    }

    let mut spans = vec![
        Span::styled("/ ".to_owned(), theme.key_hint_style()),
        Span::styled(query, theme.base_style()),
        Span::raw("   "),
    ];
    let count = session.results().len();
    spans.push(Span::styled(format!("{count} match{}", if count == 1 { "" } else { "es" }), theme.toast_style()));
    if searching {
        push_footer_entry(&mut spans, "Accept", "Enter", theme);
        push_footer_entry(&mut spans, "Clear", "Esc", theme);
    }
    Line::from(spans)
}

fn render_table(frame: &mut Frame<'_>, session: &Session, theme: &TuiTheme, area: Rect) {
    let title = format!(" {} · {} ", view_title(session.view()), session.results().len());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(theme.title_style())
        .border_style(theme.border_style(session.modal().is_none()));

    if session.results().is_empty() {
        let message = if session.search_query().is_empty() {
            "No variables here. Press a to add one."
        } else {
            "No matches."
        };
        let empty = Paragraph::new(Span::styled(message, theme.dim_style())).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let visible = session
        .results()
        .iter()
        .enumerate()
        .skip(session.offset())
        .take(session.viewport_rows());
    let rows = visible
        .map(|(idx, result)| {
            let row = Row::new(vec![
                Cell::from(badge_span(session, &result.value, theme)),
                Cell::from(Line::from(highlighted_spans(
                    result.value.key.as_str(),
                    &result.key_matches,
                    theme,
                ))),
                Cell::from(Line::from(highlighted_spans(
                    &single_line(&result.value.value),
                    &result.value_matches,
                    theme,
                ))),
            ]);
            if idx == session.cursor() {
                row.style(theme.selection_style())
            } else {
                row
            }
        })
        .collect::<Vec<_>>();

    let key_width = key_column_width(session.results());
    let header = Row::new(vec!["", "KEY", "VALUE"]).style(theme.dim_style());
    let table = Table::new(
        rows,
        [Constraint::Length(2), Constraint::Length(key_width), Constraint::Min(10)],
    )
    .header(header)
    .column_spacing(1)
    .block(block);
    frame.render_widget(table, area);
}

fn view_title(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Effective => "Effective",
        ViewMode::Local => "Local",
    }
}

fn key_column_width(results: &[SearchResult]) -> u16 {
    let widest = results.iter().map(|r| r.value.key.as_str().chars().count()).max().unwrap_or(3);
    u16::try_from(widest).unwrap_or(KEY_COLUMN_MAX).clamp(3, KEY_COLUMN_MAX)
}

fn badge_span(session: &Session, value: &ResolvedValue, theme: &TuiTheme) -> Span<'static> {
    match (session.is_local(value), value.is_overridden()) {
        (true, true) => Span::styled(BADGE_OVERRIDE, theme.override_badge_style()),
        (true, false) => Span::styled(BADGE_LOCAL, theme.local_badge_style()),
        (false, _) => Span::styled(BADGE_INHERITED, theme.inherited_badge_style()),
    }
}

/// Replaces line breaks with a visible glyph; char positions are preserved one to one.
fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '\n' => NEWLINE_GLYPH,
            ch if ch.is_control() => ' ',
            ch => ch,
        })
        .collect()
}

/// Splits `text` into plain and highlighted runs; `matches` are sorted char indices.
fn highlighted_spans(text: &str, matches: &[usize], theme: &TuiTheme) -> Vec<Span<'static>> {
    if matches.is_empty() {
        return vec![Span::raw(text.to_owned())];
    }

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_highlighted = false;
    let mut next_match = matches.iter().peekable();
    for (idx, ch) in text.chars().enumerate() {
        let highlighted = next_match.next_if(|&&pos| pos == idx).is_some();
        if highlighted != run_highlighted && !run.is_empty() {
            spans.push(styled_run(std::mem::take(&mut run), run_highlighted, theme));
        }
        run_highlighted = highlighted;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(styled_run(run, run_highlighted, theme));
    }
    spans
}

fn styled_run(text: String, highlighted: bool, theme: &TuiTheme) -> Span<'static> {
    if highlighted {
        Span::styled(text, theme.match_style())
    } else {
        Span::raw(text)
    }
}

fn status_line(session: &Session, theme: &TuiTheme) -> Line<'static> {
    if let Some(toast) = session.toast() {
        let style = if toast.is_error { theme.error_style() } else { theme.toast_style() };
        return Line::from(Span::styled(format!(" {}", toast.message), style));
    }

    let mut spans = Vec::new();
    if let Some(selected) = session.selected() {
        spans.push(Span::styled(" defined at ".to_owned(), theme.dim_style()));
        spans.push(Span::raw(selected.defined_at.to_string()));
        if let Some(overrides) = &selected.overrides {
            spans.push(Span::styled(" · overrides ".to_owned(), theme.dim_style()));
            spans.push(Span::raw(overrides.to_string()));
        }
    } else {
        push_footer_entry(&mut spans, "Add", "a", theme);
        push_footer_entry(&mut spans, "Help", "?", theme);
        push_footer_entry(&mut spans, "Quit", "q", theme);
    }
    Line::from(spans)
}

fn position_line(session: &Session, theme: &TuiTheme) -> Line<'static> {
    let total = session.results().len();
    let current = if total == 0 { 0 } else { session.cursor() + 1 };
    Line::from(Span::styled(format!("{current}/{total} "), theme.dim_style()))
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str, theme: &TuiTheme) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ".to_owned(), theme.dim_style()));
    }
    spans.push(Span::styled(format!("{}: ", footer_label_ucfirst(label)), theme.dim_style()));
    spans.push(Span::styled(value.to_owned(), theme.key_hint_style()));
}

fn footer_label_ucfirst(label: &str) -> String {
    let mut chars = label.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let vertical_margin = (100u16.saturating_sub(height_percent)) / 2;
    let horizontal_margin = (100u16.saturating_sub(width_percent)) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(vertical_margin),
            Constraint::Percentage(height_percent),
            Constraint::Percentage(vertical_margin),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(horizontal_margin),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(horizontal_margin),
        ])
        .split(vertical[1])[1]
}

fn modal_block(title: &str, theme: &TuiTheme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .title_style(theme.title_style())
        .border_style(theme.border_style(true))
        .style(theme.base_style())
}

fn render_modal(frame: &mut Frame<'_>, session: &Session, theme: &TuiTheme, modal: &Modal, area: Rect) {
    let (width, height) = match modal {
        Modal::ConfirmDelete { .. } => (50, 20),
        Modal::Help { .. } => (60, 80),
        _ => (70, 60),
    };
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let (lines, scroll) = match modal {
        Modal::Edit(state) => (edit_lines(state, theme), 0),
        Modal::BulkImport { input, error } => (bulk_import_lines(input, error.as_deref(), theme), 0),
        Modal::ViewValue { key, scroll } => {
            (view_value_lines(session.ctx().get(key.as_str()), theme), *scroll)
        }
        Modal::Help { scroll } => (help_lines(theme), *scroll),
        Modal::ConfirmDelete { key } => (
            vec![
                Line::from(format!("Delete {key} from this directory?")),
                Line::from(""),
                Line::from(vec![
                    Span::styled("y", theme.key_hint_style()),
                    Span::raw(" delete   "),
                    Span::styled("n", theme.key_hint_style()),
                    Span::raw(" cancel"),
                ]),
            ],
            0,
        ),
    };

    let paragraph = Paragraph::new(lines)
        .block(modal_block(modal.title(), theme))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, rect);
}

fn edit_lines(state: &EditState, theme: &TuiTheme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let fields = [
        (EditField::Key, "Key", &state.key),
        (EditField::Value, "Value", &state.value),
        (EditField::Description, "Description", &state.description),
    ];
    for (field, label, input) in fields {
        let focused = state.focus == field;
        let locked = field == EditField::Key && !state.is_new;
        let label_style = if focused { theme.key_hint_style() } else { theme.dim_style() };
        let suffix = if locked { " (locked)" } else { "" };
        lines.push(Line::from(Span::styled(format!("{label}{suffix}:"), label_style)));
        lines.extend(input_lines(input, focused, theme));
        lines.push(Line::from(""));
    }
    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(error.clone(), theme.error_style())));
    }
    let mut hints = Vec::new();
    push_footer_entry(&mut hints, "Next field", "Tab", theme);
    push_footer_entry(&mut hints, "Save", "Ctrl+S", theme);
    push_footer_entry(&mut hints, "Cancel", "Esc", theme);
    lines.push(Line::from(hints));
    lines
}

fn bulk_import_lines(input: &TextInput, error: Option<&str>, theme: &TuiTheme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Paste KEY=value lines. `export` prefixes and # comments are accepted.".to_owned(),
            theme.dim_style(),
        )),
        Line::from(""),
    ];
    lines.extend(input_lines(input, true, theme));
    lines.push(Line::from(""));
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(error.to_owned(), theme.error_style())));
    }
    let mut hints = Vec::new();
    push_footer_entry(&mut hints, "Import", "Ctrl+S", theme);
    push_footer_entry(&mut hints, "Cancel", "Esc", theme);
    lines.push(Line::from(hints));
    lines
}

fn view_value_lines(value: Option<&ResolvedValue>, theme: &TuiTheme) -> Vec<Line<'static>> {
    let Some(value) = value else {
        return vec![Line::from(Span::styled("Value no longer exists.", theme.dim_style()))];
    };
    let mut lines = vec![Line::from(Span::styled(value.key.to_string(), theme.title_style()))];
    if let Some(description) = &value.description {
        lines.push(Line::from(Span::styled(format!("# {description}"), theme.dim_style())));
    }
    lines.push(Line::from(Span::styled(format!("defined at {}", value.defined_at), theme.dim_style())));
    lines.push(Line::from(""));
    lines.extend(value.value.split('\n').map(|line| Line::from(line.to_owned())));
    lines
}

fn help_lines(theme: &TuiTheme) -> Vec<Line<'static>> {
    let key_width = HELP_BINDINGS.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);
    HELP_BINDINGS
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{key:>key_width$}"), theme.key_hint_style()),
                Span::raw("  "),
                Span::raw((*desc).to_owned()),
            ])
        })
        .collect()
}

/// Renders an input's text with the cursor cell shown reversed when `focused`.
fn input_lines(input: &TextInput, focused: bool, theme: &TuiTheme) -> Vec<Line<'static>> {
    let cursor_style = theme.selection_style();
    let cursor = focused.then(|| input.cursor_pos());
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();

    for (idx, ch) in input.text().chars().enumerate() {
        if cursor == Some(idx) {
            if !run.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut run)));
            }
            let shown = if ch == '\n' { " ".to_owned() } else { ch.to_string() };
            spans.push(Span::styled(shown, cursor_style));
            if ch != '\n' {
                continue;
            }
        }
        if ch == '\n' {
            if !run.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut run)));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
        } else {
            run.push(ch);
        }
    }
    if !run.is_empty() {
        spans.push(Span::raw(run));
    }
    if cursor.is_some_and(|pos| pos >= input.text().chars().count()) {
        spans.push(Span::styled(" ".to_owned(), cursor_style));
    }
    lines.push(Line::from(spans));
    lines
}
