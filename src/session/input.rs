// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Editable text buffer with a cursor.
///
/// Stored as chars so cursor arithmetic never splits a multi-byte character. Multi-line buffers
/// accept `Enter` as a newline and move between lines with the arrow keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    buffer: Vec<char>,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn single_line(text: &str) -> Self {
        Self::with_text(text, false)
    }

    pub fn multi_line(text: &str) -> Self {
        Self::with_text(text, true)
    }

    fn with_text(text: &str, multiline: bool) -> Self {
        let buffer: Vec<char> = text.chars().collect();
        let cursor = buffer.len();
        Self { buffer, cursor, multiline }
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.chars().collect();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, ch: char) {
        if ch == '\n' && !self.multiline {
            return;
        }
        self.buffer.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert(ch);
        }
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        }
    }

    /// Start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    /// End of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.cursor - start;
        let prev_start = self.line_start(start - 1);
        self.cursor = (prev_start + column).min(start - 1);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.buffer.len() {
            self.cursor = end;
            return;
        }
        let column = self.cursor - self.line_start(self.cursor);
        let next_start = end + 1;
        self.cursor = (next_start + column).min(self.line_end(next_start));
    }

    /// Zero-based `(line, column)` of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let line = self.buffer[..self.cursor].iter().filter(|ch| **ch == '\n').count();
        (line, self.cursor - self.line_start(self.cursor))
    }

    fn line_start(&self, pos: usize) -> usize {
        self.buffer[..pos].iter().rposition(|ch| *ch == '\n').map_or(0, |idx| idx + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.buffer[pos..].iter().position(|ch| *ch == '\n').map_or(self.buffer.len(), |idx| pos + idx)
    }

    /// Applies an editing key. Returns `true` when the text changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let before = self.buffer.len();
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let start = self.line_start(self.cursor);
                self.buffer.drain(start..self.cursor);
                self.cursor = start;
                return self.buffer.len() != before;
            }
            KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                return false;
            }
            KeyCode::Char(ch) => {
                self.insert(ch);
                return true;
            }
            KeyCode::Enter if self.multiline => {
                self.insert('\n');
                return true;
            }
            KeyCode::Backspace => self.delete_back(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Up if self.multiline => self.move_up(),
            KeyCode::Down if self.multiline => self.move_down(),
            _ => {}
        }
        self.buffer.len() != before
    }
}
