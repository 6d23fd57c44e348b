// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Key, ResolvedValue};
use crate::session::TextInput;

/// Key bindings listed by the help modal, in display order.
pub const HELP_BINDINGS: &[(&str, &str)] = &[
    ("j/k, ↑/↓", "Navigate up/down"),
    ("g/G", "Go to top/bottom"),
    ("Ctrl+d/u", "Half page down/up"),
    ("/", "Enter search mode"),
    ("Esc", "Clear search / exit search"),
    ("t", "Toggle view: Effective / Local"),
    ("Enter, e", "Edit selected variable"),
    ("a", "Add new variable"),
    ("A", "Bulk import variables"),
    ("E", "Edit local variables in $EDITOR"),
    ("v", "View full value"),
    ("x", "Delete local variable"),
    ("u", "Undo last action"),
    ("y", "Copy KEY=value"),
    ("Y", "Copy export line"),
    ("?", "Show this help"),
    ("q", "Quit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Key,
    Value,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub key: TextInput,
    pub value: TextInput,
    pub description: TextInput,
    pub focus: EditField,
    /// Adding a new key; the key field is only editable in this case.
    pub is_new: bool,
    pub error: Option<String>,
}

impl EditState {
    pub fn new_value() -> Self {
        Self {
            key: TextInput::single_line(""),
            value: TextInput::multi_line(""),
            description: TextInput::single_line(""),
            focus: EditField::Key,
            is_new: true,
            error: None,
        }
    }

    pub fn existing(value: &ResolvedValue) -> Self {
        Self {
            key: TextInput::single_line(value.key.as_str()),
            value: TextInput::multi_line(&value.value),
            description: TextInput::single_line(value.description.as_deref().unwrap_or_default()),
            focus: EditField::Value,
            is_new: false,
            error: None,
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            EditField::Key => &mut self.key,
            EditField::Value => &mut self.value,
            EditField::Description => &mut self.description,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match (self.focus, self.is_new) {
            (EditField::Key, _) => EditField::Value,
            (EditField::Value, _) => EditField::Description,
            (EditField::Description, true) => EditField::Key,
            (EditField::Description, false) => EditField::Value,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match (self.focus, self.is_new) {
            (EditField::Key, _) => EditField::Description,
            (EditField::Value, true) => EditField::Key,
            (EditField::Value, false) => EditField::Description,
            (EditField::Description, _) => EditField::Value,
        };
    }
}

/// The active modal and its typed sub-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Edit(EditState),
    BulkImport { input: TextInput, error: Option<String> },
    ViewValue { key: Key, scroll: u16 },
    Help { scroll: u16 },
    ConfirmDelete { key: Key },
}

impl Modal {
    pub fn bulk_import() -> Self {
        Self::BulkImport { input: TextInput::multi_line(""), error: None }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Edit(state) if state.is_new => "Add Variable",
            Self::Edit(_) => "Edit Variable",
            Self::BulkImport { .. } => "Bulk Import",
            Self::ViewValue { .. } => "View Value",
            Self::Help { .. } => "Keybindings",
            Self::ConfirmDelete { .. } => "Confirm Delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditField, EditState};

    #[test]
    fn new_value_focus_cycles_through_all_fields() {
        let mut state = EditState::new_value();
        let mut seen = vec![state.focus];
        for _ in 0..3 {
            state.focus_next();
            seen.push(state.focus);
        }
        assert_eq!(seen, vec![EditField::Key, EditField::Value, EditField::Description, EditField::Key]);
        state.focus_prev();
        assert_eq!(state.focus, EditField::Description);
    }

    #[test]
    fn existing_value_never_focuses_key() {
        let mut state = EditState::new_value();
        state.is_new = false;
        state.focus = EditField::Value;
        state.focus_next();
        state.focus_next();
        assert_eq!(state.focus, EditField::Value);
        state.focus_prev();
        assert_eq!(state.focus, EditField::Description);
    }
}
