// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

pub(crate) const PALETTE_ENV: &str = "ENVA_TUI_PALETTE";

/// Colors for every styled element of the TUI.
///
/// Without a palette override the terminal's own ANSI colors are used.
#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    palette: Option<TuiPalette>,
}

impl TuiTheme {
    pub(crate) fn from_env() -> Result<Self, ThemeError> {
        let palette = palette_override_from_env()?;
        Ok(Self { palette })
    }

    pub(crate) fn base_style(&self) -> Style {
        match &self.palette {
            Some(palette) => Style::default().fg(palette.fg).bg(palette.bg),
            None => Style::default(),
        }
    }

    fn ansi_color(&self, color: Ansi16) -> Color {
        match &self.palette {
            Some(palette) => palette.ansi_color(color.idx()),
            None => color.terminal(),
        }
    }

    fn fg(&self, color: Ansi16) -> Style {
        self.base_style().fg(self.ansi_color(color))
    }

    pub(crate) fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.fg(Ansi16::Yellow)
        } else {
            self.fg(Ansi16::BrightBlack)
        }
    }

    pub(crate) fn title_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::BOLD)
    }

    pub(crate) fn dim_style(&self) -> Style {
        self.fg(Ansi16::BrightBlack)
    }

    pub(crate) fn key_hint_style(&self) -> Style {
        self.fg(Ansi16::Cyan).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn selection_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        self.fg(Ansi16::Red).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn toast_style(&self) -> Style {
        self.fg(Ansi16::Green)
    }

    pub(crate) fn match_style(&self) -> Style {
        self.fg(Ansi16::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub(crate) fn local_badge_style(&self) -> Style {
        self.fg(Ansi16::Green).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn override_badge_style(&self) -> Style {
        self.fg(Ansi16::Magenta).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn inherited_badge_style(&self) -> Style {
        self.fg(Ansi16::Blue)
    }
}

/// `ENVA_TUI_PALETTE`: `fg,bg` followed by the 16 ANSI colors, comma separated.
#[derive(Debug, Clone)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    ansi: [Color; 16],
}

impl TuiPalette {
    fn ansi_color(&self, idx: usize) -> Color {
        self.ansi[idx]
    }
}

impl FromStr for TuiPalette {
    type Err = ThemeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let colors = raw
            .split(',')
            .enumerate()
            .map(|(slot, part)| {
                parse_palette_color(part)
                    .ok_or_else(|| ThemeError::BadColor { slot, value: part.trim().to_owned() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [fg, bg, rest @ ..] = colors.as_slice() else {
            return Err(ThemeError::SlotCount { found: colors.len() });
        };
        let ansi: [Color; 16] =
            rest.try_into().map_err(|_| ThemeError::SlotCount { found: colors.len() })?;
        Ok(Self { fg: *fg, bg: *bg, ansi })
    }
}

fn palette_override_from_env() -> Result<Option<TuiPalette>, ThemeError> {
    let raw = match env::var(PALETTE_ENV) {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => return Err(ThemeError::NotUnicode),
    };
    match raw.trim() {
        "" => Ok(None),
        trimmed => trimmed.parse().map(Some),
    }
}

/// `#RRGGBB`, `0xRRGGBB` or X11 `rgb:R/G/B` with 2 or 4 hex digits per channel.
fn parse_palette_color(raw: &str) -> Option<Color> {
    let lower = raw.trim().to_ascii_lowercase();
    if let Some(channels) = lower.strip_prefix("rgb:") {
        let mut parts = channels.split('/').map(hex_channel);
        let color = Color::Rgb(parts.next()??, parts.next()??, parts.next()??);
        return parts.next().is_none().then_some(color);
    }

    let digits = lower.strip_prefix('#').or_else(|| lower.strip_prefix("0x"))?;
    if digits.len() != 6 {
        return None;
    }
    let packed = u32::from_str_radix(digits, 16).ok()?;
    let [_, r, g, b] = packed.to_be_bytes();
    Some(Color::Rgb(r, g, b))
}

/// High byte of a 2 or 4 digit hex channel.
fn hex_channel(digits: &str) -> Option<u8> {
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        2 => u8::from_str_radix(digits, 16).ok(),
        4 => u16::from_str_radix(digits, 16).ok().map(|wide| (wide >> 8) as u8),
        _ => None,
    }
}

/// The ANSI slots the theme draws with, and the terminal color used without a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ansi16 {
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    BrightBlack = 8,
}

impl Ansi16 {
    const fn idx(self) -> usize {
        self as usize
    }

    const fn terminal(self) -> Color {
        match self {
            Self::Red => Color::Red,
            Self::Green => Color::Green,
            Self::Yellow => Color::Yellow,
            Self::Blue => Color::Blue,
            Self::Magenta => Color::Magenta,
            Self::Cyan => Color::Cyan,
            Self::BrightBlack => Color::DarkGray,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ThemeError {
    #[error("ENVA_TUI_PALETTE is not valid unicode")]
    NotUnicode,
    #[error("ENVA_TUI_PALETTE needs 18 comma-separated colors (fg, bg, 16 ANSI), got {found}")]
    SlotCount { found: usize },
    #[error("ENVA_TUI_PALETTE color #{slot} is not #RRGGBB, 0xRRGGBB or rgb:R/G/B: {value:?}")]
    BadColor { slot: usize, value: String },
}
