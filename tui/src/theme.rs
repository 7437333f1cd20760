//! Color palette and glyphs for the tasklab TUI.
//!
//! Kanagawa Wave derived palette, trimmed to the handful of roles this UI
//! actually renders.

use ratatui::style::{Color, Modifier, Style};

mod colors {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_PANEL: Color = Color::Rgb(31, 31, 40); // sumiInk3
    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray

    pub const ACCENT: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const SUCCESS: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const ERROR: Color = Color::Rgb(255, 93, 98); // peachRed
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_muted: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
}

#[must_use]
pub fn palette() -> Palette {
    Palette {
        bg_dark: colors::BG_DARK,
        bg_panel: colors::BG_PANEL,
        bg_highlight: colors::BG_HIGHLIGHT,
        bg_border: colors::BG_BORDER,
        text_primary: colors::TEXT_PRIMARY,
        text_muted: colors::TEXT_MUTED,
        accent: colors::ACCENT,
        success: colors::SUCCESS,
        error: colors::ERROR,
    }
}

impl Palette {
    #[must_use]
    pub fn button(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.bg_dark)
                .bg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text_primary).bg(self.bg_highlight)
        }
    }

    #[must_use]
    pub fn greeting(&self, has_error: bool) -> Style {
        if has_error {
            Style::default().fg(self.error).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text_primary)
        }
    }
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for the given frame counter (emitter-active indicator).
#[must_use]
pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick / 4) as usize % SPINNER_FRAMES.len()]
}
