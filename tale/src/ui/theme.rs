//! Color theme and styling for the story TUI.

use ratatui::style::{Color, Modifier, Style};

/// UI color theme.
#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,
    pub dim: Color,
    pub error: Color,
    pub ending: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::White,
            accent: Color::Magenta,
            dim: Color::DarkGray,
            error: Color::LightRed,
            ending: Color::Magenta,
        }
    }
}

impl Theme {
    /// Style for narrative text.
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    /// Style for hints and secondary chrome.
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim).add_modifier(Modifier::DIM)
    }

    /// Style for highlighted elements.
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Style for the generation failure message.
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Style for the ending banner.
    pub fn ending_style(&self) -> Style {
        Style::default().fg(self.ending).add_modifier(Modifier::BOLD)
    }

    /// Border style.
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
