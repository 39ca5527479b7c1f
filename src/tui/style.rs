//! Color palettes and derived styles.
//!
//! The active `Theme` is built once per frame from the selected `ThemeName`
//! and handed to every widget.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeName;

/// One color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: ThemeName,
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub selected_bg: Color,
    pub accent: Color,
    pub key: Color,
    pub warning: Color,
    pub error: Color,
    pub popup_bg: Color,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self {
                name,
                bg: Color::Black,
                fg: Color::White,
                fg_dim: Color::DarkGray,
                header_bg: Color::Rgb(39, 39, 42),
                header_fg: Color::White,
                selected_bg: Color::Rgb(63, 63, 70),
                accent: Color::Cyan,
                key: Color::Yellow,
                warning: Color::Yellow,
                error: Color::LightRed,
                popup_bg: Color::Black,
            },
            ThemeName::Light => Self {
                name,
                bg: Color::White,
                fg: Color::Black,
                fg_dim: Color::Gray,
                header_bg: Color::Rgb(228, 228, 231),
                header_fg: Color::Black,
                selected_bg: Color::Rgb(212, 212, 216),
                accent: Color::Blue,
                key: Color::Magenta,
                warning: Color::Rgb(180, 83, 9),
                error: Color::Red,
                popup_bg: Color::White,
            },
            ThemeName::Blue => Self {
                name,
                bg: Color::Rgb(2, 8, 23),
                fg: Color::Rgb(248, 250, 252),
                fg_dim: Color::Rgb(100, 116, 139),
                header_bg: Color::Rgb(37, 99, 235),
                header_fg: Color::White,
                selected_bg: Color::Rgb(30, 41, 59),
                accent: Color::Rgb(96, 165, 250),
                key: Color::Rgb(250, 204, 21),
                warning: Color::Rgb(250, 204, 21),
                error: Color::Rgb(248, 113, 113),
                popup_bg: Color::Rgb(15, 23, 42),
            },
            ThemeName::Orange => Self {
                name,
                bg: Color::Rgb(12, 10, 9),
                fg: Color::Rgb(250, 250, 249),
                fg_dim: Color::Rgb(120, 113, 108),
                header_bg: Color::Rgb(234, 88, 12),
                header_fg: Color::White,
                selected_bg: Color::Rgb(41, 37, 36),
                accent: Color::Rgb(251, 146, 60),
                key: Color::Rgb(253, 224, 71),
                warning: Color::Rgb(253, 224, 71),
                error: Color::Rgb(239, 68, 68),
                popup_bg: Color::Rgb(28, 25, 23),
            },
            ThemeName::Stone => Self {
                name,
                bg: Color::Rgb(28, 25, 23),
                fg: Color::Rgb(231, 229, 228),
                fg_dim: Color::Rgb(120, 113, 108),
                header_bg: Color::Rgb(68, 64, 60),
                header_fg: Color::Rgb(250, 250, 249),
                selected_bg: Color::Rgb(87, 83, 78),
                accent: Color::Rgb(168, 162, 158),
                key: Color::Rgb(250, 204, 21),
                warning: Color::Rgb(250, 204, 21),
                error: Color::Rgb(248, 113, 113),
                popup_bg: Color::Rgb(41, 37, 36),
            },
            ThemeName::System => Self {
                name,
                bg: Color::Reset,
                fg: Color::Reset,
                fg_dim: Color::DarkGray,
                header_bg: Color::Blue,
                header_fg: Color::White,
                selected_bg: Color::DarkGray,
                accent: Color::Cyan,
                key: Color::Yellow,
                warning: Color::Yellow,
                error: Color::Red,
                popup_bg: Color::Reset,
            },
        }
    }

    /// Default text style.
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Header bar style.
    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_header(&self) -> Style {
        self.header()
    }

    /// Table header cell of the focused column.
    pub fn focused_header(&self) -> Style {
        self.header().add_modifier(Modifier::REVERSED)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.header_bg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    /// Text input style.
    pub fn input(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Filter chip.
    pub fn chip(&self) -> Style {
        Style::default().fg(self.bg).bg(self.accent)
    }

    /// Popup body.
    pub fn popup(&self) -> Style {
        Style::default().fg(self.fg).bg(self.popup_bg)
    }

    pub fn popup_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Section header style for detail popups.
    pub fn section_header(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }

    /// Help text style.
    pub fn help(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Highlighted key in hint lines.
    pub fn help_key(&self) -> Style {
        Style::default().fg(self.key).add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_name(ThemeName::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_has_a_palette() {
        for name in ThemeName::all() {
            assert_eq!(Theme::from_name(*name).name, *name);
        }
    }

    #[test]
    fn system_theme_keeps_terminal_colors() {
        let t = Theme::default();
        assert_eq!(t.base(), Style::default().fg(Color::Reset).bg(Color::Reset));
    }
}
