//! Theme system for the TUI.
//!
//! `ThemeVariant` selects between Dark and Light palettes; `ColorPalette`
//! maps each semantic UI role to a ratatui `Style`.

use ratatui::style::{Color, Modifier, Style};

/// Light violet used for badges, the active tab and focus.
const ACCENT: Color = Color::Rgb(0x93, 0x70, 0xDB);

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Tabs and chips --
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub chip_selected: Style,
    pub chip_normal: Style,

    // -- News list --
    pub headline_title: Style,
    pub item_title: Style,
    pub item_selected: Style,
    pub item_meta: Style,
    pub badge: Style,

    // -- Reader --
    pub reader_title: Style,
    pub reader_heading: Style,
    pub reader_body: Style,
    pub reader_metadata: Style,
    pub reader_code: Style,
    pub reader_emphasis: Style,
    pub reader_strong: Style,
    pub reader_link: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub error: Style,
    pub loading: Style,
    pub panel_border: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            tab_active: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            chip_selected: Style::default().bg(ACCENT).fg(Color::White),
            chip_normal: Style::default().bg(Color::Rgb(0x33, 0x33, 0x33)).fg(Color::White),

            headline_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            item_title: Style::default().add_modifier(Modifier::BOLD),
            item_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            item_meta: Style::default().fg(Color::DarkGray),
            badge: Style::default().fg(ACCENT),

            reader_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            reader_heading: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            reader_body: Style::default(),
            reader_metadata: Style::default().fg(Color::DarkGray),
            reader_code: Style::default().fg(Color::Yellow),
            reader_emphasis: Style::default().add_modifier(Modifier::ITALIC),
            reader_strong: Style::default().add_modifier(Modifier::BOLD),
            reader_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            error: Style::default().fg(Color::Red),
            loading: Style::default().fg(ACCENT),
            panel_border: Style::default().fg(Color::DarkGray),
        }
    }

    fn light() -> Self {
        Self {
            tab_active: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            chip_selected: Style::default().bg(Color::Magenta).fg(Color::White),
            chip_normal: Style::default().bg(Color::Gray).fg(Color::Black),

            headline_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            item_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            item_selected: Style::default().bg(Color::Gray).fg(Color::Black),
            item_meta: Style::default().fg(Color::DarkGray),
            badge: Style::default().fg(Color::Magenta),

            reader_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            reader_heading: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            reader_body: Style::default().fg(Color::Black),
            reader_metadata: Style::default().fg(Color::DarkGray),
            reader_code: Style::default().fg(Color::Red),
            reader_emphasis: Style::default().add_modifier(Modifier::ITALIC),
            reader_strong: Style::default().add_modifier(Modifier::BOLD),
            reader_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::Gray).fg(Color::Black),
            error: Style::default().fg(Color::Red),
            loading: Style::default().fg(Color::Magenta),
            panel_border: Style::default().fg(Color::Gray),
        }
    }
}
