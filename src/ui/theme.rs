//! Centralized theming for the redraft TUI
//!
//! Every color and style the interface uses comes from here.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;
use std::sync::RwLock;

use crate::config::ThemeVariant;
use crate::constants::RATING_MAX;

/// Global theme variant, set once from config at startup
static THEME_VARIANT: RwLock<ThemeVariant> = RwLock::new(ThemeVariant::Modern);

/// Initialize the theme variant (call once at startup)
pub fn init_theme(variant: ThemeVariant) {
    if let Ok(mut guard) = THEME_VARIANT.write() {
        *guard = variant;
    }
}

/// Get the current theme variant
pub fn current_theme() -> ThemeVariant {
    THEME_VARIANT.read().map(|g| *g).unwrap_or_default()
}

/// Catppuccin Mocha color palette for the Modern theme
mod catppuccin {
    use super::Color;

    pub const BASE: Color = Color::Rgb(30, 30, 46); // #1e1e2e
    pub const MANTLE: Color = Color::Rgb(24, 24, 37); // #181825
    pub const SURFACE0: Color = Color::Rgb(49, 50, 68); // #313244
    pub const SURFACE1: Color = Color::Rgb(69, 71, 90); // #45475a
    pub const TEXT: Color = Color::Rgb(205, 214, 244); // #cdd6f4
    pub const SUBTEXT1: Color = Color::Rgb(186, 194, 222); // #bac2de
    pub const OVERLAY0: Color = Color::Rgb(108, 112, 134); // #6c7086
    pub const LAVENDER: Color = Color::Rgb(180, 190, 254); // #b4befe
    pub const BLUE: Color = Color::Rgb(137, 180, 250); // #89b4fa
    pub const GREEN: Color = Color::Rgb(166, 227, 161); // #a6e3a1
    pub const YELLOW: Color = Color::Rgb(249, 226, 175); // #f9e2af
    pub const PEACH: Color = Color::Rgb(250, 179, 135); // #fab387
    pub const RED: Color = Color::Rgb(243, 139, 168); // #f38ba8
}

/// Tokyo Night color palette
mod tokyo_night {
    use super::Color;

    pub const BG: Color = Color::Rgb(26, 27, 38); // #1a1b26
    pub const BG_DARK: Color = Color::Rgb(22, 22, 30); // #16161e
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42
    pub const FG: Color = Color::Rgb(192, 202, 245); // #c0caf5
    pub const FG_DARK: Color = Color::Rgb(169, 177, 214); // #a9b1d6
    pub const COMMENT: Color = Color::Rgb(86, 95, 137); // #565f89
    pub const BLUE: Color = Color::Rgb(122, 162, 247); // #7aa2f7
    pub const CYAN: Color = Color::Rgb(125, 207, 255); // #7dcfff
    pub const GREEN: Color = Color::Rgb(158, 206, 106); // #9ece6a
    pub const YELLOW: Color = Color::Rgb(224, 175, 104); // #e0af68
    pub const ORANGE: Color = Color::Rgb(255, 158, 100); // #ff9e64
    pub const RED: Color = Color::Rgb(247, 118, 142); // #f7768e
    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261
}

pub mod borders {
    use super::*;

    /// Rounded for RGB themes, plain for terminal palettes
    pub fn popup() -> BorderType {
        match current_theme() {
            ThemeVariant::Modern | ThemeVariant::TokyoNight => BorderType::Rounded,
            ThemeVariant::Dark | ThemeVariant::HighContrast => BorderType::Plain,
        }
    }

    pub fn panel() -> BorderType {
        BorderType::Plain
    }
}

/// Color palette - colors that vary by theme
pub mod colors {
    use super::*;

    pub fn bg_main() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::BASE,
            ThemeVariant::TokyoNight => tokyo_night::BG,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::Reset,
        }
    }

    pub fn bg_selection() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SURFACE1,
            ThemeVariant::TokyoNight => tokyo_night::BG_HIGHLIGHT,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::Blue,
        }
    }

    pub fn bg_status() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::MANTLE,
            ThemeVariant::TokyoNight => tokyo_night::BG_DARK,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::Black,
        }
    }

    pub fn bg_error() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::RED,
            ThemeVariant::TokyoNight => tokyo_night::RED,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::Red,
        }
    }

    pub fn fg_primary() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::TEXT,
            ThemeVariant::TokyoNight => tokyo_night::FG,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn fg_secondary() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SUBTEXT1,
            ThemeVariant::TokyoNight => tokyo_night::FG_DARK,
            ThemeVariant::Dark => Color::Gray,
            ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn fg_muted() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::OVERLAY0,
            ThemeVariant::TokyoNight => tokyo_night::COMMENT,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn fg_accent() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::BLUE,
            ThemeVariant::TokyoNight => tokyo_night::BLUE,
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::HighContrast => Color::LightCyan,
        }
    }

    pub fn fg_warning() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::YELLOW,
            ThemeVariant::TokyoNight => tokyo_night::YELLOW,
            ThemeVariant::Dark => Color::Yellow,
            ThemeVariant::HighContrast => Color::LightYellow,
        }
    }

    pub fn fg_success() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::GREEN,
            ThemeVariant::TokyoNight => tokyo_night::GREEN,
            ThemeVariant::Dark => Color::Green,
            ThemeVariant::HighContrast => Color::LightGreen,
        }
    }

    pub fn fg_danger() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::RED,
            ThemeVariant::TokyoNight => tokyo_night::RED,
            ThemeVariant::Dark => Color::Red,
            ThemeVariant::HighContrast => Color::LightRed,
        }
    }

    /// Middling ratings
    pub fn fg_caution() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::PEACH,
            ThemeVariant::TokyoNight => tokyo_night::ORANGE,
            ThemeVariant::Dark => Color::Yellow,
            ThemeVariant::HighContrast => Color::LightYellow,
        }
    }

    pub fn border() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SURFACE0,
            ThemeVariant::TokyoNight => tokyo_night::BORDER,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn border_focused() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::LAVENDER,
            ThemeVariant::TokyoNight => tokyo_night::CYAN,
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::HighContrast => Color::LightYellow,
        }
    }
}

pub mod symbols {
    /// Marks the focused selector
    pub const FOCUS: &str = "▶ ";
    pub const NO_FOCUS: &str = "  ";
    pub const CHOICE_LEFT: &str = "‹ ";
    pub const CHOICE_RIGHT: &str = " ›";
    pub const OUTCOME_OK: &str = "●";
    pub const OUTCOME_FAILED: &str = "✗";
    pub const IDLE: &str = "○";
}

/// Pre-composed styles for common UI elements
pub struct Theme;

impl Theme {
    pub fn selected() -> Style {
        Style::default()
            .bg(colors::bg_selection())
            .fg(colors::fg_primary())
    }

    pub fn selected_bold() -> Style {
        Self::selected().add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default()
            .fg(colors::fg_primary())
            .bg(colors::bg_main())
    }

    pub fn text_secondary() -> Style {
        Style::default()
            .fg(colors::fg_secondary())
            .bg(colors::bg_main())
    }

    pub fn text_muted() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
    }

    pub fn text_accent() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_main())
    }

    pub fn text_error() -> Style {
        Style::default()
            .fg(colors::fg_danger())
            .bg(colors::bg_main())
    }

    pub fn label() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    /// Value of the focused selector
    pub fn input_highlight() -> Style {
        Style::default()
            .fg(colors::fg_warning())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    /// Color a judge rating by how close it is to the top of the scale
    pub fn rating(rating: u8) -> Style {
        let fg = match i64::from(rating) {
            r if r >= RATING_MAX => colors::fg_success(),
            r if r >= RATING_MAX - 1 => colors::fg_caution(),
            _ => colors::fg_danger(),
        };
        Style::default()
            .fg(fg)
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    // === Tabs ===

    pub fn tab() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_status())
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_status())
            .add_modifier(Modifier::BOLD)
    }

    // === Status Bar ===

    pub fn status_bar() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_primary())
    }

    /// Spinner while a request is in flight
    pub fn status_busy() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_warning())
    }

    pub fn status_idle() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_success())
    }

    pub fn status_alert() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_danger())
    }

    pub fn status_muted() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_muted())
    }

    pub fn error_bar() -> Style {
        Style::default()
            .bg(colors::bg_error())
            .fg(colors::fg_primary())
    }

    // === Help Bar ===

    pub fn help_key() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_warning())
    }

    pub fn help_desc() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_muted())
    }

    // === Borders ===

    pub fn border() -> Style {
        Style::default().fg(colors::border()).bg(colors::bg_main())
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(colors::border_focused())
            .bg(colors::bg_main())
    }

    /// Main background style - fills the frame before widgets draw
    pub fn main_bg() -> Style {
        Style::default().bg(colors::bg_main())
    }
}
