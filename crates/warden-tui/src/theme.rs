//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};
use warden_core::Action as RuleAction;

// ── Palette ───────────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Panels ────────────────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Border of a confirmation dialog.
pub fn border_warning() -> Style {
    Style::default().fg(ELECTRIC_YELLOW)
}

// ── Tables ────────────────────────────────────────────────────────────

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Rows ticked for a bulk action.
pub fn table_marked() -> Style {
    Style::default().fg(CORAL)
}

/// Color of a rule action: allow green, block yellow, drop red.
pub fn action_color(action: RuleAction) -> Color {
    match action {
        RuleAction::Allow => SUCCESS_GREEN,
        RuleAction::Block => ELECTRIC_YELLOW,
        RuleAction::Drop => ERROR_RED,
    }
}

pub fn active_color(active: bool) -> Color {
    if active { SUCCESS_GREEN } else { BORDER_GRAY }
}

// ── Navigation ────────────────────────────────────────────────────────

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Toolbar entry that cannot be used right now.
pub fn key_hint_disabled() -> Style {
    Style::default()
        .fg(BORDER_GRAY)
        .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
}

// ── Forms ─────────────────────────────────────────────────────────────

pub fn field_label() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn field_label_focused() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn field_value() -> Style {
    Style::default().fg(NEON_CYAN)
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR_RED)
}

pub fn muted() -> Style {
    Style::default().fg(BORDER_GRAY)
}
