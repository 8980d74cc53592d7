//! Theme and Colors
//!
//! Terminal palette for the research chat. Badge colours follow the usual
//! market convention: green up, red down, gray for everything else.

use ratatui::style::{Color, Modifier, Style};

use crate::display::Tone;

// ============================================================================
// Market Palette
// ============================================================================

/// Bullish badge / positive move
pub const BULL_GREEN: Color = Color::Rgb(110, 220, 140);

/// Bearish badge / negative move
pub const BEAR_RED: Color = Color::Rgb(255, 95, 95);

/// Neutral badge
pub const NEUTRAL_GRAY: Color = Color::Rgb(170, 170, 170);

// ============================================================================
// UI Colors
// ============================================================================

/// Assistant accent (headings, names)
pub const ACCENT_BLUE: Color = Color::Rgb(120, 170, 255);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Pending indicator
pub const PENDING_AMBER: Color = Color::Rgb(255, 200, 90);

/// Style for a display tone
#[must_use]
pub fn style_for(tone: Tone) -> Style {
    match tone {
        Tone::User => Style::default().fg(USER_GREEN),
        Tone::Assistant => Style::default().fg(Color::White),
        Tone::Heading => Style::default()
            .fg(ACCENT_BLUE)
            .add_modifier(Modifier::BOLD),
        Tone::Error => Style::default().fg(ERROR_RED),
        Tone::Bullish | Tone::Positive => Style::default().fg(BULL_GREEN),
        Tone::Bearish | Tone::Negative => Style::default().fg(BEAR_RED),
        Tone::Neutral => Style::default().fg(NEUTRAL_GRAY),
        Tone::Dim => Style::default().fg(DIM_GRAY),
        Tone::Blank => Style::default(),
    }
}
