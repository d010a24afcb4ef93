//! Theme and Colors
//!
//! Palette for the conversation pane, input line and status bar.

use ratatui::style::Color;

// ============================================================================
// Conversation Colors
// ============================================================================

/// User messages and input
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Assistant replies
pub const ASSISTANT_BLUE: Color = Color::Rgb(120, 180, 255);

/// System lines (prompts, help, local errors)
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Scroll fade, outermost line
pub const FADE_DARK: Color = Color::Rgb(80, 80, 80);

/// Scroll fade, second line
pub const FADE_LIGHT: Color = Color::Rgb(120, 120, 120);

// ============================================================================
// Status Colors
// ============================================================================

/// Accent for mode and active document
pub const ACCENT_MAGENTA: Color = Color::Magenta;

/// Error status and notifications
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Warning notifications and confirm prompts
pub const WARNING_YELLOW: Color = Color::Rgb(255, 210, 90);

/// Document ready
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);
