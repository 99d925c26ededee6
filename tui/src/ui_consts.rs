//! Shared layout constants for the composer UI.

/// Columns reserved on the left for the live prompt prefix (`› `).
pub const LIVE_PREFIX_COLS: u16 = 2;

/// Indent used by footer hint lines.
pub const FOOTER_INDENT_COLS: u16 = 2;

/// Columns taken by the attach control (`+`) and its badge.
pub const ATTACH_CONTROL_COLS: u16 = 4;

/// Columns taken by the send control (`⏎`) on the right edge.
pub const SEND_CONTROL_COLS: u16 = 4;

/// Upper bound for the auto-growing text field, in rows.
pub const MAX_INPUT_ROWS: u16 = 10;
