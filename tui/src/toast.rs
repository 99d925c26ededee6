//! Transient notifications shown above the composer.
//!
//! A toast is time-based: it stays visible until `expires_at`, and the owner schedules a redraw
//! for that instant so it disappears even when the UI is otherwise idle.

use std::time::Duration;
use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::render::Insets;
use crate::render::RectExt;
use crate::render::renderable::Renderable;
use crate::ui_consts::LIVE_PREFIX_COLS;

/// How long a toast stays on screen unless replaced.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

/// An error notification for a rejected attachment or a failed clipboard paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_duration(message, DEFAULT_TOAST_DURATION)
    }

    pub fn with_duration(message: impl Into<String>, duration: Duration) -> Self {
        let now = Instant::now();
        Self {
            message: message.into(),
            expires_at: now.checked_add(duration).unwrap_or(now),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Time left before the toast should disappear.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    fn line(&self) -> Line<'static> {
        Line::from(vec![
            Span::from("✗ ").red().bold(),
            Span::from(self.message.clone()).red(),
        ])
    }
}

impl Renderable for Toast {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let area = area.inset(Insets::tlbr(0, LIVE_PREFIX_COLS, 0, 0));
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::MessageLocale;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn toast_expires_after_duration() {
        let toast = Toast::with_duration("boom", Duration::from_secs(2));
        let start = toast.expires_at - Duration::from_secs(2);
        assert!(toast.is_visible_at(start));
        assert!(toast.is_visible_at(start + Duration::from_millis(1999)));
        assert!(!toast.is_visible_at(toast.expires_at));
        assert_eq!(toast.remaining(toast.expires_at), Duration::ZERO);
    }

    fn snapshot_toast(name: &str, toast: &Toast, width: u16) {
        let mut terminal = Terminal::new(TestBackend::new(width, 1)).expect("terminal");
        terminal
            .draw(|f| toast.render(f.area(), f.buffer_mut()))
            .expect("draw");
        assert_snapshot!(name, terminal.backend());
    }

    #[test]
    fn error_toast_snapshots() {
        snapshot_toast(
            "toast_oversized_attachment",
            &Toast::error(MessageLocale::En.oversized_attachment()),
            40,
        );
        snapshot_toast(
            "toast_oversized_attachment_ja",
            &Toast::error(MessageLocale::Ja.oversized_attachment()),
            60,
        );
    }

    #[test]
    fn long_toast_is_clipped_to_width() {
        snapshot_toast(
            "toast_clipped",
            &Toast::error(MessageLocale::En.oversized_attachment()),
            16,
        );
    }
}
