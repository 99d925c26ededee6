use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;

use crate::render::renderable::Renderable;

/// Widget that lists messages submitted while another submission was still running.
///
/// Each message is shown on one row (first line only, `…` when truncated). Messages leave the list
/// as the driver delivers them.
pub(crate) struct QueuedUserMessages {
    pub messages: Vec<String>,
}

impl QueuedUserMessages {
    pub(crate) fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        self.messages
            .iter()
            .map(|message| {
                let mut lines = message.trim().lines();
                let first = lines.next().unwrap_or_default().to_string();
                let mut spans = vec!["  ↳ ".dim(), first.dim().italic()];
                if lines.next().is_some() {
                    spans.push(" …".dim());
                }
                Line::from(spans)
            })
            .collect()
    }
}

impl Renderable for QueuedUserMessages {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        for (line, y) in self.lines().iter().zip(area.top()..area.bottom()) {
            buf.set_line(area.x, y, line, area.width);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        u16::try_from(self.messages.len()).unwrap_or(u16::MAX)
    }
}
