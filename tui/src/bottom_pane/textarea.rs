//! Multi-line, auto-growing text buffer used by the composer.
//!
//! The buffer is a plain `String` with a byte cursor that always sits on a grapheme boundary.
//! Soft wrapping is computed on demand from the render width with `textwrap` (words move to the
//! next row, words longer than a row are split); the wrapped line count drives the
//! composer's height so the input grows with its content (up to [`MAX_INPUT_ROWS`]) and scrolls
//! beyond that.

use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidgetRef;
use textwrap::Options;
use textwrap::WordSplitter;
use textwrap::WrapAlgorithm;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::ui_consts::MAX_INPUT_ROWS;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextArea {
    text: String,
    cursor: usize,
    /// Column to aim for when moving vertically, so Up/Down across short lines keeps the
    /// original column.
    preferred_col: Option<usize>,
}

/// Render-time state: the first visible wrapped line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextAreaState {
    pub scroll: u16,
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole buffer and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
        self.preferred_col = None;
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.preferred_col = None;
    }

    /// Delete the grapheme before the cursor.
    pub fn delete_backward(&mut self) {
        let Some(start) = self.prev_boundary(self.cursor) else {
            return;
        };
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        self.preferred_col = None;
    }

    /// Delete the grapheme after the cursor.
    pub fn delete_forward(&mut self) {
        let Some(end) = self.next_boundary(self.cursor) else {
            return;
        };
        self.text.replace_range(self.cursor..end, "");
        self.preferred_col = None;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary(self.cursor) {
            self.cursor = prev;
        }
        self.preferred_col = None;
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary(self.cursor) {
            self.cursor = next;
        }
        self.preferred_col = None;
    }

    /// Move to the start of the current logical line.
    pub fn move_to_line_start(&mut self) {
        self.cursor = self.text[..self.cursor]
            .rfind('\n')
            .map_or(0, |idx| idx + 1);
        self.preferred_col = None;
    }

    /// Move to the end of the current logical line.
    pub fn move_to_line_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |idx| self.cursor + idx);
        self.preferred_col = None;
    }

    /// Move one wrapped line up at `width`. Returns false when already on the first line.
    pub fn move_up(&mut self, width: u16) -> bool {
        self.move_vertically(width, -1)
    }

    /// Move one wrapped line down at `width`. Returns false when already on the last line.
    pub fn move_down(&mut self, width: u16) -> bool {
        self.move_vertically(width, 1)
    }

    fn move_vertically(&mut self, width: u16, delta: isize) -> bool {
        let lines = self.wrapped_lines(width);
        let current = Self::line_index_for(&lines, self.cursor);
        let Some(target) = current.checked_add_signed(delta).filter(|t| *t < lines.len()) else {
            return false;
        };
        let col = self
            .preferred_col
            .unwrap_or_else(|| self.text[lines[current].start..self.cursor].width());
        let range = lines[target].clone();
        let mut pos = range.start;
        let mut acc = 0;
        for (idx, grapheme) in self.text[range.clone()].grapheme_indices(true) {
            let w = grapheme.width();
            if acc + w > col {
                break;
            }
            acc += w;
            pos = range.start + idx + grapheme.len();
        }
        self.cursor = pos;
        self.preferred_col = Some(col);
        true
    }

    /// Byte ranges of each wrapped (visual) line at `width`, newlines excluded.
    ///
    /// Ranges are contiguous within a logical line: whitespace swallowed by a soft break stays on
    /// the row before it. A logical line that exactly fills `width` is followed by an empty row,
    /// which is where the cursor sits after its last glyph.
    pub fn wrapped_lines(&self, width: u16) -> Vec<Range<usize>> {
        let width = usize::from(width.max(1));
        let options = Options::new(width)
            .wrap_algorithm(WrapAlgorithm::FirstFit)
            .word_splitter(WordSplitter::NoHyphenation);
        let mut lines = Vec::new();
        let mut offset = 0;
        for logical in self.text.split('\n') {
            let starts = wrap_starts(logical, &options);
            let mut last_start = 0;
            for (idx, start) in starts.iter().enumerate() {
                let end = starts.get(idx + 1).copied().unwrap_or(logical.len());
                lines.push(offset + start..offset + end);
                last_start = *start;
            }
            let end = offset + logical.len();
            if !logical.is_empty() && logical[last_start..].width() >= width {
                lines.push(end..end);
            }
            offset = end + 1;
        }
        lines
    }

    /// Rows the text field wants at `width`: one per wrapped line, clamped to
    /// `1..=MAX_INPUT_ROWS`.
    pub fn desired_height(&self, width: u16) -> u16 {
        let rows = u16::try_from(self.wrapped_lines(width).len()).unwrap_or(u16::MAX);
        rows.clamp(1, MAX_INPUT_ROWS)
    }

    /// Screen position of the cursor inside `area`, honoring the scroll offset in `state`.
    pub fn cursor_pos_with_state(&self, area: Rect, state: TextAreaState) -> Option<(u16, u16)> {
        if area.is_empty() {
            return None;
        }
        let lines = self.wrapped_lines(area.width);
        let line_idx = Self::line_index_for(&lines, self.cursor);
        let row = u16::try_from(line_idx).ok()?.checked_sub(state.scroll)?;
        if row >= area.height {
            return None;
        }
        let col = self.text[lines[line_idx].start..self.cursor].width();
        let col = u16::try_from(col)
            .unwrap_or(u16::MAX)
            .min(area.width.saturating_sub(1));
        Some((area.x + col, area.y + row))
    }

    fn line_index_for(lines: &[Range<usize>], cursor: usize) -> usize {
        lines
            .iter()
            .rposition(|line| line.start <= cursor)
            .unwrap_or(0)
    }

    fn effective_scroll(&self, area: Rect, current: u16) -> u16 {
        let lines = self.wrapped_lines(area.width);
        let cursor_line = u16::try_from(Self::line_index_for(&lines, self.cursor)).unwrap_or(0);
        let height = area.height.max(1);
        if cursor_line < current {
            cursor_line
        } else if cursor_line >= current.saturating_add(height) {
            cursor_line + 1 - height
        } else {
            current
        }
    }

    fn prev_boundary(&self, pos: usize) -> Option<usize> {
        self.text[..pos]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| idx)
    }

    fn next_boundary(&self, pos: usize) -> Option<usize> {
        self.text[pos..]
            .graphemes(true)
            .next()
            .map(|grapheme| pos + grapheme.len())
    }
}

/// Byte offsets where each `textwrap` row of `line` begins. The first row always starts at 0.
fn wrap_starts(line: &str, options: &Options<'_>) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut pos = 0;
    for row in textwrap::wrap(line, options) {
        let start = line[pos..].find(row.as_ref()).map_or(pos, |idx| pos + idx);
        starts.push(start);
        pos = start + row.len();
    }
    match starts.first_mut() {
        Some(first) => *first = 0,
        None => starts.push(0),
    }
    starts
}

impl StatefulWidgetRef for &TextArea {
    type State = TextAreaState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.is_empty() {
            return;
        }
        state.scroll = self.effective_scroll(area, state.scroll);
        let lines = self.wrapped_lines(area.width);
        for (row, range) in lines
            .iter()
            .skip(usize::from(state.scroll))
            .take(usize::from(area.height))
            .enumerate()
        {
            let y = area.y + u16::try_from(row).unwrap_or(0);
            buf.set_stringn(
                area.x,
                y,
                &self.text[range.clone()],
                usize::from(area.width),
                Style::default(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn textarea(text: &str) -> TextArea {
        let mut t = TextArea::new();
        t.insert_str(text);
        t
    }

    #[test]
    fn insert_and_backspace_respect_graphemes() {
        let mut t = textarea("héllo 👍🏽");
        t.delete_backward();
        assert_eq!(t.text(), "héllo ");
        t.move_to_line_start();
        t.move_right();
        t.move_right();
        t.delete_backward();
        assert_eq!(t.text(), "hllo ");
        assert_eq!(t.cursor(), 1);
    }

    #[test]
    fn delete_forward_at_end_is_noop() {
        let mut t = textarea("ab");
        t.delete_forward();
        assert_eq!(t.text(), "ab");
        t.move_left();
        t.delete_forward();
        assert_eq!(t.text(), "a");
    }

    #[test]
    fn wraps_by_display_width() {
        let t = textarea("abcdefgh\nxy");
        let lines: Vec<&str> = t
            .wrapped_lines(3)
            .into_iter()
            .map(|r| &t.text()[r])
            .collect();
        assert_eq!(lines, vec!["abc", "def", "gh", "xy"]);
    }

    #[test]
    fn wide_characters_wrap_before_overflowing() {
        let t = textarea("日本語");
        let lines: Vec<&str> = t
            .wrapped_lines(4)
            .into_iter()
            .map(|r| &t.text()[r])
            .collect();
        assert_eq!(lines, vec!["日本", "語"]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let t = textarea("hello world again");
        let lines: Vec<&str> = t
            .wrapped_lines(12)
            .into_iter()
            .map(|r| &t.text()[r])
            .collect();
        assert_eq!(lines, vec!["hello world ", "again"]);
    }

    #[test]
    fn cursor_after_exactly_full_line_moves_to_next_row() {
        let t = textarea("abc");
        assert_eq!(t.desired_height(3), 2);
        assert_eq!(
            t.cursor_pos_with_state(Rect::new(0, 0, 3, 2), TextAreaState::default()),
            Some((0, 1))
        );

        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        let mut state = TextAreaState::default();
        (&t).render_ref(area, &mut buf, &mut state);
        assert_eq!(state.scroll, 0);
        assert_eq!(buf[(2, 0)].symbol(), "c");
    }

    #[test]
    fn full_line_before_newline_gets_cursor_row() {
        let mut t = textarea("abc\nx");
        t.move_left();
        t.move_left();
        assert_eq!(t.cursor(), 3);
        assert_eq!(t.wrapped_lines(3).len(), 3);
        assert_eq!(
            t.cursor_pos_with_state(Rect::new(0, 0, 3, 3), TextAreaState::default()),
            Some((0, 1))
        );
    }

    #[test]
    fn height_grows_with_content_and_is_capped() {
        let mut t = TextArea::new();
        assert_eq!(t.desired_height(20), 1);
        t.insert_str("one\ntwo\nthree");
        assert_eq!(t.desired_height(20), 3);
        t.insert_str(&"\nmore".repeat(20));
        assert_eq!(t.desired_height(20), MAX_INPUT_ROWS);
    }

    #[test]
    fn trailing_newline_starts_a_new_row() {
        let t = textarea("hi\n");
        assert_eq!(t.desired_height(10), 2);
        assert_eq!(
            t.cursor_pos_with_state(Rect::new(0, 0, 10, 3), TextAreaState::default()),
            Some((0, 1))
        );
    }

    #[test]
    fn vertical_movement_keeps_preferred_column() {
        let mut t = textarea("abcdef\nx\nabcdef");
        assert!(t.move_up(20));
        assert_eq!(t.cursor(), 8);
        assert!(t.move_up(20));
        assert_eq!(t.cursor(), 6);
        assert!(!t.move_up(20));
        assert!(t.move_down(20));
        assert!(t.move_down(20));
        assert_eq!(t.cursor(), t.text().len());
        assert!(!t.move_down(20));
    }

    #[test]
    fn render_scrolls_to_keep_cursor_visible() {
        let t = textarea("1\n2\n3\n4\n5");
        let area = Rect::new(0, 0, 5, 2);
        let mut buf = Buffer::empty(area);
        let mut state = TextAreaState::default();
        (&t).render_ref(area, &mut buf, &mut state);
        assert_eq!(state.scroll, 3);
        assert_eq!(buf[(0, 0)].symbol(), "4");
        assert_eq!(buf[(0, 1)].symbol(), "5");
        assert_eq!(t.cursor_pos_with_state(area, state), Some((1, 1)));
    }
}
