//! The chat composer is the message input form state machine.
//!
//! It is responsible for:
//!
//! - Editing the input buffer (a [`TextArea`] that grows with its content).
//! - Staging at most one image attachment, rejecting files over [`MAX_IMAGE_BYTES`].
//! - Handling submit vs newline on Enter.
//! - Moving focus between the text field, the attach control and the send control.
//!
//! # Submission
//!
//! Enter without modifiers submits from the text field. A draft that is empty after trimming is
//! never submitted and is left untouched. Otherwise the buffer is cleared *before* the text is
//! handed back to the caller, so the field empties while the caller's send is still running. The
//! returned text is the buffer exactly as it was, surrounding whitespace included.
//!
//! While the caller reports a running submission (`set_task_running(true)`) Enter still submits,
//! but the result is [`InputResult::Queued`] so the caller can deliver it once the running one
//! completes. The send control, in contrast, is disabled while a submission runs or while the
//! buffer is the empty string, and ignores activation in that state.
//!
//! # Attachments
//!
//! Selections come from the attach control's path prompt, from pasting a path to an image, or
//! from a clipboard image (<kbd>Ctrl</kbd>+<kbd>V</kbd>). They all end up in
//! [`ChatComposer::on_image_selection`], which keeps the previous attachment when the new file is
//! too large, replaces it otherwise, and returns focus to the text field either way.
use std::cell::Cell;
use std::cell::RefCell;
use std::time::Duration;
use std::time::Instant;

use composer_protocol::models::MAX_IMAGE_BYTES;
use composer_protocol::models::local_image_label_text;
use composer_protocol::num_format::format_with_separators;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::StatefulWidgetRef;
use unicode_width::UnicodeWidthStr;

use super::footer::FooterMode;
use super::footer::FooterProps;
use super::footer::footer_height;
use super::footer::render_footer;
use super::image_picker::ImagePicker;
use super::image_picker::PickError;
use super::image_picker::SelectedImage;
use super::image_picker::cap_selection;
use super::image_picker::resolve_image;
use super::textarea::TextArea;
use super::textarea::TextAreaState;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::clipboard_paste::PasteImageError;
use crate::clipboard_paste::paste_image_to_temp_png;
use crate::key_hint;
use crate::key_hint::KeyBinding;
use crate::key_hint::has_ctrl_or_alt;
use crate::locale::MessageLocale;
use crate::render::renderable::Renderable;
use crate::toast::Toast;
use crate::ui_consts::ATTACH_CONTROL_COLS;
use crate::ui_consts::LIVE_PREFIX_COLS;
use crate::ui_consts::SEND_CONTROL_COLS;

/// How long the "press again to quit" hint stays visible.
pub const QUIT_SHORTCUT_TIMEOUT: Duration = Duration::from_secs(1);

/// Width assumed for vertical cursor movement before the first render.
const DEFAULT_TEXT_WIDTH: u16 = 70;

/// Result returned when the user interacts with the composer.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    /// Text to deliver now; the buffer has already been cleared.
    Submitted(String),
    /// Text submitted while another submission is running; deliver it after that one.
    Queued(String),
    None,
}

/// Which part of the form receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerFocus {
    TextInput,
    AttachButton,
    SendButton,
}

impl ComposerFocus {
    fn next(self) -> Self {
        match self {
            ComposerFocus::TextInput => ComposerFocus::AttachButton,
            ComposerFocus::AttachButton => ComposerFocus::SendButton,
            ComposerFocus::SendButton => ComposerFocus::TextInput,
        }
    }

    fn prev(self) -> Self {
        match self {
            ComposerFocus::TextInput => ComposerFocus::SendButton,
            ComposerFocus::AttachButton => ComposerFocus::TextInput,
            ComposerFocus::SendButton => ComposerFocus::AttachButton,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    #[error("attachment is {byte_size} bytes, over the {limit} byte limit")]
    OversizedAttachment { byte_size: u64, limit: u64 },
}

pub struct ChatComposer {
    textarea: TextArea,
    textarea_state: RefCell<TextAreaState>,
    app_event_tx: AppEventSender,
    attached_image: Option<SelectedImage>,
    image_picker: ImagePicker,
    focus: ComposerFocus,
    placeholder_text: String,
    locale: MessageLocale,
    is_task_running: bool,
    quit_shortcut_expires_at: Option<Instant>,
    quit_shortcut_key: KeyBinding,
    newline_key: KeyBinding,
    /// Text width seen by the last render; used for Up/Down across wrapped lines.
    last_text_width: Cell<u16>,
}

struct ComposerLayout {
    attach: Rect,
    prefix: Rect,
    textarea: Rect,
    send: Rect,
    detail_row: Rect,
    footer: Rect,
}

impl ChatComposer {
    /// Create a composer whose text field has focus, as on first render.
    pub fn new(
        app_event_tx: AppEventSender,
        placeholder_text: String,
        locale: MessageLocale,
    ) -> Self {
        Self {
            textarea: TextArea::new(),
            textarea_state: RefCell::new(TextAreaState::default()),
            app_event_tx,
            attached_image: None,
            image_picker: ImagePicker::new(),
            focus: ComposerFocus::TextInput,
            placeholder_text,
            locale,
            is_task_running: false,
            quit_shortcut_expires_at: None,
            quit_shortcut_key: key_hint::ctrl(KeyCode::Char('c')),
            newline_key: key_hint::shift(KeyCode::Enter),
            last_text_width: Cell::new(DEFAULT_TEXT_WIDTH),
        }
    }

    /// Returns true if the composer currently contains no text.
    pub fn is_empty(&self) -> bool {
        self.textarea.is_empty()
    }

    pub fn current_text(&self) -> &str {
        self.textarea.text()
    }

    /// Replace the entire text with `text` and move the cursor to its end.
    #[cfg(test)]
    pub fn set_text_content(&mut self, text: String) {
        self.textarea.set_text(&text);
    }

    /// Without keyboard enhancement, Shift+Enter arrives as plain Enter; advertise Ctrl+J instead.
    pub fn set_enhanced_keys_supported(&mut self, supported: bool) {
        self.newline_key = if supported {
            key_hint::shift(KeyCode::Enter)
        } else {
            key_hint::ctrl(KeyCode::Char('j'))
        };
    }

    #[cfg(test)]
    pub fn focus(&self) -> ComposerFocus {
        self.focus
    }

    /// The staged image, if any.
    pub fn attachment(&self) -> Option<&SelectedImage> {
        self.attached_image.as_ref()
    }

    #[cfg(test)]
    pub fn is_picker_open(&self) -> bool {
        self.image_picker.is_open()
    }

    pub fn set_task_running(&mut self, running: bool) {
        self.is_task_running = running;
    }

    pub fn is_task_running(&self) -> bool {
        self.is_task_running
    }

    /// The send control is disabled while a submission runs or while the buffer is the empty
    /// string. Whitespace-only drafts keep it enabled; submitting them is a no-op.
    pub fn submit_disabled(&self) -> bool {
        self.is_task_running || self.textarea.text().is_empty()
    }

    /// Apply a selection from the image picker.
    ///
    /// Only the first entry is considered. A file over [`MAX_IMAGE_BYTES`] is rejected with a
    /// toast and leaves the current attachment as it was; anything else replaces it (an empty
    /// selection clears it). Focus returns to the text field in every case.
    pub fn on_image_selection(
        &mut self,
        selection: Vec<SelectedImage>,
    ) -> Result<(), ComposerError> {
        let selection = cap_selection(selection);
        let oversized = selection
            .first()
            .map(|image| image.byte_size)
            .filter(|byte_size| *byte_size > MAX_IMAGE_BYTES);

        let result = if let Some(byte_size) = oversized {
            tracing::info!("rejected image attachment of {byte_size} bytes");
            self.app_event_tx.send(AppEvent::ShowToast(Toast::error(
                self.locale.oversized_attachment(),
            )));
            Err(ComposerError::OversizedAttachment {
                byte_size,
                limit: MAX_IMAGE_BYTES,
            })
        } else {
            self.attached_image = selection.into_iter().next();
            match &self.attached_image {
                Some(image) => tracing::debug!(
                    "staged image {} ({} bytes, {})",
                    image.path.display(),
                    image.byte_size,
                    image.format.label()
                ),
                None => tracing::debug!("cleared staged image"),
            }
            Ok(())
        };

        self.focus = ComposerFocus::TextInput;
        result
    }

    /// Integrate pasted text.
    ///
    /// - While the path prompt is open, the paste goes into the prompt (newlines dropped).
    /// - Otherwise, if the paste resolves to an image file, it is selected as the attachment.
    /// - Otherwise, the text is inserted into the text field.
    pub fn handle_paste(&mut self, pasted: String) -> bool {
        if let Some(input) = self.image_picker.input_mut() {
            input.insert_str(&pasted.replace(['\r', '\n'], ""));
            return true;
        }

        if pasted.chars().count() > 1 && self.try_attach_pasted_path(&pasted) {
            return true;
        }

        // Normalize CRLF/CR line endings coming from some terminals.
        let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.textarea.insert_str(&pasted);
        self.focus = ComposerFocus::TextInput;
        true
    }

    fn try_attach_pasted_path(&mut self, pasted: &str) -> bool {
        match resolve_image(pasted) {
            Ok(image) => {
                if let Err(err) = self.on_image_selection(vec![image]) {
                    tracing::debug!("pasted image rejected: {err}");
                }
                true
            }
            Err(err) => {
                tracing::trace!("paste is not an image path: {err}");
                false
            }
        }
    }

    /// Clear a non-empty draft. Returns the discarded text.
    pub fn clear_for_ctrl_c(&mut self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let previous = self.textarea.text().to_string();
        self.textarea.set_text("");
        Some(previous)
    }

    /// Whether the quit shortcut hint should currently be shown.
    ///
    /// This is time-based rather than event-based, so the owner schedules a redraw for
    /// [`QUIT_SHORTCUT_TIMEOUT`] after showing it.
    pub fn quit_shortcut_hint_visible(&self) -> bool {
        self.quit_shortcut_expires_at
            .is_some_and(|expires_at| Instant::now() < expires_at)
    }

    fn show_quit_shortcut_hint(&mut self, key: KeyBinding) {
        self.quit_shortcut_expires_at = Instant::now()
            .checked_add(QUIT_SHORTCUT_TIMEOUT)
            .or_else(|| Some(Instant::now()));
        self.quit_shortcut_key = key;
    }

    /// Handle a key event coming from the main UI.
    ///
    /// Returns the submission outcome and whether the composer needs a redraw.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if key_event.kind == KeyEventKind::Release {
            return (InputResult::None, false);
        }

        match key_event {
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if has_ctrl_or_alt(modifiers) && c.eq_ignore_ascii_case(&'v') => {
                self.paste_clipboard_image();
                return (InputResult::None, true);
            }
            KeyEvent {
                code: KeyCode::Char('o'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.image_picker.open();
                return (InputResult::None, true);
            }
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => return self.handle_ctrl_c(),
            KeyEvent {
                code: KeyCode::Char('d'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } if self.is_empty() && !self.image_picker.is_open() => {
                self.app_event_tx.send(AppEvent::ExitRequest);
                return (InputResult::None, false);
            }
            _ => {}
        }

        self.quit_shortcut_expires_at = None;

        if self.image_picker.is_open() {
            return self.handle_key_event_with_picker(key_event);
        }

        match key_event.code {
            KeyCode::Tab if key_event.modifiers == KeyModifiers::NONE => {
                self.focus = self.focus.next();
                return (InputResult::None, true);
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return (InputResult::None, true);
            }
            _ => {}
        }

        match self.focus {
            ComposerFocus::TextInput => self.handle_key_event_in_text(key_event),
            ComposerFocus::AttachButton => self.handle_key_event_on_attach(key_event),
            ComposerFocus::SendButton => self.handle_key_event_on_send(key_event),
        }
    }

    fn handle_ctrl_c(&mut self) -> (InputResult, bool) {
        if self.image_picker.is_open() {
            self.image_picker.cancel();
            self.focus = ComposerFocus::TextInput;
            return (InputResult::None, true);
        }
        if self.clear_for_ctrl_c().is_some() {
            self.quit_shortcut_expires_at = None;
            return (InputResult::None, true);
        }
        if self.quit_shortcut_hint_visible() {
            self.quit_shortcut_expires_at = None;
            self.app_event_tx.send(AppEvent::ExitRequest);
            return (InputResult::None, false);
        }
        self.show_quit_shortcut_hint(key_hint::ctrl(KeyCode::Char('c')));
        (InputResult::None, true)
    }

    fn handle_key_event_in_text(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        let width = self.last_text_width.get();
        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            } => self.handle_submission(),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('j'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.textarea.insert_str("\n");
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Char('a'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::Home,
                ..
            } => {
                self.textarea.move_to_line_start();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Char('e'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::End, ..
            } => {
                self.textarea.move_to_line_end();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if !has_ctrl_or_alt(modifiers) => {
                let mut buf = [0u8; 4];
                self.textarea.insert_str(c.encode_utf8(&mut buf));
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => {
                self.textarea.delete_backward();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => {
                self.textarea.delete_forward();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => {
                self.textarea.move_left();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => {
                self.textarea.move_right();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Up, ..
            } => (InputResult::None, self.textarea.move_up(width)),
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => (InputResult::None, self.textarea.move_down(width)),
            _ => (InputResult::None, false),
        }
    }

    fn handle_key_event_on_attach(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.image_picker.open();
                (InputResult::None, true)
            }
            KeyCode::Backspace | KeyCode::Delete if self.attached_image.is_some() => {
                // Removing is an empty selection; it cannot fail.
                if let Err(err) = self.on_image_selection(Vec::new()) {
                    tracing::warn!("failed to clear attachment: {err}");
                }
                (InputResult::None, true)
            }
            KeyCode::Esc => {
                self.focus = ComposerFocus::TextInput;
                (InputResult::None, true)
            }
            _ => (InputResult::None, false),
        }
    }

    fn handle_key_event_on_send(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.submit_disabled() {
                    return (InputResult::None, false);
                }
                let result = self.handle_submission();
                self.focus = ComposerFocus::TextInput;
                (result.0, true)
            }
            KeyCode::Esc => {
                self.focus = ComposerFocus::TextInput;
                (InputResult::None, true)
            }
            _ => (InputResult::None, false),
        }
    }

    fn handle_key_event_with_picker(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Esc => {
                self.image_picker.cancel();
                self.focus = ComposerFocus::TextInput;
            }
            KeyCode::Enter => {
                let raw = self.image_picker.take_input().unwrap_or_default();
                if raw.trim().is_empty() {
                    self.focus = ComposerFocus::TextInput;
                } else {
                    self.attach_from_picker(&raw);
                }
            }
            _ => {
                let Some(input) = self.image_picker.input_mut() else {
                    return (InputResult::None, false);
                };
                match key_event.code {
                    KeyCode::Char(c) if !has_ctrl_or_alt(key_event.modifiers) => {
                        let mut buf = [0u8; 4];
                        input.insert_str(c.encode_utf8(&mut buf));
                    }
                    KeyCode::Backspace => input.delete_backward(),
                    KeyCode::Delete => input.delete_forward(),
                    KeyCode::Left => input.move_left(),
                    KeyCode::Right => input.move_right(),
                    KeyCode::Home => input.move_to_line_start(),
                    KeyCode::End => input.move_to_line_end(),
                    _ => return (InputResult::None, false),
                }
            }
        }
        (InputResult::None, true)
    }

    fn attach_from_picker(&mut self, raw: &str) {
        match self.image_picker.select_path(raw) {
            Ok(selection) => {
                if let Err(err) = self.on_image_selection(selection) {
                    tracing::debug!("picked image rejected: {err}");
                }
            }
            Err(err) => self.reject_pick(&err),
        }
    }

    fn reject_pick(&mut self, err: &PickError) {
        tracing::info!("image selection rejected: {err}");
        self.app_event_tx
            .send(AppEvent::ShowToast(Toast::error(err.toast_message(self.locale))));
        self.focus = ComposerFocus::TextInput;
    }

    fn paste_clipboard_image(&mut self) {
        let pasted = paste_image_to_temp_png().and_then(|(temp, info)| {
            let byte_size = std::fs::metadata(&temp)
                .map_err(|err| PasteImageError::IoError(err.to_string()))?
                .len();
            let mut image = SelectedImage::from_temp_file(temp, byte_size);
            image.format = info.encoded_format;
            image.dimensions = Some((info.width, info.height));
            Ok(image)
        });
        match pasted {
            Ok(image) => {
                if let Err(err) = self.on_image_selection(vec![image]) {
                    tracing::debug!("clipboard image rejected: {err}");
                }
            }
            Err(err) => {
                tracing::warn!("failed to paste image: {err}");
                self.app_event_tx.send(AppEvent::ShowToast(Toast::error(
                    self.locale.clipboard_paste_failed(&err.to_string()),
                )));
                self.focus = ComposerFocus::TextInput;
            }
        }
    }

    /// Clear the buffer and hand back its pre-clear contents, unless it is blank.
    fn prepare_submission_text(&mut self) -> Option<String> {
        if self.textarea.text().trim().is_empty() {
            return None;
        }
        let text = self.textarea.text().to_string();
        self.textarea.set_text("");
        Some(text)
    }

    fn handle_submission(&mut self) -> (InputResult, bool) {
        match self.prepare_submission_text() {
            Some(text) if self.is_task_running => (InputResult::Queued(text), true),
            Some(text) => (InputResult::Submitted(text), true),
            None => (InputResult::None, false),
        }
    }

    fn footer_props(&self) -> FooterProps {
        FooterProps {
            mode: self.footer_mode(),
            locale: self.locale,
            submit_disabled: self.submit_disabled(),
            has_attachment: self.attached_image.is_some(),
            newline_key: self.newline_key,
            quit_shortcut_key: self.quit_shortcut_key,
        }
    }

    fn footer_mode(&self) -> FooterMode {
        if self.quit_shortcut_hint_visible() {
            FooterMode::QuitShortcutReminder
        } else if self.image_picker.is_open() {
            FooterMode::PickerPrompt
        } else {
            match self.focus {
                ComposerFocus::TextInput => FooterMode::ShortcutSummary,
                focus => FooterMode::Tooltip(focus),
            }
        }
    }

    fn has_detail_row(&self) -> bool {
        self.attached_image.is_some() || self.image_picker.is_open()
    }

    fn text_width(width: u16) -> u16 {
        width.saturating_sub(ATTACH_CONTROL_COLS + LIVE_PREFIX_COLS + SEND_CONTROL_COLS)
    }

    /// Split `area` into the composer's parts. When `area` is shorter than
    /// [`Renderable::desired_height`], rows are given up in this order: bottom padding, top
    /// padding, detail row, footer, extra text rows. The first text row is kept as long as `area`
    /// has any height; every part lies inside `area`.
    fn layout_areas(&self, area: Rect) -> ComposerLayout {
        let text_width = Self::text_width(area.width);
        let wanted_footer = footer_height(self.footer_props());
        let wanted_detail = u16::from(self.has_detail_row());
        let text_h = self
            .textarea
            .desired_height(text_width)
            .min(area.height.saturating_sub(wanted_footer + wanted_detail + 2))
            .max(1)
            .min(area.height);
        let mut spare = area.height - text_h;
        let footer_h = wanted_footer.min(spare);
        spare -= footer_h;
        let detail_h = wanted_detail.min(spare);
        spare -= detail_h;
        let top_pad = spare.min(1);

        let text_y = area.y + top_pad;
        let attach = Rect::new(area.x, text_y, ATTACH_CONTROL_COLS, 1);
        let prefix = Rect::new(attach.right(), text_y, LIVE_PREFIX_COLS, 1);
        let textarea = Rect::new(prefix.right(), text_y, text_width, text_h);
        let send_x = area
            .right()
            .saturating_sub(SEND_CONTROL_COLS)
            .max(textarea.right());
        let send = Rect::new(send_x, text_y, SEND_CONTROL_COLS, 1);
        let detail_row = Rect::new(area.x, text_y + text_h, area.width, detail_h);
        let footer = Rect::new(area.x, area.bottom() - footer_h, area.width, footer_h);
        ComposerLayout {
            attach: attach.intersection(area),
            prefix: prefix.intersection(area),
            textarea: textarea.intersection(area),
            send: send.intersection(area),
            detail_row: detail_row.intersection(area),
            footer: footer.intersection(area),
        }
    }

    fn control_style(&self, control: ComposerFocus) -> Style {
        if self.focus == control && !self.image_picker.is_open() {
            Style::default().reversed()
        } else {
            Style::default()
        }
    }

    fn render_attach_control(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let mut spans = vec![
            " ".into(),
            Span::styled("+", self.control_style(ComposerFocus::AttachButton)).bold(),
        ];
        if self.attached_image.is_some() {
            spans.push("•".cyan().bold());
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }

    fn render_send_control(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let mut style = self.control_style(ComposerFocus::SendButton);
        style = if self.submit_disabled() {
            style.dim()
        } else {
            style.bold()
        };
        let line = Line::from(vec![" ".into(), Span::styled("⏎", style)]);
        buf.set_line(area.x, area.y, &line, area.width);
    }

    fn detail_label_width(&self) -> u16 {
        let prompt_width = self.locale.image_path_prompt().width();
        u16::try_from(prompt_width)
            .unwrap_or(u16::MAX)
            .saturating_add(ATTACH_CONTROL_COLS)
    }

    fn render_detail_row(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let indent = " ".repeat(usize::from(ATTACH_CONTROL_COLS));
        if let Some(input) = self.image_picker.input() {
            let line = Line::from(vec![
                Span::from(indent),
                Span::from(self.locale.image_path_prompt()).cyan(),
                Span::from(input.text().to_string()),
            ]);
            buf.set_line(area.x, area.y, &line, area.width);
        } else if let Some(image) = self.attached_image.as_ref() {
            let mut details = format!(
                "{} ({} bytes)",
                image.file_name(),
                format_with_separators(image.byte_size)
            );
            if let Some((w, h)) = image.dimensions {
                details.push_str(&format!(" {w}×{h}"));
            }
            let line = Line::from(vec![
                Span::from(indent),
                Span::from(local_image_label_text(1)).cyan(),
                " ".into(),
                Span::from(details).dim(),
            ]);
            buf.set_line(area.x, area.y, &line, area.width);
        }
    }
}

impl Renderable for ChatComposer {
    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let layout = self.layout_areas(area);
        if let Some(input) = self.image_picker.input() {
            if layout.detail_row.is_empty() {
                return None;
            }
            let before_cursor = &input.text()[..input.cursor()];
            let col = self
                .detail_label_width()
                .saturating_add(u16::try_from(before_cursor.width()).unwrap_or(u16::MAX))
                .min(layout.detail_row.width.saturating_sub(1));
            return Some((layout.detail_row.x + col, layout.detail_row.y));
        }
        if self.focus != ComposerFocus::TextInput {
            return None;
        }
        let state = *self.textarea_state.borrow();
        self.textarea.cursor_pos_with_state(layout.textarea, state)
    }

    fn desired_height(&self, width: u16) -> u16 {
        let text_h = self.textarea.desired_height(Self::text_width(width));
        1 + text_h + u16::from(self.has_detail_row()) + 1 + footer_height(self.footer_props())
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let layout = self.layout_areas(area);
        self.last_text_width.set(layout.textarea.width.max(1));

        self.render_attach_control(layout.attach, buf);
        if !layout.prefix.is_empty() {
            let prompt = if self.focus == ComposerFocus::TextInput {
                "›".bold()
            } else {
                "›".dim()
            };
            buf.set_span(layout.prefix.x, layout.prefix.y, &prompt, layout.prefix.width);
        }

        let mut state = self.textarea_state.borrow_mut();
        StatefulWidgetRef::render_ref(&(&self.textarea), layout.textarea, buf, &mut *state);
        drop(state);
        if self.textarea.is_empty() && !layout.textarea.is_empty() {
            let placeholder = Span::from(self.placeholder_text.clone()).dim();
            buf.set_span(
                layout.textarea.x,
                layout.textarea.y,
                &placeholder,
                layout.textarea.width,
            );
        }

        self.render_send_control(layout.send, buf);
        self.render_detail_row(layout.detail_row, buf);
        render_footer(layout.footer, buf, self.footer_props());
    }
}
