//! Bottom pane: the prompt form shown while the composer session runs.
//!
//! The pane owns the `ChatComposer`, the list of messages queued while a submission runs, and the
//! most recent toast. It renders them top to bottom: toast, queue, composer. When the terminal is
//! too short for all of them, the composer keeps its rows and the toast and queue are clipped.

mod chat_composer;
mod footer;
mod image_picker;
mod queued_user_messages;
mod textarea;

pub use chat_composer::ChatComposer;
pub use chat_composer::InputResult;

use chat_composer::QUIT_SHORTCUT_TIMEOUT;
use queued_user_messages::QueuedUserMessages;

use std::time::Instant;

use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::app_event_sender::AppEventSender;
use crate::locale::MessageLocale;
use crate::render::renderable::ColumnRenderable;
use crate::render::renderable::Renderable;
use crate::toast::Toast;
use crate::tui::FrameRequester;

pub struct BottomPaneParams {
    pub frame_requester: FrameRequester,
    pub app_event_tx: AppEventSender,
    pub placeholder_text: String,
    pub locale: MessageLocale,
    pub enhanced_keys_supported: bool,
}

pub struct BottomPane {
    frame_requester: FrameRequester,
    composer: ChatComposer,
    queued_user_messages: QueuedUserMessages,
    toast: Option<Toast>,
}

impl BottomPane {
    pub fn new(params: BottomPaneParams) -> Self {
        let BottomPaneParams {
            frame_requester,
            app_event_tx,
            placeholder_text,
            locale,
            enhanced_keys_supported,
        } = params;

        let mut composer = ChatComposer::new(app_event_tx, placeholder_text, locale);
        composer.set_enhanced_keys_supported(enhanced_keys_supported);

        Self {
            frame_requester,
            composer,
            queued_user_messages: QueuedUserMessages::new(),
            toast: None,
        }
    }

    pub fn composer(&self) -> &ChatComposer {
        &self.composer
    }

    /// Forward a key to the composer and schedule the redraws it implies.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputResult {
        let (result, needs_redraw) = self.composer.handle_key_event(key_event);
        if needs_redraw {
            self.request_redraw();
        }
        if self.composer.quit_shortcut_hint_visible() {
            self.frame_requester.schedule_frame_in(QUIT_SHORTCUT_TIMEOUT);
        }
        result
    }

    pub fn handle_paste(&mut self, pasted: String) {
        if self.composer.handle_paste(pasted) {
            self.request_redraw();
        }
    }

    pub fn set_task_running(&mut self, running: bool) {
        if self.composer.is_task_running() != running {
            self.composer.set_task_running(running);
            self.request_redraw();
        }
    }

    pub fn set_queued_user_messages(&mut self, queued: Vec<String>) {
        self.queued_user_messages.messages = queued;
        self.request_redraw();
    }

    /// Replace the current toast and schedule the redraw that hides it.
    pub fn show_toast(&mut self, toast: Toast) {
        self.frame_requester
            .schedule_frame_in(toast.remaining(Instant::now()));
        self.toast = Some(toast);
        self.request_redraw();
    }

    /// The toast to draw at `now`, if it has not expired.
    pub fn visible_toast(&self, now: Instant) -> Option<&Toast> {
        self.toast.as_ref().filter(|toast| toast.is_visible_at(now))
    }

    fn request_redraw(&self) {
        self.frame_requester.schedule_frame();
    }

    /// Toast and queued messages, stacked above the composer.
    fn status_rows(&self) -> ColumnRenderable<'_> {
        let mut column = ColumnRenderable::new();
        column.push(self.visible_toast(Instant::now()));
        column.push(&self.queued_user_messages);
        column
    }

    /// The composer takes its rows from the bottom of `area` first; the status rows get what is
    /// left above it.
    fn split_area(&self, area: Rect) -> (Rect, Rect) {
        let composer_height = self.composer.desired_height(area.width).min(area.height);
        let status = Rect::new(area.x, area.y, area.width, area.height - composer_height);
        let composer = Rect::new(area.x, status.bottom(), area.width, composer_height);
        (status, composer)
    }
}

impl Renderable for BottomPane {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let (status, composer) = self.split_area(area);
        if !status.is_empty() {
            self.status_rows().render(status, buf);
        }
        self.composer.render(composer, buf);
    }

    fn desired_height(&self, width: u16) -> u16 {
        self.status_rows()
            .desired_height(width)
            .saturating_add(self.composer.desired_height(width))
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let (_, composer) = self.split_area(area);
        self.composer.cursor_pos(composer)
    }
}
