//! Event loop for the message input form.
//!
//! [`run_prompt_form`] draws the bottom pane, routes terminal input to the composer and hands
//! submitted text to the caller's callback. The callback runs on its own task so the form keeps
//! rendering (and accepting input) while it is in flight. Text submitted during that time is
//! queued and delivered, in order and exactly once, after the running submission completes.

use std::collections::VecDeque;
use std::future::Future;

use ratatui::layout::Rect;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::bottom_pane::BottomPane;
use crate::bottom_pane::BottomPaneParams;
use crate::bottom_pane::InputResult;
use crate::exit::AppExitInfo;
use crate::exit::ExitReason;
use crate::locale::MessageLocale;
use crate::render::renderable::Renderable;
use crate::tui::FrameRequester;
use crate::tui::Tui;
use crate::tui::TuiEvent;

pub const DEFAULT_PLACEHOLDER: &str = "Send a message.";

#[derive(Debug, Clone)]
pub struct PromptFormOptions {
    pub placeholder: String,
    pub locale: MessageLocale,
}

impl Default for PromptFormOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            locale: MessageLocale::detect(),
        }
    }
}

/// Run the form until the user quits.
///
/// `on_submit` receives each non-blank submission. Its outcome is not inspected: when the future
/// completes (or panics) the loading state ends. On exit an in-flight submission is awaited, never
/// cancelled; queued texts that were not delivered yet are returned in [`AppExitInfo::unsent`].
pub async fn run_prompt_form<F, Fut>(
    tui: &mut Tui,
    options: PromptFormOptions,
    on_submit: F,
) -> anyhow::Result<AppExitInfo>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let events = tui.event_stream();
    let frame_requester = tui.frame_requester();
    let enhanced_keys_supported = tui.enhanced_keys_supported();
    frame_requester.schedule_frame();

    drive_prompt_form(
        events,
        PromptFormSetup {
            frame_requester,
            options,
            enhanced_keys_supported,
        },
        on_submit,
        |bottom_pane| {
            tui.draw(|frame| {
                let area = frame.area();
                let height = bottom_pane.desired_height(area.width).min(area.height);
                let pane_area = Rect::new(
                    area.x,
                    area.bottom().saturating_sub(height),
                    area.width,
                    height,
                );
                bottom_pane.render(pane_area, frame.buffer_mut());
                if let Some(position) = bottom_pane.cursor_pos(pane_area) {
                    frame.set_cursor_position(position);
                }
            })?;
            Ok(())
        },
    )
    .await
}

struct PromptFormSetup {
    frame_requester: FrameRequester,
    options: PromptFormOptions,
    enhanced_keys_supported: bool,
}

struct PromptForm<F> {
    bottom_pane: BottomPane,
    app_event_tx: AppEventSender,
    on_submit: F,
    queued: VecDeque<String>,
    in_flight: Option<JoinHandle<()>>,
    submitted: usize,
}

impl<F, Fut> PromptForm<F>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle_input_result(&mut self, result: InputResult) {
        match result {
            InputResult::Submitted(text) => self.deliver(text),
            InputResult::Queued(text) => {
                tracing::debug!("queued submission while another is running");
                self.queued.push_back(text);
                self.sync_queue_display();
            }
            InputResult::None => {}
        }
    }

    /// Hand `text` to the callback on a new task and mark the form as loading.
    fn deliver(&mut self, text: String) {
        self.submitted += 1;
        self.bottom_pane.set_task_running(true);
        tracing::info!("delivering submission #{} ({} bytes)", self.submitted, text.len());
        if let Some(image) = self.bottom_pane.composer().attachment() {
            tracing::debug!("image {} stays staged in the composer", image.file_name());
        }

        let submission = tokio::spawn((self.on_submit)(text));
        let app_event_tx = self.app_event_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            if let Err(err) = submission.await {
                tracing::error!("submit callback failed: {err}");
            }
            app_event_tx.send(AppEvent::SubmissionFinished);
        }));
    }

    fn on_submission_finished(&mut self) {
        self.in_flight = None;
        match self.queued.pop_front() {
            Some(next) => {
                self.sync_queue_display();
                self.deliver(next);
            }
            None => self.bottom_pane.set_task_running(false),
        }
    }

    fn sync_queue_display(&mut self) {
        self.bottom_pane
            .set_queued_user_messages(self.queued.iter().cloned().collect());
    }

    async fn finish(mut self, exit_reason: ExitReason) -> AppExitInfo {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::info!("waiting for the running submission before exit");
            if let Err(err) = in_flight.await {
                tracing::error!("submission task failed: {err}");
            }
        }
        let unsent: Vec<String> = self.queued.drain(..).collect();
        if !unsent.is_empty() {
            tracing::info!("{} queued submission(s) left unsent", unsent.len());
        }
        AppExitInfo {
            submitted: self.submitted,
            unsent,
            exit_reason,
        }
    }
}

/// The loop behind [`run_prompt_form`], generic over the event source and the draw target.
async fn drive_prompt_form<S, F, Fut, D>(
    mut events: S,
    setup: PromptFormSetup,
    on_submit: F,
    mut draw: D,
) -> anyhow::Result<AppExitInfo>
where
    S: Stream<Item = TuiEvent> + Unpin,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    D: FnMut(&BottomPane) -> anyhow::Result<()>,
{
    let (app_event_tx_raw, mut app_event_rx) = unbounded_channel::<AppEvent>();
    let app_event_tx = AppEventSender::new(app_event_tx_raw);

    let bottom_pane = BottomPane::new(BottomPaneParams {
        frame_requester: setup.frame_requester,
        app_event_tx: app_event_tx.clone(),
        placeholder_text: setup.options.placeholder,
        locale: setup.options.locale,
        enhanced_keys_supported: setup.enhanced_keys_supported,
    });
    let mut form = PromptForm {
        bottom_pane,
        app_event_tx,
        on_submit,
        queued: VecDeque::new(),
        in_flight: None,
        submitted: 0,
    };

    let exit_reason = loop {
        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else {
                    break ExitReason::InputClosed;
                };
                match event {
                    TuiEvent::Key(key_event) => {
                        let result = form.bottom_pane.handle_key_event(key_event);
                        form.handle_input_result(result);
                    }
                    TuiEvent::Paste(pasted) => form.bottom_pane.handle_paste(pasted),
                    TuiEvent::Draw => draw(&form.bottom_pane)?,
                }
            }
            Some(app_event) = app_event_rx.recv() => {
                match app_event {
                    AppEvent::ShowToast(toast) => form.bottom_pane.show_toast(toast),
                    AppEvent::SubmissionFinished => form.on_submission_finished(),
                    AppEvent::ExitRequest => break ExitReason::UserRequested,
                }
            }
        }
    };

    Ok(form.finish(exit_reason).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyEvent;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;
    use std::time::Instant;
    use tokio::sync::Semaphore;
    use tokio::sync::mpsc::UnboundedSender;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    /// Records each delivered text; every callback then waits for one permit on `gate`.
    #[derive(Clone)]
    struct Recorder {
        delivered: Arc<Mutex<Vec<String>>>,
        gate: Arc<Semaphore>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                delivered: Arc::new(Mutex::new(Vec::new())),
                gate: Arc::new(Semaphore::new(0)),
            }
        }

        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().expect("lock").clone()
        }

        fn release_one(&self) {
            self.gate.add_permits(1);
        }
    }

    type BoxedSubmission = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

    fn submit_callback(recorder: Recorder) -> impl FnMut(String) -> BoxedSubmission {
        move |text: String| {
            let recorder = recorder.clone();
            Box::pin(async move {
                recorder.delivered.lock().expect("lock").push(text);
                if let Ok(permit) = recorder.gate.acquire().await {
                    permit.forget();
                }
            })
        }
    }

    fn setup() -> PromptFormSetup {
        PromptFormSetup {
            frame_requester: FrameRequester::test_dummy(),
            options: PromptFormOptions {
                placeholder: DEFAULT_PLACEHOLDER.to_string(),
                locale: MessageLocale::En,
            },
            enhanced_keys_supported: true,
        }
    }

    fn send_text(tx: &UnboundedSender<TuiEvent>, text: &str) {
        for c in text.chars() {
            tx.send(TuiEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
                .expect("send key");
        }
    }

    fn send_enter(tx: &UnboundedSender<TuiEvent>) {
        tx.send(TuiEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
            .expect("send enter");
    }

    fn send_quit(tx: &UnboundedSender<TuiEvent>) {
        tx.send(TuiEvent::Key(KeyEvent::new(
            KeyCode::Char('d'),
            KeyModifiers::CONTROL,
        )))
        .expect("send ctrl+d");
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn submission_is_delivered_once_and_clears_the_field() {
        let recorder = Recorder::new();
        let (tx, rx) = unbounded_channel();
        let draws = Arc::new(Mutex::new(Vec::<String>::new()));
        let draws_in_form = Arc::clone(&draws);

        let form = drive_prompt_form(
            UnboundedReceiverStream::new(rx),
            setup(),
            submit_callback(recorder.clone()),
            move |pane: &BottomPane| {
                draws_in_form
                    .lock()
                    .expect("lock")
                    .push(pane.composer().current_text().to_string());
                Ok(())
            },
        );
        let script = async {
            send_text(&tx, "hello");
            send_enter(&tx);
            wait_until(|| recorder.delivered() == vec!["hello".to_string()]).await;
            tx.send(TuiEvent::Draw).expect("send draw");
            recorder.release_one();
            tokio::time::sleep(Duration::from_millis(10)).await;
            send_quit(&tx);
        };

        let (exit, ()) = tokio::join!(form, script);
        let exit = exit.expect("form exits cleanly");
        assert_eq!(
            exit,
            AppExitInfo {
                submitted: 1,
                unsent: Vec::new(),
                exit_reason: ExitReason::UserRequested,
            }
        );
        assert_eq!(recorder.delivered(), vec!["hello".to_string()]);
        assert_eq!(*draws.lock().expect("lock"), vec![String::new()]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn blank_submission_never_reaches_callback() {
        let recorder = Recorder::new();
        let (tx, rx) = unbounded_channel();
        let form = drive_prompt_form(
            UnboundedReceiverStream::new(rx),
            setup(),
            submit_callback(recorder.clone()),
            |_: &BottomPane| Ok(()),
        );
        let script = async {
            send_text(&tx, "   ");
            send_enter(&tx);
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(tx);
        };

        let (exit, ()) = tokio::join!(form, script);
        let exit = exit.expect("form exits cleanly");
        assert_eq!(exit.submitted, 0);
        assert_eq!(exit.exit_reason, ExitReason::InputClosed);
        assert!(recorder.delivered().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn text_submitted_while_running_is_delivered_after_completion() {
        let recorder = Recorder::new();
        let (tx, rx) = unbounded_channel();
        let form = drive_prompt_form(
            UnboundedReceiverStream::new(rx),
            setup(),
            submit_callback(recorder.clone()),
            |_: &BottomPane| Ok(()),
        );
        let script = async {
            send_text(&tx, "first");
            send_enter(&tx);
            wait_until(|| recorder.delivered().len() == 1).await;

            send_text(&tx, "second");
            send_enter(&tx);
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(recorder.delivered(), vec!["first".to_string()]);

            recorder.release_one();
            wait_until(|| recorder.delivered().len() == 2).await;
            recorder.release_one();
            tokio::time::sleep(Duration::from_millis(10)).await;
            send_quit(&tx);
        };

        let (exit, ()) = tokio::join!(form, script);
        let exit = exit.expect("form exits cleanly");
        assert_eq!(exit.submitted, 2);
        assert!(exit.unsent.is_empty());
        assert_eq!(
            recorder.delivered(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn exit_awaits_running_submission_and_reports_queue() {
        let recorder = Recorder::new();
        let (tx, rx) = unbounded_channel();
        let form = drive_prompt_form(
            UnboundedReceiverStream::new(rx),
            setup(),
            submit_callback(recorder.clone()),
            |_: &BottomPane| Ok(()),
        );
        let script = async {
            send_text(&tx, "running");
            send_enter(&tx);
            wait_until(|| recorder.delivered().len() == 1).await;
            send_text(&tx, "waiting");
            send_enter(&tx);
            send_quit(&tx);
            tokio::time::sleep(Duration::from_millis(10)).await;
            recorder.release_one();
        };

        let (exit, ()) = tokio::join!(form, script);
        let exit = exit.expect("form exits cleanly");
        assert_eq!(
            exit,
            AppExitInfo {
                submitted: 1,
                unsent: vec!["waiting".to_string()],
                exit_reason: ExitReason::UserRequested,
            }
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn rejected_image_toast_reaches_the_pane() {
        let recorder = Recorder::new();
        let (tx, rx) = unbounded_channel();
        let toasts = Arc::new(Mutex::new(Vec::<String>::new()));
        let toasts_in_form = Arc::clone(&toasts);
        let form = drive_prompt_form(
            UnboundedReceiverStream::new(rx),
            setup(),
            submit_callback(recorder.clone()),
            move |pane: &BottomPane| {
                if let Some(toast) = pane.visible_toast(Instant::now()) {
                    toasts_in_form
                        .lock()
                        .expect("lock")
                        .push(toast.message.clone());
                }
                Ok(())
            },
        );
        let script = async {
            tx.send(TuiEvent::Key(KeyEvent::new(
                KeyCode::Char('o'),
                KeyModifiers::CONTROL,
            )))
            .expect("open picker");
            tx.send(TuiEvent::Paste("/tmp/not-supported.gif".to_string()))
                .expect("paste path");
            send_enter(&tx);
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(TuiEvent::Draw).expect("send draw");
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(tx);
        };

        let (exit, ()) = tokio::join!(form, script);
        exit.expect("form exits cleanly");
        assert_eq!(
            *toasts.lock().expect("lock"),
            vec!["unsupported image type: gif (accepted: jpg, png, jpeg)".to_string()]
        );
    }
}
