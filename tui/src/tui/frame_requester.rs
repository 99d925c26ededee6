//! Redraw scheduling for the composer session.
//!
//! [`FrameRequester`] is a cheap, cloneable handle that widgets and background tasks use to ask
//! for a redraw, either now or at a later instant (toast expiry, quit reminder timeout). A
//! scheduler task coalesces the requests and emits a single notification on the broadcast channel
//! that the event loop turns into `TuiEvent::Draw`.

use std::time::Duration;
use std::time::Instant;

use tokio::sync::broadcast;
use tokio::sync::mpsc;

#[derive(Clone, Debug)]
pub struct FrameRequester {
    frame_schedule_tx: mpsc::UnboundedSender<Instant>,
}

impl FrameRequester {
    /// Create a requester and spawn its scheduler; draws are announced on `draw_tx`.
    pub fn new(draw_tx: broadcast::Sender<()>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(FrameScheduler::new(rx, draw_tx).run());
        Self {
            frame_schedule_tx: tx,
        }
    }

    /// Schedule a frame draw as soon as possible.
    pub fn schedule_frame(&self) {
        let _ = self.frame_schedule_tx.send(Instant::now());
    }

    /// Schedule a frame draw after `dur`.
    pub fn schedule_frame_in(&self, dur: Duration) {
        let now = Instant::now();
        let _ = self
            .frame_schedule_tx
            .send(now.checked_add(dur).unwrap_or(now));
    }
}

#[cfg(test)]
impl FrameRequester {
    /// A requester whose requests go nowhere.
    pub(crate) fn test_dummy() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        FrameRequester {
            frame_schedule_tx: tx,
        }
    }
}

struct FrameScheduler {
    receiver: mpsc::UnboundedReceiver<Instant>,
    draw_tx: broadcast::Sender<()>,
}

impl FrameScheduler {
    fn new(receiver: mpsc::UnboundedReceiver<Instant>, draw_tx: broadcast::Sender<()>) -> Self {
        Self { receiver, draw_tx }
    }

    /// Runs until every requester is dropped. Requests made before the pending deadline fold into
    /// one draw at the earliest requested instant.
    async fn run(mut self) {
        const IDLE: Duration = Duration::from_secs(60 * 60 * 24);
        let mut next_deadline: Option<Instant> = None;
        loop {
            let target = next_deadline.unwrap_or_else(|| {
                let now = Instant::now();
                now.checked_add(IDLE).unwrap_or(now)
            });
            let deadline = tokio::time::sleep_until(target.into());
            tokio::pin!(deadline);

            tokio::select! {
                draw_at = self.receiver.recv() => {
                    let Some(draw_at) = draw_at else {
                        break;
                    };
                    next_deadline = Some(next_deadline.map_or(draw_at, |cur| cur.min(draw_at)));
                }
                _ = &mut deadline => {
                    if next_deadline.take().is_some() {
                        let _ = self.draw_tx.send(());
                    }
                }
            }
        }
    }
}
