use std::future::Future;

use anyhow::Context;

use crate::AppExitInfo;
use crate::prompt_form::PromptFormOptions;
use crate::prompt_form::run_prompt_form;
use crate::tui;
use crate::tui::Tui;

/// Terminal session hosting the prompt form:
/// - Enters raw mode and the alternate screen on creation
/// - Runs the form until the user quits
/// - Attempts to restore terminal state on Drop
pub struct ComposerTui {
    tui: Tui,
}

impl ComposerTui {
    /// Initialize the terminal and clear the screen.
    pub fn new() -> anyhow::Result<Self> {
        let mut terminal = tui::init().context("failed to initialize terminal")?;
        terminal.clear().context("failed to clear terminal")?;
        Ok(Self {
            tui: Tui::new(terminal),
        })
    }

    /// Show the form and deliver each submission to `on_submit`.
    ///
    /// Returns once the user quits and any in-flight submission has completed.
    pub async fn run<F, Fut>(
        &mut self,
        options: PromptFormOptions,
        on_submit: F,
    ) -> anyhow::Result<AppExitInfo>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let result = run_prompt_form(&mut self.tui, options, on_submit).await;
        // Leave a clean screen behind before the alternate screen is dropped.
        if let Err(err) = self.tui.clear() {
            tracing::warn!("failed to clear terminal: {err}");
        }
        result
    }
}

impl Drop for ComposerTui {
    fn drop(&mut self) {
        // Always attempt to restore the terminal, even if the caller exits early.
        if let Err(err) = tui::restore() {
            tracing::warn!("failed to restore terminal: {err}");
        }
    }
}
