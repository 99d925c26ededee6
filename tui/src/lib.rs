// Forbid accidental stdout/stderr writes in the library portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod exit;

mod app_event;
mod app_event_sender;
mod bottom_pane;
mod clipboard_paste;
mod composer_tui;
mod key_hint;
mod locale;
mod prompt_form;
mod render;
mod toast;
mod tui;
mod ui_consts;

pub use composer_tui::ComposerTui;
pub use exit::AppExitInfo;
pub use exit::ExitReason;
pub use locale::MessageLocale;
pub use prompt_form::DEFAULT_PLACEHOLDER;
pub use prompt_form::PromptFormOptions;
