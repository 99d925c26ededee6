//! Application-level events used to coordinate UI actions.

use crate::toast::Toast;

#[derive(Debug)]
pub enum AppEvent {
    /// Show a transient notification above the composer.
    ShowToast(Toast),

    /// The running submit callback finished (successfully or not; the outcome is the callback's
    /// business).
    SubmissionFinished,

    /// The user asked to leave the form (Ctrl+C / Ctrl+D on an empty draft).
    ExitRequest,
}
