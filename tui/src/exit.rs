/// Summary information produced when a composer session exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppExitInfo {
    /// Number of texts handed to the submit callback.
    pub submitted: usize,
    /// Texts queued while a submission was running that were never delivered.
    pub unsent: Vec<String>,
    /// Why the session ended.
    pub exit_reason: ExitReason,
}

/// Reason why the composer session terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The user asked to quit (Ctrl+C twice or Ctrl+D on an empty draft).
    UserRequested,
    /// The terminal event stream ended.
    InputClosed,
}
