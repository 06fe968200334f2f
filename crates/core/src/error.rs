use uuid::Uuid;

/// Failures while turning an uploaded document into [`crate::resume::ResumeSignals`].
///
/// These are always absorbed by the session manager: a resume that cannot
/// be parsed is logged and the interview proceeds without resume context.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to extract text from document: {0}")]
    Extraction(String),
    #[error("document has no extractable text layer")]
    EmptyText,
}

/// Failures from the text-generation collaborator.
///
/// A generation failure rejects the current turn without mutating session
/// history, so the candidate can resubmit the same answer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation request timed out")]
    Timeout,
    #[error("generation provider returned status {0}")]
    Status(u16),
    #[error("generation provider returned an empty reply")]
    EmptyReply,
}

/// The session-level error taxonomy surfaced at the service boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid interview configuration: {0}")]
    Configuration(String),
    #[error("session {0} not found")]
    NotFound(Uuid),
    #[error("session {0} is already completed")]
    Completed(Uuid),
    #[error("invalid turn: {0}")]
    InvalidTurn(String),
    #[error("another answer for session {0} is still being processed")]
    TurnInFlight(Uuid),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
