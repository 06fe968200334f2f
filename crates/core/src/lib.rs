//! Intervia core: the interview session state machine and its
//! collaborators.
//!
//! The HTTP surface lives in the `intervia-api` service; everything with
//! state, timing, or protocol rules lives here so it can be tested without
//! a server or a real language model.

pub mod cache;
pub mod error;
pub mod generator;
pub mod manager;
pub mod prompt;
pub mod resume;
pub mod session;
pub mod store;

pub use cache::ResumeCache;
pub use error::{GenerationError, ParseError, SessionError};
pub use generator::{GeminiGenerator, Generator, OpenAiGenerator};
pub use manager::{SessionManager, StartedSession, TurnOutcome};
pub use prompt::{FeedbackStyle, InterviewType};
pub use resume::{PdfTextExtractor, ResumeAnalyzer, ResumeSignals, TextExtractor};
pub use session::{
    ConversationTurn, InterviewConfiguration, InterviewSession, SessionStatus, Speaker,
};
pub use store::{InMemorySessionStore, SessionStore};
