//! Session manager: owns every session mutation.
//!
//! All three operations go through here. Turn application is transactional
//! from the caller's perspective: the candidate turn and the interviewer
//! turn are appended together after the generation call succeeds, or not
//! at all — a generation failure leaves history exactly as it was so the
//! same answer can be resubmitted.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::ResumeCache;
use crate::error::SessionError;
use crate::generator::Generator;
use crate::prompt;
use crate::resume::{self, ResumeAnalyzer, ResumeSignals};
use crate::session::{ConversationTurn, InterviewConfiguration, InterviewSession};
use crate::store::SessionStore;

/// Result of a successful `start_session`.
#[derive(Debug)]
pub struct StartedSession {
    pub session_id: Uuid,
    pub first_utterance: String,
    pub config: InterviewConfiguration,
    pub remaining_seconds: u64,
}

/// Result of a successful `submit_answer`.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The interview continues: the next question and the server-computed
    /// remaining time.
    Reply {
        utterance: String,
        remaining_seconds: u64,
    },
    /// This turn exhausted the clock; the reply doubles as the closing
    /// message and the session is now terminal.
    Completed { closing_message: String },
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn Generator>,
    analyzer: ResumeAnalyzer,
    cache: Arc<ResumeCache>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn Generator>,
        analyzer: ResumeAnalyzer,
        cache: Arc<ResumeCache>,
    ) -> Self {
        Self {
            store,
            generator,
            analyzer,
            cache,
        }
    }

    /// Creates a session, produces the opening interviewer utterance, and
    /// activates the clock.
    ///
    /// A resume that fails to parse is logged and dropped — the interview
    /// starts without resume context. A generation failure fails the start;
    /// nothing is stored.
    pub async fn start_session(
        &self,
        config: InterviewConfiguration,
        resume_bytes: Option<Vec<u8>>,
    ) -> Result<StartedSession, SessionError> {
        let config = config.validated()?;

        let resume_signals = match resume_bytes {
            Some(bytes) if !bytes.is_empty() => self.resume_signals(bytes).await,
            _ => None,
        };

        let opening_prompt = prompt::compose(&config, &[], resume_signals.as_deref());
        let first_utterance = self.generator.generate(&opening_prompt).await?;

        let now = Utc::now();
        let mut session = InterviewSession::new(config.clone(), resume_signals, now);
        session.activate(first_utterance.clone(), now)?;
        let session_id = session.session_id;
        self.store.put(session).await;

        info!(
            %session_id,
            role = %config.role,
            interview_type = %config.interview_type.label(),
            duration_seconds = config.duration_seconds,
            "interview session started"
        );

        Ok(StartedSession {
            session_id,
            first_utterance,
            remaining_seconds: config.duration_seconds,
            config,
        })
    }

    /// Processes one candidate answer and returns the interviewer's reply.
    ///
    /// Turns for one session are strictly sequential: a second call while
    /// one is in flight is rejected with [`SessionError::TurnInFlight`].
    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        answer: &str,
    ) -> Result<TurnOutcome, SessionError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(SessionError::InvalidTurn(
                "answer text is empty".to_string(),
            ));
        }

        let handle = self
            .store
            .get(&session_id)
            .await
            .ok_or(SessionError::NotFound(session_id))?;
        let mut session = handle
            .try_lock()
            .map_err(|_| SessionError::TurnInFlight(session_id))?;

        if session.is_completed() {
            return Err(SessionError::Completed(session_id));
        }

        let now = Utc::now();
        if session.remaining_seconds(now) == 0 {
            // The clock ran out between turns. Terminal from here on;
            // history stays untouched.
            session.complete();
            info!(%session_id, "interview time exhausted, session completed");
            return Err(SessionError::Completed(session_id));
        }

        if !session.awaiting_answer() {
            return Err(SessionError::InvalidTurn(
                "session is not awaiting a candidate answer".to_string(),
            ));
        }

        // Compose over history plus the pending answer; nothing is appended
        // until the generation call has succeeded.
        let mut turns = session.history.clone();
        turns.push(ConversationTurn::candidate(answer, now));
        let turn_prompt = prompt::compose(
            &session.config,
            &turns,
            session.resume_signals.as_deref(),
        );

        let reply = self.generator.generate(&turn_prompt).await?;

        let now = Utc::now();
        session.record_exchange(answer, reply.clone(), now)?;

        let remaining_seconds = session.remaining_seconds(now);
        if remaining_seconds == 0 {
            session.complete();
            info!(%session_id, "final turn delivered, session completed");
            return Ok(TurnOutcome::Completed {
                closing_message: reply,
            });
        }

        Ok(TurnOutcome::Reply {
            utterance: reply,
            remaining_seconds,
        })
    }

    /// Caller-driven termination; calling it twice is a no-op.
    pub async fn end_session(&self, session_id: Uuid) -> Result<(), SessionError> {
        let handle = self
            .store
            .get(&session_id)
            .await
            .ok_or(SessionError::NotFound(session_id))?;
        let mut session = handle.lock().await;
        if !session.is_completed() {
            info!(%session_id, "session ended by caller");
        }
        session.complete();
        Ok(())
    }

    /// Cache-or-analyze, keyed by content hash. Parse failures degrade to
    /// "no resume context" instead of failing the session.
    async fn resume_signals(&self, bytes: Vec<u8>) -> Option<Arc<ResumeSignals>> {
        let key = resume::resume_key(&bytes);
        if let Some(signals) = self.cache.get(&key).await {
            return Some(signals);
        }

        let analyzer = self.analyzer.clone();
        let parsed = tokio::task::spawn_blocking(move || analyzer.analyze(&bytes)).await;

        match parsed {
            Ok(Ok(signals)) => Some(self.cache.put(key, signals).await),
            Ok(Err(e)) => {
                warn!(error = %e, "resume analysis failed, continuing without resume context");
                None
            }
            Err(e) => {
                warn!(error = %e, "resume analysis task failed, continuing without resume context");
                None
            }
        }
    }
}
