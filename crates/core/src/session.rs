//! Interview session state.
//!
//! An [`InterviewSession`] moves one-way through Created → Active →
//! Completed. History is append-only and strictly alternates between
//! interviewer and candidate, starting with the interviewer's opening
//! utterance. Remaining time is never stored: it is derived from the
//! activation timestamp on every call, so the server is the single source
//! of truth for the clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::prompt::{FeedbackStyle, InterviewType};
use crate::resume::ResumeSignals;

/// Default interview length when the client does not specify one.
pub const DEFAULT_DURATION_SECONDS: u64 = 900;

const DEFAULT_ROLE: &str = "Software Engineer";
const DEFAULT_SENIORITY: &str = "Entry-Level";
const DEFAULT_DIFFICULTY: &str = "Intermediate";

/// Immutable interview preferences, fixed at session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConfiguration {
    pub role: String,
    pub seniority_level: String,
    pub tech_stack: Vec<String>,
    pub interview_type: InterviewType,
    pub difficulty_level: String,
    pub company_target: Option<String>,
    pub feedback_style: FeedbackStyle,
    pub job_description: Option<String>,
    pub duration_seconds: u64,
}

impl Default for InterviewConfiguration {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            seniority_level: DEFAULT_SENIORITY.to_string(),
            tech_stack: Vec::new(),
            interview_type: InterviewType::default(),
            difficulty_level: DEFAULT_DIFFICULTY.to_string(),
            company_target: None,
            feedback_style: FeedbackStyle::default(),
            job_description: None,
            duration_seconds: DEFAULT_DURATION_SECONDS,
        }
    }
}

impl InterviewConfiguration {
    /// Structural validation plus defaulting.
    ///
    /// Only a non-positive duration is a hard failure; every other missing
    /// or blank field degrades to a sensible default so a partially filled
    /// form still starts an interview.
    pub fn validated(mut self) -> Result<Self, SessionError> {
        if self.duration_seconds == 0 {
            return Err(SessionError::Configuration(
                "durationSeconds must be greater than zero".to_string(),
            ));
        }
        if self.role.trim().is_empty() {
            self.role = DEFAULT_ROLE.to_string();
        }
        if self.seniority_level.trim().is_empty() {
            self.seniority_level = DEFAULT_SENIORITY.to_string();
        }
        if self.difficulty_level.trim().is_empty() {
            self.difficulty_level = DEFAULT_DIFFICULTY.to_string();
        }
        self.company_target = self
            .company_target
            .filter(|company| !company.trim().is_empty());
        self.job_description = self.job_description.filter(|jd| !jd.trim().is_empty());

        // Deduplicate the tech stack while preserving the client's order.
        let mut seen = Vec::with_capacity(self.tech_stack.len());
        for entry in std::mem::take(&mut self.tech_stack) {
            let entry = entry.trim().to_string();
            if entry.is_empty() {
                continue;
            }
            if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(&entry)) {
                seen.push(entry);
            }
        }
        self.tech_stack = seen;

        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Candidate,
    Interviewer,
}

/// One utterance in the conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn candidate(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::Candidate,
            content: content.into(),
            timestamp,
        }
    }

    pub fn interviewer(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::Interviewer,
            content: content.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Created,
    Active,
    Completed,
}

/// One complete interview attempt.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    pub session_id: Uuid,
    pub config: InterviewConfiguration,
    pub history: Vec<ConversationTurn>,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub resume_signals: Option<Arc<ResumeSignals>>,
}

impl InterviewSession {
    pub fn new(
        config: InterviewConfiguration,
        resume_signals: Option<Arc<ResumeSignals>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            config,
            history: Vec::new(),
            started_at: now,
            status: SessionStatus::Created,
            resume_signals,
        }
    }

    /// Delivers the opening interviewer utterance and starts the clock.
    pub fn activate(
        &mut self,
        first_utterance: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.status != SessionStatus::Created {
            return Err(SessionError::InvalidTurn(
                "session has already been activated".to_string(),
            ));
        }
        self.history
            .push(ConversationTurn::interviewer(first_utterance, now));
        self.started_at = now;
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Wall-clock remaining time, floored at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;
        self.config.duration_seconds.saturating_sub(elapsed)
    }

    /// True when the last history entry is an interviewer question.
    pub fn awaiting_answer(&self) -> bool {
        matches!(
            self.history.last(),
            Some(turn) if turn.speaker == Speaker::Interviewer
        )
    }

    /// Appends a candidate answer together with the interviewer's reply.
    ///
    /// The two turns commit as a unit so history can never hold a candidate
    /// answer without the question-or-close that followed it.
    pub fn record_exchange(
        &mut self,
        answer: impl Into<String>,
        reply: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::InvalidTurn(
                "session is not active".to_string(),
            ));
        }
        if !self.awaiting_answer() {
            return Err(SessionError::InvalidTurn(
                "session is not awaiting a candidate answer".to_string(),
            ));
        }
        self.history.push(ConversationTurn::candidate(answer, now));
        self.history
            .push(ConversationTurn::interviewer(reply, now));
        Ok(())
    }

    /// Idempotent transition into the terminal state.
    pub fn complete(&mut self) {
        self.status = SessionStatus::Completed;
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
