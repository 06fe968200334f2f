//! HTTP boundary for the interview session pipeline.
//!
//! The start endpoint accepts either `multipart/form-data` (preferences as
//! text parts plus a binary `resume` part) or plain JSON; both shapes are
//! merged into one `InterviewConfiguration` + optional resume bytes before
//! the session manager sees them. Internal errors map onto client-facing
//! statuses here and nowhere else.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use intervia_core::{
    FeedbackStyle, InterviewConfiguration, InterviewType, SessionError, SessionManager,
    StartedSession, TurnOutcome,
};

pub type AppState = Arc<SessionManager>;

/// Client-facing error with the status it maps to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        let status = match &error {
            SessionError::Configuration(_) | SessionError::InvalidTurn(_) => {
                StatusCode::BAD_REQUEST
            }
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Completed(_) | SessionError::TurnInFlight(_) => StatusCode::CONFLICT,
            SessionError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Interview preferences as the client sends them; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartRequest {
    pub role: Option<String>,
    pub seniority_level: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub interview_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub company_target: Option<String>,
    pub feedback_type: Option<String>,
    pub job_description: Option<String>,
    pub duration_seconds: Option<u64>,
}

impl StartRequest {
    /// Merges client preferences over the defaulted configuration.
    pub fn into_config(self) -> InterviewConfiguration {
        let defaults = InterviewConfiguration::default();
        InterviewConfiguration {
            role: self.role.unwrap_or(defaults.role),
            seniority_level: self.seniority_level.unwrap_or(defaults.seniority_level),
            tech_stack: self.tech_stack.unwrap_or_default(),
            interview_type: self
                .interview_type
                .map(InterviewType::from)
                .unwrap_or_default(),
            difficulty_level: self.difficulty_level.unwrap_or(defaults.difficulty_level),
            company_target: self.company_target,
            feedback_style: self
                .feedback_type
                .map(FeedbackStyle::from)
                .unwrap_or_default(),
            job_description: self.job_description,
            duration_seconds: self.duration_seconds.unwrap_or(defaults.duration_seconds),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session_id: Uuid,
    pub first_utterance: String,
    pub remaining_seconds: u64,
    pub effective_configuration: InterviewConfiguration,
}

impl From<StartedSession> for StartResponse {
    fn from(started: StartedSession) -> Self {
        Self {
            session_id: started.session_id,
            first_utterance: started.first_utterance,
            remaining_seconds: started.remaining_seconds,
            effective_configuration: started.config,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub session_id: Uuid,
    pub answer_text: String,
    /// Advisory only; the server-side history is authoritative.
    #[serde(default)]
    pub client_reported_history: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    #[serde(rename_all = "camelCase")]
    Reply {
        next_utterance: String,
        remaining_seconds: u64,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        completed: bool,
        closing_message: String,
    },
}

impl From<TurnOutcome> for AnswerResponse {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Reply {
                utterance,
                remaining_seconds,
            } => Self::Reply {
                next_utterance: utterance,
                remaining_seconds,
            },
            TurnOutcome::Completed { closing_message } => Self::Completed {
                completed: true,
                closing_message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRequest {
    pub session_id: Uuid,
}

/// `POST /interview/start` — multipart (resume attachment) or JSON.
pub async fn start_interview(
    State(manager): State<AppState>,
    request: Request,
) -> Result<Json<StartResponse>, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let (start, resume_bytes) = if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        read_multipart_start(multipart).await?
    } else {
        let Json(start) = Json::<StartRequest>::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        (start, None)
    };

    let started = manager
        .start_session(start.into_config(), resume_bytes)
        .await?;
    Ok(Json(started.into()))
}

/// `POST /interview/answer`
pub async fn submit_answer(
    State(manager): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let outcome = manager
        .submit_answer(request.session_id, &request.answer_text)
        .await?;
    Ok(Json(outcome.into()))
}

/// `POST /interview/end` — idempotent.
pub async fn end_interview(
    State(manager): State<AppState>,
    Json(request): Json<EndRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    manager.end_session(request.session_id).await?;
    Ok(Json(serde_json::json!({ "completed": true })))
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Collects the `resume` attachment and the text preference parts into one
/// `StartRequest`.
async fn read_multipart_start(
    mut multipart: Multipart,
) -> Result<(StartRequest, Option<Vec<u8>>), ApiError> {
    let mut start = StartRequest::default();
    let mut resume_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        match name.as_str() {
            "resume" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if !bytes.is_empty() {
                    resume_bytes = Some(bytes.to_vec());
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                apply_text_field(&mut start, &name, value)?;
            }
        }
    }

    Ok((start, resume_bytes))
}

fn apply_text_field(start: &mut StartRequest, name: &str, value: String) -> Result<(), ApiError> {
    match name {
        "role" => start.role = Some(value),
        "seniorityLevel" => start.seniority_level = Some(value),
        "techStack" => start.tech_stack = Some(parse_tech_stack(&value)),
        "interviewType" => start.interview_type = Some(value),
        "difficultyLevel" => start.difficulty_level = Some(value),
        "companyTarget" => start.company_target = Some(value),
        "feedbackType" => start.feedback_type = Some(value),
        "jobDescription" => start.job_description = Some(value),
        "durationSeconds" => {
            let seconds = value.trim().parse::<u64>().map_err(|_| {
                ApiError::bad_request(format!("durationSeconds is not a number: '{value}'"))
            })?;
            start.duration_seconds = Some(seconds);
        }
        // Unknown parts are ignored rather than rejected.
        _ => {}
    }
    Ok(())
}

/// Accepts either a JSON array or a comma-separated list.
fn parse_tech_stack(value: &str) -> Vec<String> {
    if let Ok(parsed) = serde_json::from_str::<Vec<String>>(value) {
        return parsed;
    }
    value
        .split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_start_request_degrades_to_defaults() {
        let config = StartRequest::default().into_config();

        assert_eq!(config.role, "Software Engineer");
        assert_eq!(config.seniority_level, "Entry-Level");
        assert_eq!(config.interview_type, InterviewType::GeneralTechnical);
        assert_eq!(config.feedback_style, FeedbackStyle::DetailedExplanation);
        assert_eq!(config.duration_seconds, 900);
    }

    #[test]
    fn start_request_fields_carry_through() {
        let request: StartRequest = serde_json::from_str(
            r#"{
                "role": "Backend Developer",
                "seniorityLevel": "SDE 2",
                "techStack": ["Rust", "Postgres"],
                "interviewType": "System Design",
                "feedbackType": "Score-based",
                "durationSeconds": 600
            }"#,
        )
        .expect("valid request body");

        let config = request.into_config();

        assert_eq!(config.role, "Backend Developer");
        assert_eq!(config.interview_type, InterviewType::SystemDesign);
        assert_eq!(config.feedback_style, FeedbackStyle::ScoreBased);
        assert_eq!(config.tech_stack, vec!["Rust", "Postgres"]);
        assert_eq!(config.duration_seconds, 600);
    }

    #[test]
    fn tech_stack_parses_json_or_comma_separated() {
        assert_eq!(
            parse_tech_stack(r#"["Rust","Go"]"#),
            vec!["Rust".to_string(), "Go".to_string()]
        );
        assert_eq!(
            parse_tech_stack("Rust, Go, "),
            vec!["Rust".to_string(), "Go".to_string()]
        );
        assert!(parse_tech_stack("").is_empty());
    }

    #[test]
    fn multipart_text_fields_map_onto_the_request() {
        let mut start = StartRequest::default();

        apply_text_field(&mut start, "role", "Backend Developer".to_string()).unwrap();
        apply_text_field(&mut start, "durationSeconds", "600".to_string()).unwrap();
        apply_text_field(&mut start, "unknownField", "ignored".to_string()).unwrap();

        assert_eq!(start.role.as_deref(), Some("Backend Developer"));
        assert_eq!(start.duration_seconds, Some(600));

        let err = apply_text_field(&mut start, "durationSeconds", "soon".to_string());
        assert!(err.is_err());
    }

    #[test]
    fn answer_response_serializes_both_shapes() {
        let reply = AnswerResponse::Reply {
            next_utterance: "Next question?".to_string(),
            remaining_seconds: 540,
        };
        let completed = AnswerResponse::Completed {
            completed: true,
            closing_message: "That wraps it up.".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({ "nextUtterance": "Next question?", "remainingSeconds": 540 })
        );
        assert_eq!(
            serde_json::to_value(&completed).unwrap(),
            serde_json::json!({ "completed": true, "closingMessage": "That wraps it up." })
        );
    }

    #[test]
    fn session_errors_map_to_boundary_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (
                SessionError::Configuration("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (SessionError::NotFound(id), StatusCode::NOT_FOUND),
            (SessionError::Completed(id), StatusCode::CONFLICT),
            (SessionError::TurnInFlight(id), StatusCode::CONFLICT),
            (
                SessionError::InvalidTurn("empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SessionError::Generation(intervia_core::GenerationError::Timeout),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status, expected);
        }
    }
}
