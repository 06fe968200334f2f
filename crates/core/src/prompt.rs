//! Deterministic prompt composition.
//!
//! The generation collaborator is stateless, so everything it needs to know
//! — persona, interview format, resume context, feedback style, the full
//! conversation so far — is rebuilt into a single prompt on every turn.
//! Composition is a fixed pipeline of pure section producers concatenated
//! in order, which keeps each instruction block unit-testable on its own.

use serde::{Deserialize, Serialize};

use crate::resume::ResumeSignals;
use crate::session::{ConversationTurn, InterviewConfiguration, Speaker};

/// The interview format selected at session start.
///
/// Parsed from free-form client strings; anything unrecognized falls back
/// to [`InterviewType::GeneralTechnical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterviewType {
    DsaAlgorithm,
    SystemDesign,
    LowLevelDesign,
    Behavioral,
    ResumeDeepDive,
    ProjectDiscussion,
    TechStackCheck,
    TakeHomeAssignment,
    GeneralTechnical,
}

impl InterviewType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DsaAlgorithm => "DSA / Algorithm",
            Self::SystemDesign => "System Design",
            Self::LowLevelDesign => "Low-Level Design",
            Self::Behavioral => "Behavioral",
            Self::ResumeDeepDive => "Resume Deep Dive",
            Self::ProjectDiscussion => "Project Discussion",
            Self::TechStackCheck => "Tech Stack Check",
            Self::TakeHomeAssignment => "Take-Home Assignment",
            Self::GeneralTechnical => "General Technical",
        }
    }
}

impl Default for InterviewType {
    fn default() -> Self {
        Self::GeneralTechnical
    }
}

impl From<String> for InterviewType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dsa / algorithm" | "dsa" | "algorithm" => Self::DsaAlgorithm,
            "system design" => Self::SystemDesign,
            "low-level design" | "low level design" => Self::LowLevelDesign,
            "behavioral" => Self::Behavioral,
            "resume deep dive" => Self::ResumeDeepDive,
            "project discussion" => Self::ProjectDiscussion,
            "tech stack check" => Self::TechStackCheck,
            "take-home assignment" | "take home assignment" => Self::TakeHomeAssignment,
            _ => Self::GeneralTechnical,
        }
    }
}

impl From<InterviewType> for String {
    fn from(value: InterviewType) -> Self {
        value.label().to_string()
    }
}

/// How the interviewer is instructed to deliver feedback on answers.
///
/// Unrecognized client strings fall back to
/// [`FeedbackStyle::DetailedExplanation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackStyle {
    ScoreBased,
    DetailedExplanation,
    AudioSummary,
}

impl FeedbackStyle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScoreBased => "Score-based",
            Self::DetailedExplanation => "Detailed Explanation",
            Self::AudioSummary => "Audio Summary",
        }
    }
}

impl Default for FeedbackStyle {
    fn default() -> Self {
        Self::DetailedExplanation
    }
}

impl From<String> for FeedbackStyle {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "score-based" | "score based" | "score" => Self::ScoreBased,
            "audio summary" | "audio" => Self::AudioSummary,
            _ => Self::DetailedExplanation,
        }
    }
}

impl From<FeedbackStyle> for String {
    fn from(value: FeedbackStyle) -> Self {
        value.label().to_string()
    }
}

/// Builds the full instruction text for one generation call.
///
/// Pure and deterministic: identical inputs always yield identical text.
/// Section order is fixed — persona, interview-type instructions, resume
/// guidance, job description, feedback style, hard rules, then the
/// serialized conversation history.
pub fn compose(
    config: &InterviewConfiguration,
    history: &[ConversationTurn],
    resume_signals: Option<&ResumeSignals>,
) -> String {
    let sections = [
        persona_section(config),
        interview_type_section(config),
        resume_section(resume_signals),
        job_description_section(config),
        feedback_section(config.feedback_style),
        rules_section(history.is_empty()),
        history_section(history),
    ];

    sections
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn persona_section(config: &InterviewConfiguration) -> Option<String> {
    let minutes = config.duration_seconds.div_ceil(60);
    let mut text = format!(
        "You are an expert technical interviewer conducting a {}-minute mock interview \
         for a {} {} position.",
        minutes, config.seniority_level, config.role,
    );
    if let Some(company) = &config.company_target {
        text.push_str(&format!(
            " This interview is targeting {company} company standards."
        ));
    }
    text.push_str(&format!(
        " The difficulty level is {}.",
        config.difficulty_level
    ));
    if !config.tech_stack.is_empty() {
        text.push_str(&format!(
            " Focus on these technologies: {}.",
            config.tech_stack.join(", ")
        ));
    }
    Some(text)
}

fn interview_type_section(config: &InterviewConfiguration) -> Option<String> {
    let seniority = &config.seniority_level;
    let text = match config.interview_type {
        InterviewType::DsaAlgorithm => format!(
            "INTERVIEW FORMAT: Focus on data structures and algorithms. For {seniority} \
             level, ask about time/space complexity, optimization techniques, and \
             problem-solving approaches."
        ),
        InterviewType::SystemDesign => format!(
            "INTERVIEW FORMAT: Focus on system architecture, scalability, and design \
             patterns. For {seniority} level, ask about distributed systems, \
             microservices, database design, and trade-offs."
        ),
        InterviewType::LowLevelDesign => format!(
            "INTERVIEW FORMAT: Focus on object-oriented design and code structure. For \
             {seniority} level, ask about SOLID principles, design patterns, and clean \
             code practices."
        ),
        InterviewType::Behavioral => format!(
            "INTERVIEW FORMAT: Focus on soft skills, leadership, and past experiences. \
             For {seniority} level, ask about team collaboration, conflict resolution, \
             and project management. Encourage STAR-method answers."
        ),
        InterviewType::ResumeDeepDive => "INTERVIEW FORMAT: Thoroughly examine the candidate's resume. Ask detailed \
             questions about their projects, technologies used, challenges faced, and \
             outcomes achieved."
            .to_string(),
        InterviewType::ProjectDiscussion => "INTERVIEW FORMAT: Ask detailed questions about the candidate's projects: \
             technical decisions, challenges overcome, technologies used, and their \
             individual role and contributions."
            .to_string(),
        InterviewType::TechStackCheck => "INTERVIEW FORMAT: Focus on the required technology stack. Ask practical \
             questions about real-world usage, best practices, and troubleshooting, \
             including hands-on scenarios."
            .to_string(),
        InterviewType::TakeHomeAssignment => "INTERVIEW FORMAT: Present a realistic coding assignment with clear \
             requirements and constraints, then probe the candidate's approach, design \
             decisions, and implementation details."
            .to_string(),
        InterviewType::GeneralTechnical => "INTERVIEW FORMAT: Conduct a general technical interview covering various \
             aspects of the role."
            .to_string(),
    };
    Some(text)
}

fn resume_section(signals: Option<&ResumeSignals>) -> Option<String> {
    let Some(signals) = signals else {
        return Some(
            "CANDIDATE BACKGROUND: No resume available. Ask general questions about \
             their background, projects, and experience."
                .to_string(),
        );
    };

    let mut text = String::from("CANDIDATE RESUME:");
    if !signals.skills.is_empty() {
        text.push_str(&format!(
            "\n- Skills: {}. Ask follow-up questions that probe depth in these skills.",
            signals.skills.join(", ")
        ));
    }
    if !signals.experience_fragments.is_empty() {
        text.push_str(&format!(
            "\n- Experience: {}. Ask follow-up questions about this experience.",
            signals.experience_fragments.join("; ")
        ));
    }
    if !signals.project_fragments.is_empty() {
        text.push_str(&format!(
            "\n- Projects: {}. Ask follow-up questions about these projects.",
            signals.project_fragments.join("; ")
        ));
    }
    if !signals.education_fragments.is_empty() {
        text.push_str(&format!(
            "\n- Education: {}.",
            signals.education_fragments.join("; ")
        ));
    }
    Some(text)
}

fn job_description_section(config: &InterviewConfiguration) -> Option<String> {
    config.job_description.as_ref().map(|jd| {
        format!(
            "JOB DESCRIPTION:\n{jd}\n\nUse this job description to tailor your \
             questions and evaluate candidate fit."
        )
    })
}

fn feedback_section(style: FeedbackStyle) -> Option<String> {
    let text = match style {
        FeedbackStyle::ScoreBased => {
            "FEEDBACK FORMAT: Provide a score out of 10 for each answer. Be specific \
             about what was good and what could be improved."
        }
        FeedbackStyle::DetailedExplanation => {
            "FEEDBACK FORMAT: Provide comprehensive feedback explaining why answers \
             were correct or incorrect, with specific suggestions for improvement."
        }
        FeedbackStyle::AudioSummary => {
            "FEEDBACK FORMAT: Provide concise, actionable feedback suitable for being \
             read aloud: key strengths, areas for improvement, and next steps."
        }
    };
    Some(text.to_string())
}

fn rules_section(first_turn: bool) -> Option<String> {
    let mut text = String::from(
        "CRITICAL INTERVIEW RULES:\n\
         - ASK ONLY ONE QUESTION AT A TIME. Never ask multiple or compound questions.\n\
         - Keep each reply under 150 words.\n\
         - Give a brief, encouraging response to the candidate's answer (1-2 sentences) \
         before your next question.\n\
         - Do not repeat a question that already appears in the conversation below.\n\
         - Maintain a conversational but professional tone.",
    );
    if first_turn {
        text.push_str(
            "\n- This is the first exchange: introduce yourself as the interviewer and \
             ask the candidate to introduce themselves.",
        );
    }
    Some(text)
}

fn history_section(history: &[ConversationTurn]) -> Option<String> {
    if history.is_empty() {
        return None;
    }
    let lines = history
        .iter()
        .map(|turn| {
            let speaker = match turn.speaker {
                Speaker::Candidate => "Candidate",
                Speaker::Interviewer => "AI",
            };
            format!("{speaker}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!(
        "CONVERSATION SO FAR:\n{lines}\n\nThe last candidate line is the answer you \
         are responding to now."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> InterviewConfiguration {
        InterviewConfiguration {
            role: "Backend Developer".to_string(),
            seniority_level: "SDE 2".to_string(),
            tech_stack: vec!["Rust".to_string(), "Postgres".to_string()],
            interview_type: InterviewType::SystemDesign,
            difficulty_level: "Advanced".to_string(),
            company_target: Some("Acme".to_string()),
            feedback_style: FeedbackStyle::ScoreBased,
            job_description: Some("Own the storage layer.".to_string()),
            duration_seconds: 600,
        }
    }

    #[test]
    fn compose_is_deterministic() {
        let config = config();
        let history = vec![
            ConversationTurn::interviewer("Tell me about yourself.", Utc::now()),
            ConversationTurn::candidate("I build storage systems.", Utc::now()),
        ];

        let first = compose(&config, &history, None);
        let second = compose(&config, &history, None);

        assert_eq!(first, second);
    }

    #[test]
    fn empty_history_asks_for_introduction() {
        let prompt = compose(&config(), &[], None);

        assert!(prompt.contains("ask the candidate to introduce themselves"));
        assert!(!prompt.contains("CONVERSATION SO FAR"));
    }

    #[test]
    fn history_is_serialized_with_speaker_labels() {
        let history = vec![
            ConversationTurn::interviewer("Tell me about yourself.", Utc::now()),
            ConversationTurn::candidate("I have 3 years with caches.", Utc::now()),
        ];

        let prompt = compose(&config(), &history, None);

        assert!(prompt.contains("AI: Tell me about yourself."));
        assert!(prompt.contains("Candidate: I have 3 years with caches."));
        // Not the first exchange anymore.
        assert!(!prompt.contains("introduce yourself as the interviewer"));
    }

    #[test]
    fn persona_section_reflects_configuration() {
        let prompt = compose(&config(), &[], None);

        assert!(prompt.contains("10-minute mock interview"));
        assert!(prompt.contains("SDE 2 Backend Developer"));
        assert!(prompt.contains("targeting Acme company standards"));
        assert!(prompt.contains("Focus on these technologies: Rust, Postgres."));
        assert!(prompt.contains("JOB DESCRIPTION:\nOwn the storage layer."));
        assert!(prompt.contains("score out of 10"));
    }

    #[test]
    fn missing_resume_yields_generic_background_directive() {
        let prompt = compose(&config(), &[], None);

        assert!(prompt.contains("No resume available"));
    }

    #[test]
    fn resume_signals_drive_follow_up_directives() {
        let signals = ResumeSignals {
            raw_text: String::new(),
            skills: vec!["Rust".to_string(), "AWS".to_string()],
            experience_fragments: vec!["Backend engineer at Acme".to_string()],
            education_fragments: vec![],
            project_fragments: vec!["Built a rate limiter".to_string()],
        };

        let prompt = compose(&config(), &[], Some(&signals));

        assert!(prompt.contains("Skills: Rust, AWS"));
        assert!(prompt.contains("Experience: Backend engineer at Acme"));
        assert!(prompt.contains("Projects: Built a rate limiter"));
        assert!(!prompt.contains("No resume available"));
    }

    #[test]
    fn unknown_interview_type_falls_back_to_general_technical() {
        assert_eq!(
            InterviewType::from("Underwater Basket Weaving".to_string()),
            InterviewType::GeneralTechnical
        );
        assert_eq!(
            InterviewType::from("system design".to_string()),
            InterviewType::SystemDesign
        );
    }

    #[test]
    fn unknown_feedback_style_falls_back_to_detailed_explanation() {
        assert_eq!(
            FeedbackStyle::from("telepathy".to_string()),
            FeedbackStyle::DetailedExplanation
        );
        assert_eq!(
            FeedbackStyle::from("Score-based".to_string()),
            FeedbackStyle::ScoreBased
        );
    }
}
