//! Heuristic resume analysis.
//!
//! This is deliberately not a structured resume parser: it scans the
//! extracted text for known skill keywords and takes short windows of
//! lines under heading-like lines ("experience", "education", "project",
//! "summary"). Empty results are fine — a resume that yields nothing
//! still lets the interview proceed, just without resume context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[cfg(test)]
use mockall::automock;

use crate::error::ParseError;

/// Fixed vocabulary scanned against the resume text. Matches populate
/// `ResumeSignals::skills` in this order, not document order.
pub const SKILL_VOCABULARY: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "React",
    "Angular",
    "Vue.js",
    "Node.js",
    "Python",
    "Java",
    "C++",
    "Rust",
    "Go",
    "SQL",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "Kafka",
    "GraphQL",
    "AWS",
    "Docker",
    "Kubernetes",
    "Terraform",
    "Git",
    "Machine Learning",
    "Data Science",
    "DevOps",
    "Agile",
    "Scrum",
];

const HEADING_KEYWORDS: &[&str] = &["experience", "education", "project", "summary"];

/// Heading lines longer than this are treated as body text, not headings.
const MAX_HEADING_LEN: usize = 48;

/// Non-empty lines captured under a single heading.
const FRAGMENT_WINDOW: usize = 6;

/// Upper bound per fragment list across all matching headings.
const MAX_FRAGMENTS: usize = 12;

/// Signals derived once per unique resume and cached by content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSignals {
    pub raw_text: String,
    pub skills: Vec<String>,
    pub experience_fragments: Vec<String>,
    pub education_fragments: Vec<String>,
    pub project_fragments: Vec<String>,
}

/// Extracts plain text from uploaded document bytes.
///
/// The PDF mechanics live behind this trait so the analyzer can be tested
/// with canned text and so another document format could be plugged in
/// without touching the heuristics.
#[cfg_attr(test, automock)]
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError>;
}

/// Production extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ParseError::Extraction(e.to_string()))
    }
}

/// Stable identity for an uploaded resume: hex SHA-256 of its bytes.
pub fn resume_key(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Pure analysis over document bytes; caching is the caller's job.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    extractor: Arc<dyn TextExtractor>,
}

impl ResumeAnalyzer {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Analyzer wired to the production PDF extractor.
    pub fn pdf() -> Self {
        Self::new(Arc::new(PdfTextExtractor))
    }

    pub fn analyze(&self, bytes: &[u8]) -> Result<ResumeSignals, ParseError> {
        let raw_text = self.extractor.extract_text(bytes)?;
        if raw_text.trim().is_empty() {
            return Err(ParseError::EmptyText);
        }

        let skills = scan_skills(&raw_text);
        let mut experience_fragments = heading_fragments(&raw_text, &["experience", "summary"]);
        experience_fragments.truncate(MAX_FRAGMENTS);
        let education_fragments = heading_fragments(&raw_text, &["education"]);
        let project_fragments = heading_fragments(&raw_text, &["project"]);

        Ok(ResumeSignals {
            raw_text,
            skills,
            experience_fragments,
            education_fragments,
            project_fragments,
        })
    }
}

/// Case-insensitive vocabulary scan, preserving vocabulary order.
fn scan_skills(text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| haystack.contains(&skill.to_lowercase()))
        .map(|skill| skill.to_string())
        .collect()
}

fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_HEADING_LEN {
        return false;
    }
    let lower = trimmed.to_lowercase();
    HEADING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Collects up to [`FRAGMENT_WINDOW`] non-empty lines after each heading
/// whose text matches one of `keywords`. The next heading closes a window.
fn heading_fragments(text: &str, keywords: &[&str]) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut fragments = Vec::new();
    let mut i = 0;

    while i < lines.len() && fragments.len() < MAX_FRAGMENTS {
        let line = lines[i];
        let lower = line.trim().to_lowercase();
        let matches = is_heading(line) && keywords.iter().any(|kw| lower.contains(kw));
        if !matches {
            i += 1;
            continue;
        }

        let mut taken = 0;
        let mut j = i + 1;
        while j < lines.len() && taken < FRAGMENT_WINDOW && fragments.len() < MAX_FRAGMENTS {
            let candidate = lines[j].trim();
            if is_heading(lines[j]) {
                break;
            }
            if !candidate.is_empty() {
                fragments.push(candidate.to_string());
                taken += 1;
            }
            j += 1;
        }
        i = j;
    }

    fragments
}
