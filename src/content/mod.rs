pub mod sample;
pub mod validate;
pub mod worker;

#[cfg(feature = "network")]
pub mod gemini;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::state::Mode;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationSection {
    pub title: String,
    /// Markdown body.
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationContent {
    pub title: String,
    pub sections: Vec<ExplanationSection>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeItem {
    pub question: Question,
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationScenario {
    pub scenario: String,
    /// Diagnosis, Implementation, Consequence, in that order.
    pub questions: Vec<Question>,
}

pub const DIAGNOSTIC_QUESTION_COUNT: usize = 3;
pub const VERIFICATION_STEP_COUNT: usize = 3;
pub const VERIFICATION_STEP_LABELS: [&str; VERIFICATION_STEP_COUNT] =
    ["Diagnosis", "Implementation", "Consequence"];

/// One fetch, keyed by mode and topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentRequest {
    Diagnostic { topic: String },
    Explanation { topic: String },
    Practice { topic: String, difficulty: Difficulty },
    Verification { topic: String },
}

impl ContentRequest {
    pub fn mode(&self) -> Mode {
        match self {
            ContentRequest::Diagnostic { .. } => Mode::Diagnostic,
            ContentRequest::Explanation { .. } => Mode::Explanation,
            ContentRequest::Practice { .. } => Mode::Practice,
            ContentRequest::Verification { .. } => Mode::Verification,
        }
    }

    pub fn topic(&self) -> &str {
        match self {
            ContentRequest::Diagnostic { topic }
            | ContentRequest::Explanation { topic }
            | ContentRequest::Practice { topic, .. }
            | ContentRequest::Verification { topic } => topic,
        }
    }
}

/// Content delivered for exactly one mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeContent {
    Diagnostic(Vec<Question>),
    Explanation(ExplanationContent),
    Practice(PracticeItem),
    Verification(VerificationScenario),
}

impl ModeContent {
    pub fn mode(&self) -> Mode {
        match self {
            ModeContent::Diagnostic(_) => Mode::Diagnostic,
            ModeContent::Explanation(_) => Mode::Explanation,
            ModeContent::Practice(_) => Mode::Practice,
            ModeContent::Verification(_) => Mode::Verification,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Fetch(String),

    #[error("content service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("no API key found in ${0}")]
    MissingApiKey(String),

    #[error("failed to parse generated content: {0}")]
    Parse(String),

    #[error("generated content has the wrong shape: {0}")]
    Schema(String),
}

impl ContentError {
    /// True for transport-level failures, false for malformed responses.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ContentError::Fetch(_) | ContentError::Status { .. } | ContentError::MissingApiKey(_)
        )
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        ContentError::Parse(err.to_string())
    }
}

/// Source of all generated learning content. Implementations only parse;
/// `fetch` checks the shape of every result before it reaches a session.
pub trait ContentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_diagnostic(&self, topic: &str) -> Result<Vec<Question>, ContentError>;

    fn fetch_explanation(&self, topic: &str) -> Result<ExplanationContent, ContentError>;

    fn fetch_practice(&self, topic: &str, difficulty: Difficulty)
    -> Result<PracticeItem, ContentError>;

    fn fetch_verification(&self, topic: &str) -> Result<VerificationScenario, ContentError>;

    fn fetch(&self, request: &ContentRequest) -> Result<ModeContent, ContentError> {
        let content = match request {
            ContentRequest::Diagnostic { topic } => {
                ModeContent::Diagnostic(self.fetch_diagnostic(topic)?)
            }
            ContentRequest::Explanation { topic } => {
                ModeContent::Explanation(self.fetch_explanation(topic)?)
            }
            ContentRequest::Practice { topic, difficulty } => {
                ModeContent::Practice(self.fetch_practice(topic, *difficulty)?)
            }
            ContentRequest::Verification { topic } => {
                ModeContent::Verification(self.fetch_verification(topic)?)
            }
        };
        validate::validate_content(&content)?;
        Ok(content)
    }
}
