use serde::de::DeserializeOwned;

use crate::content::{
    ContentError, DIAGNOSTIC_QUESTION_COUNT, ExplanationContent, ModeContent, Question,
    VERIFICATION_STEP_COUNT,
};

/// Strip markdown code fences some models wrap around JSON output.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the fence line, including a language tag like `json`.
        body = rest.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ContentError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(ContentError::Parse("empty response".to_string()));
    }
    Ok(serde_json::from_str(cleaned)?)
}

fn validate_question(question: &Question) -> Result<(), ContentError> {
    if question.text.trim().is_empty() {
        return Err(ContentError::Schema(format!(
            "question '{}' has no text",
            question.id
        )));
    }
    if question.options.len() < 2 {
        return Err(ContentError::Schema(format!(
            "question '{}' has {} option(s), need at least 2",
            question.id,
            question.options.len()
        )));
    }
    if question.correct_index >= question.options.len() {
        return Err(ContentError::Schema(format!(
            "question '{}' has correctIndex {} but only {} options",
            question.id,
            question.correct_index,
            question.options.len()
        )));
    }
    Ok(())
}

fn validate_question_set(questions: &[Question], expected: usize, what: &str) -> Result<(), ContentError> {
    if questions.len() != expected {
        return Err(ContentError::Schema(format!(
            "{what} needs exactly {expected} questions, got {}",
            questions.len()
        )));
    }
    questions.iter().try_for_each(validate_question)
}

fn validate_explanation(content: &ExplanationContent) -> Result<(), ContentError> {
    if content.sections.is_empty() {
        return Err(ContentError::Schema("explanation has no sections".to_string()));
    }
    Ok(())
}

pub fn validate_content(content: &ModeContent) -> Result<(), ContentError> {
    match content {
        ModeContent::Diagnostic(questions) => {
            validate_question_set(questions, DIAGNOSTIC_QUESTION_COUNT, "diagnostic")
        }
        ModeContent::Explanation(explanation) => validate_explanation(explanation),
        ModeContent::Practice(item) => validate_question(&item.question),
        ModeContent::Verification(scenario) => {
            validate_question_set(&scenario.questions, VERIFICATION_STEP_COUNT, "verification")
        }
    }
}
