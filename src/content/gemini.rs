use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::Config;
use crate::content::validate::parse_json;
use crate::content::{
    ContentError, ContentProvider, Difficulty, ExplanationContent, PracticeItem, Question,
    VerificationScenario,
};

/// Gemini `generateContent` client. Each call is a single blocking request with
/// structured JSON output; no retries.
pub struct GeminiProvider {
    client: reqwest::blocking::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(config: &Config, api_key: String) -> Result<Self, ContentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ContentError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn generate<T: DeserializeOwned>(&self, prompt: &str, schema: Value) -> Result<T, ContentError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });

        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| ContentError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent failed");
            return Err(ContentError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Value = response
            .json()
            .map_err(|e| ContentError::Parse(e.to_string()))?;
        let text = extract_text(&envelope)?;
        parse_json(text)
    }
}

/// Pull the generated text out of a `generateContent` response envelope.
pub fn extract_text(envelope: &Value) -> Result<&str, ContentError> {
    envelope["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| ContentError::Parse("response has no candidate text".to_string()))
}

fn question_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "text": { "type": "STRING" },
            "options": { "type": "ARRAY", "items": { "type": "STRING" } },
            "correctIndex": { "type": "INTEGER" },
            "explanation": { "type": "STRING" },
        },
        "required": ["id", "text", "options", "correctIndex", "explanation"],
    })
}

fn diagnostic_prompt(topic: &str) -> String {
    format!(
        "Topic: {topic}\n\
         Task: Generate 3 diagnostic multiple-choice questions to assess prior knowledge.\n\
         Difficulty: Progressive (Basic -> Intermediate -> Advanced).\n\
         Style: Clinical, evaluative, no filler."
    )
}

fn explanation_prompt(topic: &str) -> String {
    format!(
        "Topic: {topic}\n\
         System Role: You are an advanced academic learning engine. Provide a deep, rigorous \
         and structurally clear explanation of the topic.\n\n\
         Guidelines:\n\
         1. Explain complex concepts simply without losing technical depth.\n\
         2. Use bullet points heavily to break down dense information.\n\
         3. Avoid metaphors and flowery language. Stick to engineering or scientific facts.\n\n\
         Mandatory sections, in this exact order:\n\
         1. \"Core Principle & Definition\": define the concept and list its fundamental attributes.\n\
         2. \"Mechanics & Internal Logic\": how it works internally; key components and interactions.\n\
         3. \"Historical Context & Evolution\": what problem it solved; a bulleted evolution.\n\
         4. \"Mental Models & Visualization\": distinct frameworks and how they map to reality.\n\
         5. \"Real-World Application\": 3 case studies as Context -> Application -> Outcome.\n\
         6. \"Critical Analysis & Limitations\": constraints, failure modes, misconceptions.\n\
         7. \"Cross-Disciplinary Connections\": relations to other fields, one bullet each.\n\
         8. \"Key References\": standard textbooks, standards or authoritative bodies.\n\n\
         Tone: Professional, academic, concise. Format: Markdown."
    )
}

fn practice_prompt(topic: &str, difficulty: Difficulty) -> String {
    format!(
        "Topic: {topic}\n\
         Task: Generate ONE {} practice question.\n\
         Type: Application-based multiple choice.",
        difficulty.as_str()
    )
}

fn verification_prompt(topic: &str) -> String {
    format!(
        "Topic: {topic}\n\
         Task: Generate a complex, multi-faceted real-world case study scenario to verify mastery.\n\
         Style: Business school case study (short, dense).\n\n\
         Requirement:\n\
         1. A rich scenario description.\n\
         2. THREE distinct questions based on this exact scenario:\n\
            - Question 1: Diagnosis (what is happening, what is the root cause?)\n\
            - Question 2: Implementation (how do we apply the concept to fix or optimize?)\n\
            - Question 3: Consequence (what is a side effect or constraint of the solution?)"
    )
}

impl ContentProvider for GeminiProvider {
    fn name(&self) -> &str {
        &self.model
    }

    fn fetch_diagnostic(&self, topic: &str) -> Result<Vec<Question>, ContentError> {
        let schema = json!({ "type": "ARRAY", "items": question_schema() });
        self.generate(&diagnostic_prompt(topic), schema)
    }

    fn fetch_explanation(&self, topic: &str) -> Result<ExplanationContent, ContentError> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "sections": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": { "type": "STRING" },
                            "content": { "type": "STRING" },
                        },
                        "required": ["title", "content"],
                    }
                }
            },
            "required": ["title", "sections"],
        });
        self.generate(&explanation_prompt(topic), schema)
    }

    fn fetch_practice(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<PracticeItem, ContentError> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "question": question_schema(),
                "difficulty": { "type": "STRING", "enum": ["easy", "medium", "hard"] },
            },
            "required": ["question", "difficulty"],
        });
        self.generate(&practice_prompt(topic, difficulty), schema)
    }

    fn fetch_verification(&self, topic: &str) -> Result<VerificationScenario, ContentError> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "scenario": { "type": "STRING" },
                "questions": { "type": "ARRAY", "items": question_schema() },
            },
            "required": ["scenario", "questions"],
        });
        self.generate(&verification_prompt(topic), schema)
    }
}
