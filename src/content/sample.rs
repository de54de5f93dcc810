use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::content::{
    ContentError, ContentProvider, Difficulty, ExplanationContent, ExplanationSection,
    PracticeItem, Question, VERIFICATION_STEP_LABELS, VerificationScenario,
};

/// Offline content used when no API key is configured. Shapes match what the
/// generative provider returns so every mode can be exercised without a network.
pub struct SampleProvider {
    rng: Mutex<SmallRng>,
    practice_serial: AtomicU64,
}

impl SampleProvider {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            practice_serial: AtomicU64::new(0),
        }
    }

    /// Build a question whose correct option lands at a random position.
    fn question(&self, id: String, text: String, correct: &str, wrong: [&str; 3], explanation: &str) -> Question {
        let mut options: Vec<String> = wrong.iter().map(|w| w.to_string()).collect();
        options.push(correct.to_string());
        if let Ok(mut rng) = self.rng.lock() {
            options.shuffle(&mut *rng);
        }
        let correct_index = options.iter().position(|o| o == correct).unwrap_or(0);
        Question {
            id,
            text,
            options,
            correct_index,
            explanation: explanation.to_string(),
        }
    }
}

impl Default for SampleProvider {
    fn default() -> Self {
        Self::new()
    }
}

const SECTION_TITLES: [&str; 8] = [
    "Core Principle & Definition",
    "Mechanics & Internal Logic",
    "Historical Context & Evolution",
    "Mental Models & Visualization",
    "Real-World Application",
    "Critical Analysis & Limitations",
    "Cross-Disciplinary Connections",
    "Key References",
];

fn section_body(index: usize, topic: &str) -> String {
    match index {
        0 => format!(
            "## Fundamental Definition\n\n**{topic}** is defined by a small set of attributes.\n\n### Key Attributes\n* **Attribute 1**: what it is\n* **Attribute 2**: what it is not"
        ),
        1 => "## How it Works\n\n* **Component A**: role and interaction\n* **Component B**: role and interaction".to_string(),
        2 => "## Evolution\n\n* **Origin**: the problem it first solved\n* **Modern State**: where it is used today".to_string(),
        3 => "## Visualization\n\n* **Model 1**: picture it as a pipeline\n* **Model 2**: picture it as a feedback loop".to_string(),
        4 => "## Case Studies\n\n* **System X**: context, application, outcome\n* **Project Y**: context, application, outcome\n* **Team Z**: context, application, outcome".to_string(),
        5 => "## Limitations\n\n* **Constraint**: where it breaks down\n* **Misconception**: what people often get wrong".to_string(),
        6 => "## Connections\n\n* **Physics**: shared conservation ideas\n* **Economics**: shared trade-off ideas".to_string(),
        _ => "## Sources\n\n* Standard textbooks\n* IEEE standards".to_string(),
    }
}

impl ContentProvider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    fn fetch_diagnostic(&self, topic: &str) -> Result<Vec<Question>, ContentError> {
        let levels = ["basic", "intermediate", "advanced"];
        Ok(levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                self.question(
                    format!("d{}", i + 1),
                    format!("Diagnostic ({level}): which statement about {topic} holds?"),
                    "The accurate statement",
                    ["A plausible distractor", "A common misconception", "An unrelated claim"],
                    "Sample explanation for the diagnostic question.",
                )
            })
            .collect())
    }

    fn fetch_explanation(&self, topic: &str) -> Result<ExplanationContent, ContentError> {
        Ok(ExplanationContent {
            title: format!("Analysis of {topic}"),
            sections: SECTION_TITLES
                .iter()
                .enumerate()
                .map(|(i, title)| ExplanationSection {
                    title: title.to_string(),
                    content: section_body(i, topic),
                })
                .collect(),
        })
    }

    fn fetch_practice(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<PracticeItem, ContentError> {
        let serial = self.practice_serial.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(PracticeItem {
            question: self.question(
                format!("p{serial}"),
                format!("Practice #{serial} ({}) for {topic}: pick the correct application.", difficulty.as_str()),
                "Correct",
                ["Wrong", "Wrong again", "Still wrong"],
                "Sample explanation for the practice item.",
            ),
            difficulty,
        })
    }

    fn fetch_verification(&self, topic: &str) -> Result<VerificationScenario, ContentError> {
        let prompts = [
            "What is the root cause?",
            "How do we apply the concept to fix it?",
            "What is a side effect of the fix?",
        ];
        Ok(VerificationScenario {
            scenario: format!("A complex scenario involving {topic} unfolds in a production environment."),
            questions: VERIFICATION_STEP_LABELS
                .iter()
                .zip(prompts)
                .enumerate()
                .map(|(i, (label, prompt))| {
                    self.question(
                        format!("v{}", i + 1),
                        format!("{label}: {prompt}"),
                        "The sound answer",
                        ["A hasty answer", "A partial answer", "A wrong answer"],
                        &format!("{label} explanation."),
                    )
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentRequest, ModeContent};

    #[test]
    fn test_sample_content_passes_validation() {
        let provider = SampleProvider::with_seed(7);
        let requests = [
            ContentRequest::Diagnostic { topic: "Rust".to_string() },
            ContentRequest::Explanation { topic: "Rust".to_string() },
            ContentRequest::Practice {
                topic: "Rust".to_string(),
                difficulty: Difficulty::Hard,
            },
            ContentRequest::Verification { topic: "Rust".to_string() },
        ];
        for request in &requests {
            let content = provider.fetch(request).unwrap();
            assert_eq!(content.mode(), request.mode());
        }
    }

    #[test]
    fn test_sample_explanation_has_eight_sections() {
        let provider = SampleProvider::with_seed(1);
        let explanation = provider.fetch_explanation("Entropy").unwrap();
        assert_eq!(explanation.sections.len(), 8);
        assert_eq!(explanation.sections[0].title, "Core Principle & Definition");
        assert_eq!(explanation.sections[7].title, "Key References");
    }

    #[test]
    fn test_sample_practice_echoes_difficulty_and_fresh_ids() {
        let provider = SampleProvider::with_seed(3);
        let first = provider.fetch_practice("Rust", Difficulty::Medium).unwrap();
        let second = provider.fetch_practice("Rust", Difficulty::Hard).unwrap();
        assert_eq!(first.difficulty, Difficulty::Medium);
        assert_eq!(second.difficulty, Difficulty::Hard);
        assert_ne!(first.question.id, second.question.id);
        let q = &second.question;
        assert_eq!(q.options[q.correct_index], "Correct");
    }

    #[test]
    fn test_sample_verification_steps_in_order() {
        let provider = SampleProvider::with_seed(5);
        match provider
            .fetch(&ContentRequest::Verification { topic: "Caching".to_string() })
            .unwrap()
        {
            ModeContent::Verification(scenario) => {
                assert!(scenario.questions[0].text.starts_with("Diagnosis"));
                assert!(scenario.questions[1].text.starts_with("Implementation"));
                assert!(scenario.questions[2].text.starts_with("Consequence"));
            }
            other => panic!("unexpected content {other:?}"),
        }
    }
}
