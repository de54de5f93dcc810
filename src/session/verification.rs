use crate::content::{Question, VERIFICATION_STEP_LABELS, VerificationScenario};
use crate::session::{InteractionState, Loadable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationStep {
    NextStep,
    Passed,
}

/// Three-step case study. A wrong answer anywhere fails the whole attempt.
#[derive(Clone, Debug, Default)]
pub struct VerificationController {
    pub scenario: Loadable<VerificationScenario>,
    pub index: usize,
    pub interaction: InteractionState,
}

impl VerificationController {
    pub fn current(&self) -> Option<&Question> {
        self.scenario.ready()?.questions.get(self.index)
    }

    pub fn step_count(&self) -> usize {
        self.scenario.ready().map_or(0, |s| s.questions.len())
    }

    pub fn step_label(&self) -> &'static str {
        VERIFICATION_STEP_LABELS
            .get(self.index)
            .copied()
            .unwrap_or("Step")
    }

    pub fn answer(&mut self, index: usize) -> Option<bool> {
        let question = self.scenario.ready()?.questions.get(self.index)?;
        self.interaction.answer(question, index)
    }

    pub fn failed(&self) -> bool {
        matches!(&self.interaction.feedback, Some(f) if !f.is_correct)
    }

    /// Only a correct answer unlocks the next step.
    pub fn can_proceed(&self) -> bool {
        matches!(&self.interaction.feedback, Some(f) if f.is_correct)
    }

    pub fn proceed(&mut self) -> Option<VerificationStep> {
        if !self.can_proceed() {
            return None;
        }
        if self.index + 1 < self.step_count() {
            self.index += 1;
            self.interaction.reset();
            Some(VerificationStep::NextStep)
        } else {
            Some(VerificationStep::Passed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::question;

    fn loaded() -> VerificationController {
        VerificationController {
            scenario: Loadable::Ready(VerificationScenario {
                scenario: "Case".to_string(),
                questions: vec![question("v1", 1), question("v2", 2), question("v3", 0)],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_three_correct_steps_pass() {
        let mut verif = loaded();
        assert_eq!(verif.step_label(), "Diagnosis");
        verif.answer(1);
        assert_eq!(verif.proceed(), Some(VerificationStep::NextStep));
        assert_eq!(verif.step_label(), "Implementation");
        verif.answer(2);
        assert_eq!(verif.proceed(), Some(VerificationStep::NextStep));
        assert_eq!(verif.step_label(), "Consequence");
        verif.answer(0);
        assert_eq!(verif.proceed(), Some(VerificationStep::Passed));
    }

    #[test]
    fn test_wrong_answer_blocks_proceed() {
        let mut verif = loaded();
        assert_eq!(verif.answer(3), Some(false));
        assert!(verif.failed());
        assert!(!verif.can_proceed());
        assert_eq!(verif.proceed(), None);
        assert_eq!(verif.index, 0);
    }
}
