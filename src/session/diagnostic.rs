use crate::content::Question;
use crate::session::{InteractionState, Loadable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticStep {
    NextQuestion,
    Finished { score: u32 },
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticController {
    pub questions: Loadable<Vec<Question>>,
    pub index: usize,
    pub score: u32,
    pub interaction: InteractionState,
}

impl DiagnosticController {
    pub fn current(&self) -> Option<&Question> {
        self.questions.ready()?.get(self.index)
    }

    pub fn total(&self) -> usize {
        self.questions.ready().map_or(0, Vec::len)
    }

    pub fn answer(&mut self, index: usize) -> Option<bool> {
        let question = self.questions.ready()?.get(self.index)?;
        let correct = self.interaction.answer(question, index)?;
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    /// Move past an answered question. Nothing happens before an answer exists.
    pub fn proceed(&mut self) -> Option<DiagnosticStep> {
        if !self.interaction.is_answered() {
            return None;
        }
        if self.index + 1 < self.total() {
            self.index += 1;
            self.interaction.reset();
            Some(DiagnosticStep::NextQuestion)
        } else {
            Some(DiagnosticStep::Finished { score: self.score })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::question;

    fn loaded() -> DiagnosticController {
        DiagnosticController {
            questions: Loadable::Ready(vec![question("1", 0), question("2", 1), question("3", 2)]),
            ..Default::default()
        }
    }

    #[test]
    fn test_proceed_requires_answer() {
        let mut diag = loaded();
        assert_eq!(diag.proceed(), None);
        assert_eq!(diag.index, 0);
    }

    #[test]
    fn test_correct_correct_incorrect_scores_two() {
        let mut diag = loaded();
        assert_eq!(diag.answer(0), Some(true));
        assert_eq!(diag.proceed(), Some(DiagnosticStep::NextQuestion));
        assert_eq!(diag.answer(1), Some(true));
        assert_eq!(diag.proceed(), Some(DiagnosticStep::NextQuestion));
        assert_eq!(diag.answer(0), Some(false));
        assert_eq!(diag.proceed(), Some(DiagnosticStep::Finished { score: 2 }));
    }

    #[test]
    fn test_second_answer_is_noop() {
        let mut diag = loaded();
        diag.answer(3);
        assert_eq!(diag.answer(0), None);
        assert_eq!(diag.score, 0);
    }

    #[test]
    fn test_answer_while_loading_is_noop() {
        let mut diag = DiagnosticController::default();
        assert_eq!(diag.answer(0), None);
        assert!(diag.current().is_none());
    }
}
