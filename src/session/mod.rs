pub mod cycle;
pub mod diagnostic;
pub mod explanation;
pub mod practice;
pub mod reflection;
pub mod state;
pub mod verification;

use crate::content::{ContentError, Question};

/// Content slot owned by a mode controller. A mode has either fully valid
/// content or none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(ContentError),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn error(&self) -> Option<&ContentError> {
        match self {
            Loadable::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub text: String,
}

/// Per-question selection and feedback; reset whenever a question changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub selected: Option<usize>,
    pub feedback: Option<Feedback>,
}

impl InteractionState {
    pub fn is_answered(&self) -> bool {
        self.feedback.is_some()
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.feedback = None;
    }

    /// Grade `index` against `question`. Returns `None` when the question was
    /// already answered or the index names no option.
    pub fn answer(&mut self, question: &Question, index: usize) -> Option<bool> {
        if self.is_answered() || index >= question.options.len() {
            return None;
        }
        let is_correct = question.is_correct(index);
        self.selected = Some(index);
        self.feedback = Some(Feedback {
            is_correct,
            text: question.explanation.clone(),
        });
        Some(is_correct)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::content::Question;

    pub fn question(id: &str, correct: usize) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: correct,
            explanation: format!("Explanation {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::question;
    use super::*;

    #[test]
    fn test_answer_once_only() {
        let q = question("1", 2);
        let mut interaction = InteractionState::default();
        assert_eq!(interaction.answer(&q, 2), Some(true));
        assert_eq!(interaction.answer(&q, 1), None);
        assert_eq!(interaction.selected, Some(2));
        let feedback = interaction.feedback.as_ref().unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.text, "Explanation 1");
    }

    #[test]
    fn test_out_of_range_answer_ignored() {
        let q = question("1", 0);
        let mut interaction = InteractionState::default();
        assert_eq!(interaction.answer(&q, 4), None);
        assert!(!interaction.is_answered());
    }

    #[test]
    fn test_reset_clears_feedback() {
        let q = question("1", 0);
        let mut interaction = InteractionState::default();
        interaction.answer(&q, 1);
        interaction.reset();
        assert_eq!(interaction, InteractionState::default());
    }
}
