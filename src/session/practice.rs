use crate::content::{Difficulty, PracticeItem, Question};
use crate::session::{InteractionState, Loadable};

/// Answers beyond this count switch practice to hard items.
pub const HARD_AFTER_ANSWERS: u32 = 5;

/// Difficulty for the next practice fetch. `Easy` is never requested.
pub fn difficulty_for(questions_answered: u32) -> Difficulty {
    if questions_answered > HARD_AFTER_ANSWERS {
        Difficulty::Hard
    } else {
        Difficulty::Medium
    }
}

/// Holds one ephemeral practice item; it is replaced wholesale after each answer.
#[derive(Clone, Debug, Default)]
pub struct PracticeController {
    pub item: Loadable<PracticeItem>,
    pub requested: Option<Difficulty>,
    pub interaction: InteractionState,
}

impl PracticeController {
    pub fn current(&self) -> Option<&Question> {
        self.item.ready().map(|item| &item.question)
    }

    pub fn answer(&mut self, index: usize) -> Option<bool> {
        let question = &self.item.ready()?.question;
        self.interaction.answer(question, index)
    }

    /// Drop the current item ahead of a fresh fetch.
    pub fn begin_fetch(&mut self, difficulty: Difficulty) {
        self.item = Loadable::Loading;
        self.requested = Some(difficulty);
        self.interaction.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::question;

    #[test]
    fn test_difficulty_threshold() {
        assert_eq!(difficulty_for(0), Difficulty::Medium);
        assert_eq!(difficulty_for(5), Difficulty::Medium);
        assert_eq!(difficulty_for(6), Difficulty::Hard);
        assert_eq!(difficulty_for(40), Difficulty::Hard);
    }

    #[test]
    fn test_begin_fetch_clears_item_and_feedback() {
        let mut practice = PracticeController {
            item: Loadable::Ready(PracticeItem {
                question: question("p1", 1),
                difficulty: Difficulty::Medium,
            }),
            ..Default::default()
        };
        assert_eq!(practice.answer(1), Some(true));
        practice.begin_fetch(Difficulty::Hard);
        assert!(practice.item.is_loading());
        assert!(!practice.interaction.is_answered());
        assert_eq!(practice.requested, Some(Difficulty::Hard));
        assert_eq!(practice.answer(1), None);
    }
}
