/// Characters required before a reflection can be committed.
pub const MIN_REFLECTION_CHARS: usize = 20;

#[derive(Clone, Debug, Default)]
pub struct ReflectionController {
    text: String,
}

impl ReflectionController {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn can_commit(&self) -> bool {
        self.char_count() >= MIN_REFLECTION_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_threshold() {
        let mut reflection = ReflectionController::default();
        reflection.set_text(&"x".repeat(19));
        assert!(!reflection.can_commit());
        reflection.set_text(&"x".repeat(20));
        assert!(reflection.can_commit());
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let mut reflection = ReflectionController::default();
        reflection.set_text(&"é".repeat(19));
        assert_eq!(reflection.char_count(), 19);
        assert!(!reflection.can_commit());
    }
}
