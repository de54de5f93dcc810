use crate::content::{ExplanationContent, ExplanationSection};
use crate::session::Loadable;

/// Slide-by-slide cursor over explanation sections. Navigation never refetches.
#[derive(Clone, Debug, Default)]
pub struct ExplanationController {
    pub content: Loadable<ExplanationContent>,
    pub index: usize,
}

impl ExplanationController {
    pub fn section_count(&self) -> usize {
        self.content.ready().map_or(0, |c| c.sections.len())
    }

    pub fn current(&self) -> Option<&ExplanationSection> {
        self.content.ready()?.sections.get(self.index)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        let count = self.section_count();
        count > 0 && self.index == count - 1
    }

    pub fn next(&mut self) {
        if self.index + 1 < self.section_count() {
            self.index += 1;
        }
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Finishing is only offered on the last slide.
    pub fn can_finish(&self) -> bool {
        self.is_last()
    }
}
