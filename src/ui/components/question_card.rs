use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::content::Question;
use crate::session::InteractionState;
use crate::ui::theme::Theme;

/// A multiple-choice question with its options and, once answered, the
/// correct/incorrect marking and explanation.
pub struct QuestionCard<'a> {
    title: String,
    preface: Option<&'a str>,
    question: &'a Question,
    interaction: &'a InteractionState,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(
        title: impl Into<String>,
        question: &'a Question,
        interaction: &'a InteractionState,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title: title.into(),
            preface: None,
            question,
            interaction,
            theme,
        }
    }

    /// Text shown above the question, e.g. a verification scenario.
    pub fn preface(mut self, preface: &'a str) -> Self {
        self.preface = Some(preface);
        self
    }

    fn option_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let answered = self.interaction.is_answered();

        self.question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let is_selected = self.interaction.selected == Some(i);
                let is_correct = self.question.is_correct(i);
                let (marker, style) = if answered && is_correct {
                    (
                        "\u{2713}",
                        Style::default()
                            .fg(colors.success())
                            .add_modifier(Modifier::BOLD),
                    )
                } else if answered && is_selected {
                    (
                        "\u{2717}",
                        Style::default()
                            .fg(colors.error())
                            .add_modifier(Modifier::BOLD),
                    )
                } else if answered {
                    (" ", Style::default().fg(colors.text_muted()))
                } else {
                    (" ", Style::default().fg(colors.fg()))
                };
                Line::from(vec![
                    Span::styled(
                        format!("  {marker} [{}] ", option_key(i)),
                        Style::default().fg(colors.accent()),
                    ),
                    Span::styled(option.as_str(), style),
                ])
            })
            .collect()
    }
}

/// Key label for option `index`: digits first, letters as an alternative.
pub fn option_key(index: usize) -> char {
    char::from_digit(index as u32 + 1, 10).unwrap_or('?')
}

/// Footer hint for the keys that answer a question with `option_count` options.
/// Only the first nine options have a key.
pub fn answer_hint(option_count: usize) -> String {
    match option_count.min(9) {
        0 | 1 => "[1] Answer".to_string(),
        n => format!("[1-{}] Answer", option_key(n - 1)),
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let mut lines: Vec<Line> = Vec::new();
        if let Some(preface) = self.preface {
            for para in preface.lines() {
                lines.push(Line::from(Span::styled(
                    para,
                    Style::default()
                        .fg(colors.text_muted())
                        .add_modifier(Modifier::ITALIC),
                )));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            self.question.text.as_str(),
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.extend(self.option_lines());

        if let Some(feedback) = &self.interaction.feedback {
            let (verdict, color) = if feedback.is_correct {
                ("Correct!", colors.success())
            } else {
                ("Not quite.", colors.error())
            };
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                verdict,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                feedback.text.as_str(),
                Style::default().fg(colors.fg()),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::question;

    fn rendered(card: QuestionCard, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        card.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_option_keys() {
        assert_eq!(option_key(0), '1');
        assert_eq!(option_key(8), '9');
    }

    #[test]
    fn test_answer_hint_follows_option_count() {
        assert_eq!(answer_hint(2), "[1-2] Answer");
        assert_eq!(answer_hint(4), "[1-4] Answer");
        assert_eq!(answer_hint(6), "[1-6] Answer");
        assert_eq!(answer_hint(12), "[1-9] Answer");
    }

    #[test]
    fn test_unanswered_hides_feedback() {
        let theme = Theme::default();
        let q = question("1", 1);
        let interaction = InteractionState::default();
        let text = rendered(QuestionCard::new("Q", &q, &interaction, &theme), 50, 12);
        assert!(text.contains("Question 1"));
        assert!(text.contains("[4] D"));
        assert!(!text.contains("Explanation 1"));
    }

    #[test]
    fn test_answered_shows_explanation() {
        let theme = Theme::default();
        let q = question("1", 1);
        let mut interaction = InteractionState::default();
        interaction.answer(&q, 0);
        let text = rendered(QuestionCard::new("Q", &q, &interaction, &theme), 50, 14);
        assert!(text.contains("Not quite."));
        assert!(text.contains("Explanation 1"));
    }
}
