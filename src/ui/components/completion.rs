use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::content::DIAGNOSTIC_QUESTION_COUNT;
use crate::session::state::{PracticeHistory, SessionState, VERIFICATION_ACCURACY_FLOOR};
use crate::ui::theme::Theme;

/// Most recent practice answers listed in the summary.
const RECORD_LEN: usize = 12;

/// Summary shown once a session reaches the complete stage.
pub struct Completion<'a> {
    pub topic: &'a str,
    pub state: &'a SessionState,
    pub history: &'a PracticeHistory,
    pub theme: &'a Theme,
}

impl<'a> Completion<'a> {
    pub fn new(
        topic: &'a str,
        state: &'a SessionState,
        history: &'a PracticeHistory,
        theme: &'a Theme,
    ) -> Self {
        Self {
            topic,
            state,
            history,
            theme,
        }
    }
}

/// The last `limit` practice outcomes, oldest first, as check and cross marks.
pub fn practice_record(outcomes: &[bool], limit: usize) -> String {
    let start = outcomes.len().saturating_sub(limit);
    outcomes[start..]
        .iter()
        .map(|&correct| if correct { '\u{2713}' } else { '\u{2717}' })
        .collect()
}

impl Widget for Completion<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Mastery Achieved ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = vec![
            Line::from(Span::styled(
                self.topic,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "You diagnosed, studied, practiced, verified and reflected.",
                Style::default().fg(colors.text_muted()),
            )),
        ];
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let accuracy = self.state.practice_accuracy();
        let acc_color = if accuracy >= 80 {
            colors.success()
        } else if accuracy >= VERIFICATION_ACCURACY_FLOOR {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled("  Practice accuracy:  ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{accuracy}%"),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[1], buf);

        let answered_line = Line::from(vec![
            Span::styled("  Questions answered: ", Style::default().fg(colors.fg())),
            Span::styled(
                self.state.questions_answered().to_string(),
                Style::default().fg(colors.accent()),
            ),
        ]);
        Paragraph::new(answered_line).render(layout[2], buf);

        let record = practice_record(self.history.outcomes(), RECORD_LEN);
        let record_line = Line::from(vec![
            Span::styled("  Recent practice:    ", Style::default().fg(colors.fg())),
            Span::styled(
                if record.is_empty() { "-".to_string() } else { record },
                Style::default().fg(colors.text_muted()),
            ),
        ]);
        Paragraph::new(record_line).render(layout[3], buf);

        let diagnostic = self
            .state
            .diagnostic_score()
            .map_or_else(|| "-".to_string(), |s| format!("{s}/{DIAGNOSTIC_QUESTION_COUNT}"));
        let diag_line = Line::from(vec![
            Span::styled("  Diagnostic score:   ", Style::default().fg(colors.fg())),
            Span::styled(diagnostic, Style::default().fg(colors.fg())),
        ]);
        Paragraph::new(diag_line).render(layout[4], buf);

        let mastery_line = Line::from(vec![
            Span::styled("  Mastery:            ", Style::default().fg(colors.fg())),
            Span::styled(
                self.state.mastery().label(),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(mastery_line).render(layout[5], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [Enter] Start a new topic  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]))
        .render(layout[7], buf);
    }
}
