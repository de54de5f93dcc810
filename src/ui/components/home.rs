use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

const SUGGESTIONS: [&str; 3] = ["Quantum Entanglement", "Rust Ownership", "Bayesian Inference"];

/// Landing screen: title, topic prompt and the active content source.
pub struct Home<'a> {
    pub input: &'a LineInput,
    pub provider: &'a str,
    pub notice: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Home<'a> {
    pub fn new(input: &'a LineInput, provider: &'a str, theme: &'a Theme) -> Self {
        Self {
            input,
            provider,
            notice: None,
            theme,
        }
    }

    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for Home<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "learnloop",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Diagnose \u{b7} Explain \u{b7} Practice \u{b7} Verify \u{b7} Reflect",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let (before, cursor, after) = self.input.render_parts();
        let cursor_str = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
        let mut spans = vec![
            Span::styled("What do you want to master? ", Style::default().fg(colors.text_muted())),
            Span::styled(before, Style::default().fg(colors.fg())),
            Span::styled(cursor_str, Style::default().fg(colors.bg()).bg(colors.accent())),
            Span::styled(after, Style::default().fg(colors.fg())),
        ];
        if self.input.value().is_empty() {
            spans.push(Span::styled(
                format!(" e.g. {}", SUGGESTIONS.join(", ")),
                Style::default().fg(colors.text_muted()),
            ));
        }
        let prompt = Block::bordered()
            .title(" Topic ")
            .border_style(Style::default().fg(colors.border_focused()));
        Paragraph::new(Line::from(spans))
            .block(prompt)
            .render(layout[1], buf);

        let source = Line::from(vec![
            Span::styled("  Content source: ", Style::default().fg(colors.text_muted())),
            Span::styled(self.provider, Style::default().fg(colors.accent())),
        ]);
        Paragraph::new(source).render(layout[2], buf);

        if let Some(notice) = self.notice {
            Paragraph::new(Line::from(Span::styled(
                format!("  {notice}"),
                Style::default().fg(colors.warning()),
            )))
            .wrap(Wrap { trim: false })
            .render(layout[3], buf);
        }
    }
}
