use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::content::ExplanationSection;
use crate::ui::theme::{Theme, ThemeColors};

/// One explanation section rendered as a slide.
pub struct ExplanationSlide<'a> {
    heading: &'a str,
    section: &'a ExplanationSection,
    position: (usize, usize),
    theme: &'a Theme,
}

impl<'a> ExplanationSlide<'a> {
    /// `position` is (zero-based index, section count).
    pub fn new(
        heading: &'a str,
        section: &'a ExplanationSection,
        position: (usize, usize),
        theme: &'a Theme,
    ) -> Self {
        Self {
            heading,
            section,
            position,
            theme,
        }
    }
}

impl Widget for ExplanationSlide<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (index, count) = self.position;

        let block = Block::bordered()
            .title(format!(" {} ", self.heading))
            .title_bottom(
                Line::from(format!(" Section {} of {} ", index + 1, count)).right_aligned(),
            )
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let mut lines = vec![
            Line::from(Span::styled(
                self.section.title.as_str(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(markdown_lines(&self.section.content, colors));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Minimal markdown: `#` headings, `-`/`*` bullets, `**bold**` and `` `code` ``.
pub fn markdown_lines<'t>(text: &'t str, colors: &ThemeColors) -> Vec<Line<'t>> {
    let body = Style::default().fg(colors.fg());
    text.lines()
        .map(|raw| {
            let trimmed = raw.trim_start();
            if let Some(heading) = trimmed.strip_prefix('#') {
                let heading = heading.trim_start_matches('#').trim();
                return Line::from(Span::styled(
                    heading,
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ));
            }
            let bullet = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "));
            match bullet {
                Some(rest) => {
                    let mut spans = vec![Span::styled("  \u{2022} ", Style::default().fg(colors.accent()))];
                    spans.extend(inline_spans(rest, body, colors));
                    Line::from(spans)
                }
                None => Line::from(inline_spans(raw, body, colors)),
            }
        })
        .collect()
}

fn inline_spans<'t>(text: &'t str, body: Style, colors: &ThemeColors) -> Vec<Span<'t>> {
    let bold = body.add_modifier(Modifier::BOLD);
    let code = Style::default().fg(colors.selected());

    let mut spans = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let next_bold = rest.find("**");
        let next_code = rest.find('`');
        let (start, marker, style) = match (next_bold, next_code) {
            (Some(b), Some(c)) if c < b => (c, "`", code),
            (Some(b), _) => (b, "**", bold),
            (None, Some(c)) => (c, "`", code),
            (None, None) => break,
        };
        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else {
            break;
        };
        if start > 0 {
            spans.push(Span::styled(&rest[..start], body));
        }
        spans.push(Span::styled(&after[..end], style));
        rest = &after[end + marker.len()..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest, body));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_and_code_split() {
        let colors = ThemeColors::default();
        let spans = inline_spans("a **b** c `d`", Style::default(), &colors);
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["a ", "b", " c ", "d"]);
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_unterminated_marker_left_as_text() {
        let colors = ThemeColors::default();
        let spans = inline_spans("2 ** 3", Style::default(), &colors);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "2 ** 3");
    }

    #[test]
    fn test_headings_and_bullets() {
        let colors = ThemeColors::default();
        let lines = markdown_lines("## Key idea\n- first\n* second\nplain", &colors);
        assert_eq!(plain(&lines[0]), "Key idea");
        assert_eq!(plain(&lines[1]), "  \u{2022} first");
        assert_eq!(plain(&lines[2]), "  \u{2022} second");
        assert_eq!(plain(&lines[3]), "plain");
    }
}
