use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::session::state::Mode;
use crate::ui::theme::Theme;

/// Learning-depth bar: fills to the percentage of the active mode and labels
/// each stage underneath the fill.
pub struct ProgressBar<'a> {
    pub mode: Mode,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(mode: Mode, theme: &'a Theme) -> Self {
        Self { mode, theme }
    }

    fn ratio(&self) -> f64 {
        f64::from(self.mode.progress_percent()) / 100.0
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Learning Depth \u{b7} {} ", self.mode.label()))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let label = format!("{}%", self.mode.progress_percent());

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(
            label_x,
            inner.y,
            &label,
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        );
    }
}
