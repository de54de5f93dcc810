use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Header (topic + status), progress bar, card body, footer hints.
pub struct SessionLayout {
    pub header: Rect,
    pub progress: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl SessionLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .split(area);

        let main = if area.width > 110 {
            centered_columns(vertical[2], 100)
        } else {
            vertical[2]
        };

        Self {
            header: vertical[0],
            progress: vertical[1],
            main,
            footer: vertical[3],
        }
    }
}

/// Constrain `area` to at most `max_width` columns, centered.
fn centered_columns(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    let left = area.x + (area.width - width) / 2;
    Rect::new(left, area.y, width, area.height)
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 60;
    const MIN_POPUP_HEIGHT: u16 = 14;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_hints_wraps() {
        let lines = pack_hint_lines(&["[1-4] Answer", "[Esc] Exit", "[v] Verify"], 28);
        assert_eq!(lines, vec!["  [1-4] Answer  [Esc] Exit", "  [v] Verify"]);
    }

    #[test]
    fn test_pack_hints_skips_empty() {
        let lines = pack_hint_lines(&["", "[q] Quit"], 80);
        assert_eq!(lines, vec!["  [q] Quit"]);
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let r = centered_rect(50, 50, area);
        assert_eq!(r, area);
    }

    #[test]
    fn test_session_layout_centers_wide_body() {
        let layout = SessionLayout::new(Rect::new(0, 0, 160, 40));
        assert_eq!(layout.main.width, 100);
        assert_eq!(layout.main.x, 30);
        assert_eq!(layout.header.height, 1);
    }
}
