//! Column visibility menu.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::detail_common::{fixed_rect, key_hints, render_popup_block};
use crate::api::Ticket;
use crate::columns::ColumnSet;
use crate::tui::style::Theme;

pub fn render_column_menu(
    frame: &mut Frame,
    area: Rect,
    columns: &ColumnSet<Ticket>,
    cursor: usize,
    theme: &Theme,
) {
    let height = columns.len() as u16 + 4;
    let popup_area = fixed_rect(36, height, area);
    let inner = render_popup_block(frame, popup_area, "Columns", theme);

    let mut lines: Vec<Line> = columns
        .all()
        .enumerate()
        .map(|(i, c)| {
            let mark = if columns.is_visible(c.id()) { "[x]" } else { "[ ]" };
            let style = if i == cursor {
                theme.selected()
            } else {
                theme.popup()
            };
            Line::from(Span::styled(format!(" {mark} {}", c.label()), style))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(key_hints(&[("Space", "toggle"), ("Esc", "close")], theme));

    frame.render_widget(Paragraph::new(lines).style(theme.popup()), inner);
}
