//! Quit confirmation popup widget.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::detail_common::render_popup_block;
use crate::tui::style::Theme;

/// Renders a centered quit confirmation popup.
pub fn render_quit_confirm(frame: &mut Frame, area: Rect, theme: &Theme) {
    // 50% width, fixed height, clamped.
    let popup_width = (area.width * 50 / 100).clamp(40, 60).min(area.width);
    let popup_height = area.height.clamp(7, 9).min(area.height);

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let inner = render_popup_block(frame, popup_area, "Exit ticketdesk", theme);

    let content = vec![
        Line::from("Are you sure you want to quit?"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", theme.help_key()),
            Span::styled(" or ", theme.help()),
            Span::styled("q", theme.help_key()),
            Span::styled(" → quit", theme.help()),
        ]),
        Line::from(vec![
            Span::styled("Esc", theme.help_key()),
            Span::styled(" or ", theme.help()),
            Span::styled("n", theme.help_key()),
            Span::styled(" → cancel", theme.help()),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .style(theme.popup());
    frame.render_widget(paragraph, inner);
}
