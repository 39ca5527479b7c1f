//! Header bar: screen tabs, department and status message.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::Screen;
use crate::tui::state::AppState;
use crate::tui::style::Theme;

/// Renders the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let chunks = Layout::horizontal([
        Constraint::Length(12), // Product
        Constraint::Min(30),    // Tabs
        Constraint::Length(44), // Status
    ])
    .split(area);

    frame.render_widget(
        Paragraph::new(" ticketdesk ").style(theme.header()),
        chunks[0],
    );

    let mut tabs: Vec<Span> = Screen::all()
        .iter()
        .enumerate()
        .flat_map(|(i, screen)| {
            let style = if *screen == state.screen {
                theme.tab_active()
            } else {
                theme.tab_inactive()
            };
            vec![
                Span::styled(format!(" {}:", i + 1), theme.tab_inactive()),
                Span::styled(format!("{} ", screen.name()), style),
            ]
        })
        .collect();
    tabs.push(Span::styled(
        format!(" [{}]", state.department),
        theme.tab_inactive(),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(tabs)).style(theme.header()),
        chunks[1],
    );

    let (right, style) = match &state.status_message {
        Some(msg) => (msg.clone(), theme.header().fg(theme.warning)),
        None => (format!("theme: {} ", state.theme.name()), theme.header()),
    };
    frame.render_widget(
        Paragraph::new(right)
            .style(style)
            .alignment(ratatui::layout::Alignment::Right),
        chunks[2],
    );
}
