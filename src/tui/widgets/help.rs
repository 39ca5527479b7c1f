//! Help popup with the key bindings of the current screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::detail_common::{key_hints, render_popup_block};
use crate::config::Screen;
use crate::tui::style::Theme;

const TICKET_KEYS: &[(&str, &str)] = &[
    ("↑/↓ j/k", "Move selection"),
    ("PgUp/PgDn", "Move by page"),
    ("Home/End g/G", "First / last loaded row"),
    ("←/→", "Focus column"),
    ("a / d", "Sort focused column ascending / descending"),
    ("A / D", "Add focused column to the sort"),
    ("c", "Clear sort of focused column"),
    ("f or /", "Filter focused column"),
    ("x / X", "Remove focused filter / all filters"),
    ("v", "Column menu"),
    ("h", "Hide focused column"),
    ("Enter", "Open ticket"),
    ("R", "Retry failed page"),
    ("t", "Next theme"),
    ("1 2 3", "Tickets / Sign in / Sign up"),
    ("q", "Quit"),
];

const FORM_KEYS: &[(&str, &str)] = &[
    ("Tab / ↓", "Next field"),
    ("Shift-Tab / ↑", "Previous field"),
    ("Enter", "Submit"),
    ("F2", "Show or hide passwords"),
    ("Esc", "Back to tickets"),
    ("Ctrl-C", "Quit"),
];

fn get_help_content(screen: Screen, theme: &Theme) -> (&'static str, Vec<Line<'static>>) {
    let (title, keys) = match screen {
        Screen::Tickets => ("Help: Tickets", TICKET_KEYS),
        Screen::SignIn | Screen::SignUp => ("Help: Forms", FORM_KEYS),
    };
    let mut lines: Vec<Line> = keys
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{:>16}  ", key), theme.help_key()),
                Span::raw(*what),
            ])
        })
        .collect();
    if screen == Screen::Tickets {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Filters apply 500 ms after the last keystroke. More rows load as you scroll.",
            theme.dim(),
        )));
    }
    (title, lines)
}

/// Renders the help popup centered on screen with scroll support.
pub fn render_help(frame: &mut Frame, area: Rect, screen: Screen, scroll: &mut usize, theme: &Theme) {
    let popup_width = (area.width * 60 / 100).clamp(40, 80).min(area.width);
    let popup_height = (area.height * 80 / 100).clamp(10, 30).min(area.height);
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let (title, content) = get_help_content(screen, theme);
    let content_lines = content.len();
    let inner = render_popup_block(frame, popup_area, title, theme);

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

    let visible_height = chunks[0].height as usize;
    let max_scroll = content_lines.saturating_sub(visible_height);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((*scroll as u16, 0))
        .style(theme.popup());
    frame.render_widget(paragraph, chunks[0]);

    let close = if screen == Screen::Tickets { "Esc/?" } else { "Esc/F1" };
    frame.render_widget(
        Paragraph::new(key_hints(&[("↑/↓", "scroll"), (close, "close")], theme))
            .style(theme.popup()),
        chunks[1],
    );
}
