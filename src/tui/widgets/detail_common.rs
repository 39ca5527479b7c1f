//! Shared primitives for popup widgets.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::style::Theme;

// ---------------------------------------------------------------------------
// Popup chrome
// ---------------------------------------------------------------------------

/// Returns a centered rect of given percentage within `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Centered rect of a fixed size, shrunk to fit `area`.
pub fn fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Clears `area` and draws a bordered popup block. Returns the inner area.
pub fn render_popup_block(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(theme.popup_border())
        .style(theme.popup());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Renders a scrollable popup: border, wrapped content, footer.
///
/// `scroll` is clamped to the content height.
pub fn render_popup_frame(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    content: Vec<Line<'static>>,
    scroll: &mut usize,
    theme: &Theme,
) {
    let popup_area = centered_rect(80, 85, area);
    let inner = render_popup_block(frame, popup_area, title, theme);

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

    // Estimate visual lines after wrapping (using unicode display width)
    let inner_width = chunks[0].width as usize;
    let visual_lines: usize = if inner_width > 0 {
        content
            .iter()
            .map(|line| {
                let line_width = line.width();
                if line_width == 0 {
                    1
                } else {
                    line_width.div_ceil(inner_width)
                }
            })
            .sum()
    } else {
        content.len()
    };
    let visible_height = chunks[0].height as usize;
    let max_scroll = visual_lines.saturating_sub(visible_height);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }

    let paragraph = Paragraph::new(content)
        .style(theme.popup())
        .wrap(Wrap { trim: false })
        .scroll((*scroll as u16, 0));
    frame.render_widget(paragraph, chunks[0]);

    let footer = key_hints(
        &[("↑/↓", "scroll"), ("PgUp/PgDn", "page"), ("Esc", "close")],
        theme,
    );
    frame.render_widget(Paragraph::new(footer).style(theme.popup()), chunks[1]);
}

// ---------------------------------------------------------------------------
// Content formatting
// ---------------------------------------------------------------------------

/// Section header: `── {name} ──`
pub fn section(name: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!("── {} ──", name),
        theme.section_header(),
    ))
}

/// Simple key-value line. Key is right-aligned 14 chars with colon.
pub fn kv(key: &str, value: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:>14}: ", key), theme.accent()),
        Span::raw(value.to_string()),
    ])
}

/// `key action  key action ...` hint line.
pub fn key_hints(hints: &[(&str, &str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (i, (key, action)) in hints.iter().enumerate() {
        let sep = if i + 1 < hints.len() { "  " } else { "" };
        spans.push(Span::styled(key.to_string(), theme.help_key()));
        spans.push(Span::styled(format!(" {action}{sep}"), theme.help()));
    }
    Line::from(spans)
}
