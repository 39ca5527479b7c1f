//! Tickets screen: filter chips, virtualized table and status footer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};

use crate::tui::state::AppState;
use crate::tui::style::Theme;

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_TEXT: &str = "No results.";

/// Renders the tickets screen into `area`.
pub fn render_tickets(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Chips
        Constraint::Min(3),    // Table
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_chips(frame, chunks[0], state, theme);
    render_table(frame, chunks[1], state, theme);
    render_footer(frame, chunks[2], state, theme);
}

fn render_chips(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let chips = state.filter_chips();
    let mut spans = vec![Span::styled(" Filters: ", theme.dim())];
    if chips.is_empty() {
        spans.push(Span::styled("none (f to add)", theme.dim()));
    }
    for chip in chips {
        spans.push(Span::styled(format!(" {chip} ✕ "), theme.chip()));
        spans.push(Span::raw(" "));
    }
    if !state.sorts.is_empty() {
        spans.push(Span::styled("  Sort: ", theme.dim()));
        let sorts: Vec<String> = state
            .sorts
            .iter()
            .map(|s| {
                let label = state
                    .columns
                    .get(&s.column)
                    .map(|c| c.label().to_string())
                    .unwrap_or_else(|| s.column.clone());
                format!("{} {}", label, s.direction.arrow())
            })
            .collect();
        spans.push(Span::styled(sorts.join(", "), theme.accent()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.base()), area);
}

fn header_cell(state: &AppState, id: &str, title: &str) -> String {
    let mut text = title.to_string();
    if let Some(direction) = state.sorts.direction_of(id) {
        text.push(' ');
        text.push_str(direction.arrow());
        if state.sorts.len() > 1
            && let Some(pos) = state.sorts.iter().position(|s| s.column == id)
        {
            text.push_str(&(pos + 1).to_string());
        }
    }
    if state.filters.get(id).is_some() {
        text.push_str(" ⊛");
    }
    text
}

fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    // One line of header, the rest is the body.
    state.viewport_rows = area.height.saturating_sub(1).max(1) as usize;
    state.ensure_visible();

    let focused = state.focused_column_id();
    let visible = state.columns.visible();

    let widths: Vec<Constraint> = visible
        .iter()
        .map(|c| match c.width() {
            Some(w) => Constraint::Length(w),
            None => Constraint::Fill(1),
        })
        .collect();

    let header = Row::new(visible.iter().map(|c| {
        let style = if focused.as_deref() == Some(c.id()) {
            theme.focused_header()
        } else {
            theme.table_header()
        };
        Cell::from(header_cell(state, c.id(), c.title())).style(style)
    }))
    .style(theme.table_header());

    let list = &state.list;
    let mut table_state = TableState::default();
    let message = if list.is_loading() {
        Some((LOADING_TEXT.to_string(), theme.dim()))
    } else if list.is_empty() {
        Some(match list.error() {
            Some(err) => (format!("Failed to load tickets: {err}"), theme.error()),
            None => (EMPTY_TEXT.to_string(), theme.dim()),
        })
    } else {
        None
    };

    let rows: Vec<Row> = if message.is_some() {
        Vec::new()
    } else {
        let v = state.virtualizer;
        let window = v.window(
            v.total_size(state.offset),
            v.total_size(state.viewport_rows),
            list.len(),
        );
        let mut rows: Vec<Row> = list.items()[window.clone()]
            .iter()
            .map(|ticket| Row::new(visible.iter().map(|c| Cell::from(c.render(ticket)))))
            .collect();
        if window.end == list.len() && list.is_fetching() {
            rows.push(Row::new([Cell::from(LOADING_TEXT)]).style(theme.dim()));
        }
        table_state = table_state
            .with_offset(state.offset.saturating_sub(window.start))
            .with_selected(Some(state.selected.saturating_sub(window.start)));
        rows
    };

    let table = Table::new(rows, widths)
        .header(header)
        .style(theme.base())
        .column_spacing(1)
        .row_highlight_style(theme.selected().add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(table, area, &mut table_state);

    // Status rows span the whole body rather than the first column.
    if let Some((text, style)) = message {
        let body = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        };
        frame.render_widget(Paragraph::new(format!(" {text}")).style(style), body);
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let list = &state.list;
    let shown = match list.total() {
        Some(total) => format!(" Showing {} from {}", list.len(), total),
        None => format!(" Showing {}", list.len()),
    };
    let mut spans = vec![Span::styled(shown, theme.base())];
    if list.is_fetching() {
        spans.push(Span::styled("  loading…", theme.dim()));
    }
    if let Some(err) = list.error() {
        spans.push(Span::styled(format!("  {err}"), theme.error()));
        spans.push(Span::styled("  R", theme.help_key()));
        spans.push(Span::styled(" retry", theme.help()));
    }
    spans.push(Span::styled("   ?", theme.help_key()));
    spans.push(Span::styled(" help", theme.help()));
    frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.base()), area);
}
