//! Ticket detail popup.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};

use super::detail_common::{kv, render_popup_frame, section};
use crate::api::Ticket;
use crate::detail::{DetailLoader, DetailState};
use crate::tui::style::Theme;

/// Formats an RFC 3339 timestamp as `DD/MM/YYYY HH:mm:ss` in UTC.
pub fn format_utc_datetime(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn build_content(ticket: &Ticket, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        kv("Requester", &ticket.requester, theme),
        kv("Category", &ticket.subcategory.name, theme),
        kv("Priority", &ticket.priority, theme),
        kv(
            "Assignee",
            ticket
                .assignee
                .as_ref()
                .map(|a| a.name.as_str())
                .unwrap_or("unassigned"),
            theme,
        ),
        kv("Created", &format_utc_datetime(&ticket.created_at), theme),
        kv("Updated", &format_utc_datetime(&ticket.updated_at), theme),
        Line::from(""),
        section("Request", theme),
    ];
    lines.extend(ticket.request.lines().map(|l| Line::from(l.to_string())));

    let responses = ticket.responses.as_deref().unwrap_or_default();
    lines.push(Line::from(""));
    lines.push(section(&format!("Responses ({})", responses.len()), theme));
    if responses.is_empty() {
        lines.push(Line::from(Span::styled("No responses yet.", theme.dim())));
    }
    for response in responses {
        lines.push(Line::from(Span::styled(
            format_utc_datetime(&response.created_at),
            theme.accent(),
        )));
        lines.extend(response.inquiry.lines().map(|l| Line::from(format!("  {l}"))));
        lines.push(Line::from(""));
    }
    lines
}

/// Renders the detail popup when the loader is open.
pub fn render_ticket_detail(frame: &mut Frame, area: Rect, detail: &mut DetailLoader, theme: &Theme) {
    let (title, content) = match detail.state() {
        DetailState::Closed => return,
        DetailState::Loading { ticket_id } => (
            format!("# {ticket_id}"),
            vec![Line::from(Span::styled("Loading...", theme.dim()))],
        ),
        DetailState::Loaded(ticket) => (format!("# {}", ticket.ticket_id), build_content(ticket, theme)),
        DetailState::Failed { ticket_id, message } => (
            format!("# {ticket_id}"),
            vec![
                Line::from(Span::styled("Could not load ticket", theme.error())),
                Line::from(message.clone()),
            ],
        ),
    };
    render_popup_frame(frame, area, &title, content, &mut detail.scroll, theme);
}
