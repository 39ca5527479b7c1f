//! Filter editor popup for one column.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::detail_common::{fixed_rect, key_hints, render_popup_block};
use crate::columns::FilterKind;
use crate::query::FilterOperator;
use crate::tui::state::FilterEditor;
use crate::tui::style::Theme;

/// Renders the filter editor centered in `area`.
pub fn render_filter_editor(frame: &mut Frame, area: Rect, editor: &FilterEditor, pending: bool, theme: &Theme) {
    let popup_area = fixed_rect(60, 10, area);
    let title = format!("Filter: {}", editor.label);
    let inner = render_popup_block(frame, popup_area, &title, theme);

    let mut lines = Vec::new();
    match editor.kind {
        FilterKind::Date => {
            lines.push(Line::from(Span::styled(
                "Exact day (yyyy-mm-dd), 1900-01-01 to today",
                theme.dim(),
            )));
        }
        FilterKind::Text => {
            let mut ops = vec![Span::styled("Operator: ", theme.dim())];
            for op in FilterOperator::ALL {
                let style = if op == editor.operator {
                    theme.tab_active()
                } else {
                    theme.dim()
                };
                ops.push(Span::styled(format!("[{}]", op.label()), style));
                ops.push(Span::raw(" "));
            }
            lines.push(Line::from(ops));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Value: ", theme.warning()),
        Span::styled(format!("{}█", editor.input), theme.input()),
    ]));

    lines.push(Line::from(""));
    match &editor.error {
        Some(err) => lines.push(Line::from(Span::styled(err.clone(), theme.error()))),
        None if pending => lines.push(Line::from(Span::styled("applying…", theme.dim()))),
        None => lines.push(Line::from("")),
    }

    let mut hints = vec![("Enter", "apply"), ("Esc", "cancel")];
    if editor.kind == FilterKind::Text {
        hints.insert(0, ("Tab", "operator"));
    }
    lines.push(key_hints(&hints, theme));

    frame.render_widget(
        Paragraph::new(lines)
            .style(theme.popup())
            .wrap(Wrap { trim: true }),
        inner,
    );
}
