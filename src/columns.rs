//! Column model: declarative descriptors for table columns.
//!
//! A column knows how to read its value from a row, how to display it and
//! which kind of filter input it accepts. The model is independent of any
//! rendering framework; widths are hints in terminal cells.

use std::collections::HashSet;

use chrono::{DateTime, Local};

use crate::api::Ticket;

/// How a cell value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Single line; embedded newlines are flattened.
    Text,
    /// ISO timestamp shown as local date-time.
    Date,
}

/// Filter input offered by a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Free text with a selectable match operator.
    Text,
    /// Exact calendar day.
    Date,
}

/// Capability of one table column over rows of type `R`.
pub trait ColumnDef<R> {
    /// Identifier sent to the server in filter and sort parameters.
    fn id(&self) -> &str;
    /// Header text.
    fn title(&self) -> &str;
    /// Short name used in chips and the column menu.
    fn label(&self) -> &str;
    /// Raw value of the cell, if any.
    fn value(&self, row: &R) -> Option<String>;
    /// Display text of the cell.
    fn render(&self, row: &R) -> String;
    fn filter_kind(&self) -> FilterKind;
    /// Fixed width in cells; `None` takes the remaining space.
    fn width(&self) -> Option<u16>;
}

/// Function-pointer backed column.
pub struct Column<R> {
    pub id: &'static str,
    pub title: &'static str,
    pub label: &'static str,
    pub accessor: fn(&R) -> Option<String>,
    pub cell: CellKind,
    pub filter: FilterKind,
    pub width: Option<u16>,
}

impl<R> ColumnDef<R> for Column<R> {
    fn id(&self) -> &str {
        self.id
    }

    fn title(&self) -> &str {
        self.title
    }

    fn label(&self) -> &str {
        self.label
    }

    fn value(&self, row: &R) -> Option<String> {
        (self.accessor)(row)
    }

    fn render(&self, row: &R) -> String {
        match self.value(row) {
            None => String::new(),
            Some(v) => match self.cell {
                CellKind::Text => single_line(&v),
                CellKind::Date => format_local_datetime(&v),
            },
        }
    }

    fn filter_kind(&self) -> FilterKind {
        self.filter
    }

    fn width(&self) -> Option<u16> {
        self.width
    }
}

/// Ordered columns plus per-column visibility.
pub struct ColumnSet<R> {
    columns: Vec<Box<dyn ColumnDef<R>>>,
    hidden: HashSet<String>,
}

impl<R> ColumnSet<R> {
    pub fn new(columns: Vec<Box<dyn ColumnDef<R>>>) -> Self {
        Self {
            columns,
            hidden: HashSet::new(),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn ColumnDef<R>> {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub fn visible(&self) -> Vec<&dyn ColumnDef<R>> {
        self.all().filter(|c| !self.hidden.contains(c.id())).collect()
    }

    pub fn get(&self, id: &str) -> Option<&dyn ColumnDef<R>> {
        self.all().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        !self.hidden.contains(id)
    }

    /// Shows or hides a column. The last visible column cannot be hidden.
    /// Returns true if visibility changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if visible {
            return self.hidden.remove(id);
        }
        if self.is_visible(id) && self.visible().len() <= 1 {
            return false;
        }
        self.hidden.insert(id.to_string())
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let visible = self.is_visible(id);
        self.set_visible(id, !visible)
    }
}

/// The ticket listing columns.
pub fn ticket_columns() -> ColumnSet<Ticket> {
    let columns: Vec<Box<dyn ColumnDef<Ticket>>> = vec![
        Box::new(Column {
            id: "ticket_id",
            title: "# Ticket",
            label: "Ticket",
            accessor: |t: &Ticket| Some(t.ticket_id.clone()),
            cell: CellKind::Text,
            filter: FilterKind::Text,
            width: Some(10),
        }),
        Box::new(Column {
            id: "requester",
            title: "Requester",
            label: "Requester",
            accessor: |t: &Ticket| Some(t.requester.clone()),
            cell: CellKind::Text,
            filter: FilterKind::Text,
            width: Some(20),
        }),
        Box::new(Column {
            id: "subcategory.name",
            title: "Category",
            label: "Category",
            accessor: |t: &Ticket| Some(t.subcategory.name.clone()),
            cell: CellKind::Text,
            filter: FilterKind::Text,
            width: Some(16),
        }),
        Box::new(Column {
            id: "request",
            title: "Request",
            label: "Request",
            accessor: |t: &Ticket| Some(t.request.clone()),
            cell: CellKind::Text,
            filter: FilterKind::Text,
            width: None,
        }),
        Box::new(Column {
            id: "priority",
            title: "Priority",
            label: "Priority",
            accessor: |t: &Ticket| Some(t.priority.clone()),
            cell: CellKind::Text,
            filter: FilterKind::Text,
            width: Some(10),
        }),
        Box::new(Column {
            id: "assignee.name",
            title: "Assignee",
            label: "Assignee",
            accessor: |t: &Ticket| t.assignee.as_ref().map(|a| a.name.clone()),
            cell: CellKind::Text,
            filter: FilterKind::Text,
            width: Some(16),
        }),
        Box::new(Column {
            id: "created_at",
            title: "Created at",
            label: "Created",
            accessor: |t: &Ticket| Some(t.created_at.clone()),
            cell: CellKind::Date,
            filter: FilterKind::Date,
            width: Some(19),
        }),
        Box::new(Column {
            id: "updated_at",
            title: "Last update",
            label: "Last update",
            accessor: |t: &Ticket| Some(t.updated_at.clone()),
            cell: CellKind::Date,
            filter: FilterKind::Date,
            width: Some(19),
        }),
    ];
    ColumnSet::new(columns)
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Formats an RFC 3339 timestamp in local time; unparsable input is returned as is.
pub fn format_local_datetime(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::tests::ticket;

    #[test]
    fn ticket_columns_have_unique_ids() {
        let cols = ticket_columns();
        let ids: HashSet<&str> = cols.all().map(|c| c.id()).collect();
        assert_eq!(ids.len(), cols.len());
    }

    #[test]
    fn date_columns_offer_date_filter() {
        let cols = ticket_columns();
        assert_eq!(cols.get("created_at").unwrap().filter_kind(), FilterKind::Date);
        assert_eq!(cols.get("requester").unwrap().filter_kind(), FilterKind::Text);
    }

    #[test]
    fn nested_accessors_read_through() {
        let cols = ticket_columns();
        let mut t = ticket("42");
        assert_eq!(cols.get("subcategory.name").unwrap().render(&t), "Accounts");
        assert_eq!(cols.get("assignee.name").unwrap().render(&t), "");

        t.assignee = Some(crate::api::Assignee {
            id: "3".into(),
            name: "Alice".into(),
        });
        assert_eq!(cols.get("assignee.name").unwrap().render(&t), "Alice");
    }

    #[test]
    fn ticket_id_renders_verbatim() {
        let cols = ticket_columns();
        let t = ticket("0001234");
        assert_eq!(cols.get("ticket_id").unwrap().render(&t), "0001234");
    }

    #[test]
    fn text_cells_are_single_line() {
        let cols = ticket_columns();
        let mut t = ticket("1");
        t.request = "line one\nline two\n\n  end".into();
        assert_eq!(cols.get("request").unwrap().render(&t), "line one line two end");
    }

    #[test]
    fn date_cells_fall_back_to_raw_text() {
        assert_eq!(format_local_datetime("yesterday"), "yesterday");
        let shown = format_local_datetime("2024-03-01T10:15:00.000000Z");
        assert_eq!(shown.len(), "2024-03-01 10:15:00".len());
    }

    #[test]
    fn visibility_toggles_but_keeps_one_column() {
        let mut cols = ticket_columns();
        assert!(cols.toggle("request"));
        assert!(!cols.is_visible("request"));
        assert_eq!(cols.visible().len(), cols.len() - 1);
        assert!(cols.toggle("request"));
        assert!(cols.is_visible("request"));

        let ids: Vec<String> = cols.all().map(|c| c.id().to_string()).collect();
        for id in &ids[1..] {
            assert!(cols.set_visible(id, false));
        }
        assert!(!cols.set_visible(&ids[0], false));
        assert_eq!(cols.visible().len(), 1);
    }

    #[test]
    fn unknown_column_is_ignored() {
        let mut cols = ticket_columns();
        assert!(!cols.toggle("nope"));
    }
}
