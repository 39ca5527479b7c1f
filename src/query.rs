//! Filter/sort state and the list query string built from it.
//!
//! The server owns ordering and filtering; the client only describes what it
//! wants. A `QueryKey` is the identity of one listing: any change to it
//! restarts pagination from the first page.

use std::fmt;

use chrono::NaiveDate;

/// Match operator of a text filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterOperator {
    #[default]
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 4] = [
        FilterOperator::Contains,
        FilterOperator::Equals,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
    ];

    /// Wire value of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
        }
    }

    /// Human label shown in the filter editor.
    pub fn label(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "Contains",
            FilterOperator::Equals => "Equal",
            FilterOperator::StartsWith => "Starts with",
            FilterOperator::EndsWith => "Ends with",
        }
    }

    /// Next operator in editor cycling order.
    pub fn next(&self) -> FilterOperator {
        match self {
            FilterOperator::Contains => FilterOperator::Equals,
            FilterOperator::Equals => FilterOperator::StartsWith,
            FilterOperator::StartsWith => FilterOperator::EndsWith,
            FilterOperator::EndsWith => FilterOperator::Contains,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a filter entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    Text(String),
    /// Exact-date match, sent as `yyyy-mm-dd`.
    Date(NaiveDate),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Date(_) => false,
        }
    }

    /// Value as transmitted.
    pub fn to_wire(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One `(column, operator, value)` restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterEntry {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterEntry {
    pub fn text(column: &str, operator: FilterOperator, value: &str) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: FilterValue::Text(value.to_string()),
        }
    }

    /// Date filters are always exact matches.
    pub fn date(column: &str, value: NaiveDate) -> Self {
        Self {
            column: column.to_string(),
            operator: FilterOperator::Equals,
            value: FilterValue::Date(value),
        }
    }
}

/// Active filters, at most one per column, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column's filter. Replacing keeps the original position;
    /// an empty value removes the entry instead.
    pub fn set(&mut self, entry: FilterEntry) {
        if entry.value.is_empty() {
            self.remove(&entry.column);
            return;
        }
        match self.entries.iter_mut().find(|e| e.column == entry.column) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Removes the column's filter. Returns true if one was present.
    pub fn remove(&mut self, column: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.column != column);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, column: &str) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.column == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<FilterEntry> for FilterSet {
    /// Builds a set without the de-duplication of `set`, so callers can
    /// describe arbitrary (even empty-valued) entries.
    fn from_iter<I: IntoIterator<Item = FilterEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortEntry {
    pub column: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self {
            column: column.to_string(),
            direction,
        }
    }
}

/// Composite sort order, evaluated left to right, one entry per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SortSet {
    entries: Vec<SortEntry>,
}

impl SortSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole order with a single column.
    pub fn sort_only(&mut self, column: &str, direction: SortDirection) {
        self.entries.clear();
        self.entries.push(SortEntry::new(column, direction));
    }

    /// Adds a column to the composite order, or updates its direction in place.
    pub fn sort_also(&mut self, column: &str, direction: SortDirection) {
        match self.entries.iter_mut().find(|e| e.column == column) {
            Some(existing) => existing.direction = direction,
            None => self.entries.push(SortEntry::new(column, direction)),
        }
    }

    /// Removes the column from the order. Returns true if it was sorted.
    pub fn clear_column(&mut self, column: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.column != column);
        self.entries.len() != before
    }

    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SortEntry> for SortSet {
    fn from_iter<I: IntoIterator<Item = SortEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Identity of one listing. Two equal keys describe the same server result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub department: String,
    pub filters: FilterSet,
    pub sorts: SortSet,
}

impl QueryKey {
    pub fn new(department: &str) -> Self {
        Self {
            department: department.to_string(),
            ..Self::default()
        }
    }

    /// Query for the page after `continuation` (first page when `None`).
    pub fn query(&self, continuation: Option<&str>) -> String {
        build_query(continuation, &self.department, &self.filters, &self.sorts)
    }

    /// Stable textual key: the first-page query.
    pub fn cache_key(&self) -> String {
        self.query(None)
    }
}

/// Builds the list query for a page.
///
/// Without a continuation the base is the department-scoped collection path.
/// With one, the server link is reused and the department is appended unless
/// the link already carries it. Filters and sorts follow in set order.
pub fn build_query(
    continuation: Option<&str>,
    department: &str,
    filters: &FilterSet,
    sorts: &SortSet,
) -> String {
    let mut query = match continuation {
        None | Some("") => format!("/tickets?department={}", encode(department)),
        Some(token) => {
            let mut q = token.to_string();
            if !has_param(token, "department") {
                push_param(&mut q, "department", &encode(department));
            }
            q
        }
    };

    for entry in filters.iter().filter(|e| !e.value.is_empty()) {
        push_param(
            &mut query,
            &format!("queryParameters[{}][value]", entry.column),
            &encode(&entry.value.to_wire()),
        );
        push_param(
            &mut query,
            &format!("queryParameters[{}][operator]", entry.column),
            entry.operator.as_str(),
        );
    }

    for entry in sorts.iter() {
        push_param(
            &mut query,
            &format!("sortField[{}]", entry.column),
            entry.direction.as_str(),
        );
    }

    query
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn push_param(query: &mut String, name: &str, value: &str) {
    query.push(if query.contains('?') { '&' } else { '?' });
    query.push_str(name);
    query.push('=');
    query.push_str(value);
}

/// True if the query part of `link` has a parameter called `name`.
fn has_param(link: &str, name: &str) -> bool {
    link.split_once('?')
        .map(|(_, q)| {
            q.split('&')
                .any(|pair| pair.split('=').next() == Some(name))
        })
        .unwrap_or(false)
}
