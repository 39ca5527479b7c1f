//! Application state management.

use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::api::Ticket;
use crate::auth::{AuthForm, AuthMode};
use crate::columns::{ColumnDef, ColumnSet, FilterKind, ticket_columns};
use crate::config::{Config, Screen, ThemeName};
use crate::debounce::{Debouncer, FILTER_DEBOUNCE};
use crate::detail::DetailLoader;
use crate::pager::PagedList;
use crate::query::{FilterEntry, FilterOperator, FilterSet, FilterValue, QueryKey, SortSet};
use crate::viewport::{PREFETCH_THRESHOLD, Virtualizer, should_fetch_more};

/// Earliest date accepted by the date filter.
pub const MIN_FILTER_DATE: (i32, u32, u32) = (1900, 1, 1);

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the filter editor of one column.
    FilterEdit,
    /// Typing into a sign-in or sign-up form.
    AuthForm,
}

/// Active popup state. Only one popup can be open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    None,
    Help {
        scroll: usize,
    },
    QuitConfirm,
    /// Column visibility menu with its cursor.
    ColumnMenu {
        cursor: usize,
    },
}

/// Filter editor of the focused column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEditor {
    pub column: String,
    pub label: String,
    pub kind: FilterKind,
    pub operator: FilterOperator,
    pub input: String,
    pub error: Option<String>,
}

impl FilterEditor {
    /// Opens an editor prefilled with the column's current entry.
    pub fn open(column: &dyn ColumnDef<Ticket>, current: Option<&FilterEntry>) -> Self {
        Self {
            column: column.id().to_string(),
            label: column.label().to_string(),
            kind: column.filter_kind(),
            operator: current.map(|e| e.operator).unwrap_or_default(),
            input: current.map(|e| e.value.to_wire()).unwrap_or_default(),
            error: None,
        }
    }

    /// Entry the current input stands for. An empty entry clears the
    /// column's filter. `Err` carries a message for invalid date input.
    pub fn entry(&self) -> Result<FilterEntry, String> {
        match self.kind {
            FilterKind::Date => {
                let input = self.input.trim();
                if input.is_empty() {
                    return Ok(FilterEntry::text(&self.column, FilterOperator::Equals, ""));
                }
                parse_filter_date(input, Local::now().date_naive())
                    .map(|date| FilterEntry::date(&self.column, date))
            }
            FilterKind::Text => Ok(FilterEntry::text(&self.column, self.operator, &self.input)),
        }
    }
}

/// Parses a `yyyy-mm-dd` date within `1900-01-01..=today`.
pub fn parse_filter_date(input: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    // chrono accepts single-digit days and months, so `2024-01-1` would
    // commit while `2024-01-15` is still being typed.
    if input.len() != 10 {
        return Err("Use yyyy-mm-dd".to_string());
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| "Use yyyy-mm-dd".to_string())?;
    let (y, m, d) = MIN_FILTER_DATE;
    let min = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
    if date < min {
        return Err("Date must be after 1900-01-01".to_string());
    }
    if date > today {
        return Err("Date cannot be in the future".to_string());
    }
    Ok(date)
}

/// Main application state.
pub struct AppState {
    pub screen: Screen,
    pub department: String,
    pub theme: ThemeName,
    pub input_mode: InputMode,
    pub popup: PopupState,

    pub columns: ColumnSet<Ticket>,
    pub filters: FilterSet,
    pub sorts: SortSet,
    pub list: PagedList,
    pub virtualizer: Virtualizer,
    /// Selected row.
    pub selected: usize,
    /// First row shown in the table body.
    pub offset: usize,
    /// Height of the table body in rows, updated by render.
    pub viewport_rows: usize,
    /// Index into the visible columns.
    pub focus_column: usize,

    pub filter_editor: Option<FilterEditor>,
    pub filter_debounce: Debouncer<FilterEntry>,
    pub detail: DetailLoader,

    pub sign_in: AuthForm,
    pub sign_up: AuthForm,

    /// One-line message in the header (errors, auth results).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let screen = config.screen;
        Self {
            screen,
            department: config.department.clone(),
            theme: config.theme,
            input_mode: if screen == Screen::Tickets {
                InputMode::Normal
            } else {
                InputMode::AuthForm
            },
            popup: PopupState::None,
            columns: ticket_columns(),
            filters: FilterSet::new(),
            sorts: SortSet::new(),
            list: PagedList::new(QueryKey::new(&config.department)),
            virtualizer: Virtualizer::default(),
            selected: 0,
            offset: 0,
            viewport_rows: 20,
            focus_column: 0,
            filter_editor: None,
            filter_debounce: Debouncer::new(FILTER_DEBOUNCE),
            detail: DetailLoader::new(),
            sign_in: AuthForm::new(AuthMode::SignIn),
            sign_up: AuthForm::new(AuthMode::SignUp),
            status_message: None,
        }
    }

    /// Identity described by the current filters and sorts.
    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            department: self.department.clone(),
            filters: self.filters.clone(),
            sorts: self.sorts.clone(),
        }
    }

    /// Resets the listing if filters or sorts changed. Returns true on reset.
    pub fn sync_query(&mut self) -> bool {
        let key = self.query_key();
        if self.list.reset(key) {
            self.selected = 0;
            self.offset = 0;
            true
        } else {
            false
        }
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.popup = PopupState::None;
        self.filter_editor = None;
        self.input_mode = match screen {
            Screen::Tickets => InputMode::Normal,
            Screen::SignIn | Screen::SignUp => InputMode::AuthForm,
        };
    }

    pub fn auth_form_mut(&mut self) -> Option<&mut AuthForm> {
        match self.screen {
            Screen::SignIn => Some(&mut self.sign_in),
            Screen::SignUp => Some(&mut self.sign_up),
            Screen::Tickets => None,
        }
    }

    pub fn auth_form(&self) -> Option<&AuthForm> {
        match self.screen {
            Screen::SignIn => Some(&self.sign_in),
            Screen::SignUp => Some(&self.sign_up),
            Screen::Tickets => None,
        }
    }

    /// Visible column under the header focus.
    pub fn focused_column(&self) -> Option<&dyn ColumnDef<Ticket>> {
        let visible = self.columns.visible();
        visible
            .get(self.focus_column.min(visible.len().saturating_sub(1)))
            .copied()
    }

    pub fn focused_column_id(&self) -> Option<String> {
        self.focused_column().map(|c| c.id().to_string())
    }

    pub fn focus_left(&mut self) {
        self.focus_column = self.focus_column.saturating_sub(1);
    }

    pub fn focus_right(&mut self) {
        let n = self.columns.visible().len();
        if self.focus_column + 1 < n {
            self.focus_column += 1;
        }
    }

    /// Keeps the header focus on an existing visible column.
    pub fn clamp_focus(&mut self) {
        let n = self.columns.visible().len();
        self.focus_column = self.focus_column.min(n.saturating_sub(1));
    }

    // --- row navigation ---------------------------------------------------

    pub fn select_up(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn select_down(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    pub fn page_up(&mut self, n: usize) {
        self.select(self.selected.saturating_sub(n));
    }

    pub fn page_down(&mut self, n: usize) {
        self.select(self.selected.saturating_add(n));
    }

    pub fn home(&mut self) {
        self.select(0);
    }

    pub fn end(&mut self) {
        self.select(self.list.len().saturating_sub(1));
    }

    /// Moves the selection, clamped to loaded rows, and scrolls it into view.
    pub fn select(&mut self, row: usize) {
        let len = self.list.len();
        self.selected = if len == 0 { 0 } else { row.min(len - 1) };
        self.ensure_visible();
    }

    pub fn ensure_visible(&mut self) {
        let rows = self.viewport_rows.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
        let max_offset = self.list.len().saturating_sub(rows);
        self.offset = self.offset.min(max_offset);
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.list.items().get(self.selected)
    }

    /// True when the visible window is close enough to the end of the loaded
    /// rows that the next page should be requested.
    pub fn wants_more(&self) -> bool {
        let metrics =
            self.virtualizer
                .metrics_for_rows(self.offset, self.viewport_rows, self.list.len());
        should_fetch_more(
            metrics,
            PREFETCH_THRESHOLD,
            self.list.is_fetching(),
            self.list.len(),
            self.list.total(),
        ) && self.list.has_more()
    }

    // --- filters ------------------------------------------------------------

    /// Opens the filter editor for the focused column.
    pub fn open_filter_editor(&mut self) -> bool {
        let Some(column) = self.focused_column() else {
            return false;
        };
        let editor = FilterEditor::open(column, self.filters.get(column.id()));
        self.filter_editor = Some(editor);
        self.input_mode = InputMode::FilterEdit;
        true
    }

    /// Re-arms the debounce with the editor's current value.
    pub fn schedule_filter(&mut self, now: Instant) {
        let Some(editor) = self.filter_editor.as_mut() else {
            return;
        };
        match editor.entry() {
            Ok(entry) => {
                editor.error = None;
                self.filter_debounce.schedule(entry, now);
            }
            Err(message) => {
                // Incomplete dates are not committed.
                editor.error = Some(message);
                self.filter_debounce.cancel();
            }
        }
    }

    /// Commits a debounced filter entry. Returns true if the filter set changed.
    pub fn commit_filter(&mut self, entry: FilterEntry) -> bool {
        let before = self.filters.clone();
        self.filters.set(entry);
        self.filters != before
    }

    /// Closes the editor, committing the pending value immediately.
    pub fn apply_filter_editor(&mut self) -> bool {
        let mut changed = false;
        if let Some(editor) = &self.filter_editor {
            match editor.entry() {
                Ok(entry) => {
                    self.filter_debounce.cancel();
                    changed = self.commit_filter(entry);
                }
                Err(message) => {
                    if let Some(editor) = self.filter_editor.as_mut() {
                        editor.error = Some(message);
                    }
                    return false;
                }
            }
        }
        self.close_filter_editor();
        changed
    }

    /// Closes the editor and drops any uncommitted edit.
    pub fn cancel_filter_editor(&mut self) {
        self.filter_debounce.cancel();
        self.close_filter_editor();
    }

    fn close_filter_editor(&mut self) {
        self.filter_editor = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn remove_focused_filter(&mut self) -> bool {
        match self.focused_column_id() {
            Some(id) => self.filters.remove(&id),
            None => false,
        }
    }

    pub fn clear_filters(&mut self) -> bool {
        let had = !self.filters.is_empty();
        self.filters.clear();
        had
    }

    /// Chip texts: `<label> <operator> <value>`.
    pub fn filter_chips(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|entry| {
                let label = self
                    .columns
                    .get(&entry.column)
                    .map(|c| c.label().to_string())
                    .unwrap_or_else(|| entry.column.clone());
                let value = match &entry.value {
                    FilterValue::Text(s) => format!("\"{s}\""),
                    FilterValue::Date(_) => entry.value.to_wire(),
                };
                format!("{} {} {}", label, entry.operator.label().to_lowercase(), value)
            })
            .collect()
    }

    pub fn any_popup_open(&self) -> bool {
        self.popup != PopupState::None || self.detail.is_open()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pager::PageResult;
    use crate::pager::tests::page;
    use std::time::Duration;

    pub(crate) fn config() -> Config {
        Config {
            api_url: "http://localhost/api".into(),
            department: "IT".into(),
            theme: ThemeName::System,
            screen: Screen::Tickets,
            timeout: None,
            log_file: None,
            verbose: 0,
        }
    }

    fn loaded(n: usize, total: u64) -> AppState {
        let mut state = AppState::new(&config());
        let req = state.list.next_request().unwrap();
        state.list.apply(PageResult {
            generation: req.generation,
            result: Ok(page(0..n, total, Some("/tickets?page=2"))),
        });
        state
    }

    #[test]
    fn date_filter_bounds() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            parse_filter_date("2024-05-31", today),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap())
        );
        assert!(parse_filter_date("1899-12-31", today).is_err());
        assert!(parse_filter_date("2024-06-02", today).is_err());
        assert!(parse_filter_date("2024-5-3x", today).is_err());
        assert!(parse_filter_date("1900-01-01", today).is_ok());
        assert!(parse_filter_date("2024-01-1", today).is_err());
        assert!(parse_filter_date("2024-1-15", today).is_err());
    }

    #[test]
    fn partially_typed_date_is_not_committed() {
        let mut state = AppState::new(&config());
        let created = state
            .columns
            .visible()
            .iter()
            .position(|c| c.id() == "created_at")
            .unwrap();
        state.focus_column = created;
        assert!(state.open_filter_editor());
        let t0 = Instant::now();
        state.filter_editor.as_mut().unwrap().input = "2024-01-1".into();
        state.schedule_filter(t0);
        assert!(state.filter_debounce.poll(t0 + Duration::from_secs(1)).is_none());
        assert!(state.filters.get("created_at").is_none());

        state.filter_editor.as_mut().unwrap().input = "2024-01-15".into();
        state.schedule_filter(t0 + Duration::from_secs(1));
        let entry = state
            .filter_debounce
            .poll(t0 + Duration::from_millis(1500))
            .unwrap();
        assert_eq!(entry.value.to_wire(), "2024-01-15");
    }

    #[test]
    fn text_filter_debounces_then_commits() {
        let mut state = AppState::new(&config());
        state.focus_column = 1; // requester
        assert!(state.open_filter_editor());
        let t0 = Instant::now();
        for c in "Jane".chars() {
            state.filter_editor.as_mut().unwrap().input.push(c);
            state.schedule_filter(t0);
        }
        assert!(state.filter_debounce.poll(t0 + Duration::from_millis(100)).is_none());
        let entry = state
            .filter_debounce
            .poll(t0 + Duration::from_millis(500))
            .unwrap();
        assert!(state.commit_filter(entry));
        assert!(state.sync_query());
        assert_eq!(
            state.list.next_request().unwrap().query,
            "/tickets?department=IT&queryParameters[requester][value]=Jane&queryParameters[requester][operator]=contains"
        );
    }

    #[test]
    fn invalid_date_is_not_scheduled() {
        let mut state = AppState::new(&config());
        let created = state
            .columns
            .visible()
            .iter()
            .position(|c| c.id() == "created_at")
            .unwrap();
        state.focus_column = created;
        assert!(state.open_filter_editor());
        state.filter_editor.as_mut().unwrap().input = "2024-13".into();
        state.schedule_filter(Instant::now());
        assert!(!state.filter_debounce.is_pending());
        assert!(state.filter_editor.as_ref().unwrap().error.is_some());

        state.filter_editor.as_mut().unwrap().input = "2024-01-15".into();
        assert!(state.apply_filter_editor());
        let entry = state.filters.get("created_at").unwrap();
        assert_eq!(entry.operator, FilterOperator::Equals);
        assert_eq!(entry.value.to_wire(), "2024-01-15");
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn editor_prefills_current_entry() {
        let mut state = AppState::new(&config());
        state.filters.set(FilterEntry::text("ticket_id", FilterOperator::StartsWith, "12"));
        state.focus_column = 0;
        state.open_filter_editor();
        let editor = state.filter_editor.as_ref().unwrap();
        assert_eq!(editor.input, "12");
        assert_eq!(editor.operator, FilterOperator::StartsWith);
    }

    #[test]
    fn chips_use_column_labels() {
        let mut state = AppState::new(&config());
        state.filters.set(FilterEntry::text("subcategory.name", FilterOperator::Equals, "VPN"));
        state.filters.set(FilterEntry::date(
            "created_at",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        ));
        assert_eq!(
            state.filter_chips(),
            vec!["Category equal \"VPN\"".to_string(), "Created equal 2024-01-15".to_string()]
        );
    }

    #[test]
    fn selection_scrolls_window() {
        let mut state = loaded(50, 200);
        state.viewport_rows = 10;
        state.page_down(15);
        assert_eq!(state.selected, 15);
        assert_eq!(state.offset, 6);
        state.end();
        assert_eq!(state.selected, 49);
        assert_eq!(state.offset, 40);
        state.home();
        assert_eq!(state.offset, 0);
    }

    #[test]
    fn prefetch_wanted_near_end_only() {
        let mut state = loaded(50, 200);
        state.viewport_rows = 10;
        assert!(!state.wants_more());
        // 35px rows: bottom gap below 300px means fewer than 9 rows left.
        state.select(45);
        assert_eq!(state.offset, 36);
        assert!(state.wants_more());
        state.list.next_request();
        assert!(!state.wants_more());
    }

    #[test]
    fn identity_change_resets_selection() {
        let mut state = loaded(50, 200);
        state.select(30);
        state.sorts.sort_only("priority", crate::query::SortDirection::Desc);
        assert!(state.sync_query());
        assert_eq!(state.selected, 0);
        assert!(state.list.is_empty());
        assert!(!state.sync_query());
    }
}
