//! Input handling and keybindings.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::auth::AuthPayload;
use crate::columns::FilterKind;
use crate::config::Screen;
use crate::query::SortDirection;

use super::state::{AppState, InputMode, PopupState};

/// Rows moved by PgUp/PgDn.
const PAGE_STEP: usize = 20;

/// Side effect requested by a key, carried out by the app loop.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Filters or sorts changed; listing identity must be re-synced.
    QueryChanged,
    /// Selection or scroll moved; check whether more rows are needed.
    Scrolled,
    /// Retry the last failed page.
    Retry,
    /// Fetch the detail of a ticket.
    OpenDetail(String),
    /// Send a validated auth form.
    Submit(AuthPayload),
}

/// Navigation action for unified scroll/selection dispatch.
enum NavAction {
    Up,
    Down,
    PageUp(usize),
    PageDown(usize),
    Home,
    End,
}

/// Dispatches a navigation action to the open popup's scroll or the table.
fn dispatch_navigation(state: &mut AppState, action: NavAction) -> KeyAction {
    if state.detail.is_open() {
        let scroll = &mut state.detail.scroll;
        match action {
            NavAction::Up => *scroll = scroll.saturating_sub(1),
            NavAction::Down => *scroll = scroll.saturating_add(1),
            NavAction::PageUp(n) => *scroll = scroll.saturating_sub(n),
            NavAction::PageDown(n) => *scroll = scroll.saturating_add(n),
            NavAction::Home => *scroll = 0,
            NavAction::End => {} // clamped by render
        }
        return KeyAction::None;
    }
    match &mut state.popup {
        PopupState::Help { scroll } => {
            match action {
                NavAction::Up => *scroll = scroll.saturating_sub(1),
                NavAction::Down => *scroll = scroll.saturating_add(1),
                NavAction::PageUp(n) => *scroll = scroll.saturating_sub(n),
                NavAction::PageDown(n) => *scroll = scroll.saturating_add(n),
                NavAction::Home => *scroll = 0,
                NavAction::End => {}
            }
            KeyAction::None
        }
        PopupState::ColumnMenu { cursor } => {
            let last = state.columns.len().saturating_sub(1);
            *cursor = match action {
                NavAction::Up => cursor.saturating_sub(1),
                NavAction::Down => (*cursor + 1).min(last),
                NavAction::PageUp(_) | NavAction::Home => 0,
                NavAction::PageDown(_) | NavAction::End => last,
            };
            KeyAction::None
        }
        _ => {
            match action {
                NavAction::Up => state.select_up(),
                NavAction::Down => state.select_down(),
                NavAction::PageUp(n) => state.page_up(n),
                NavAction::PageDown(n) => state.page_down(n),
                NavAction::Home => state.home(),
                NavAction::End => state.end(),
            }
            KeyAction::Scrolled
        }
    }
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    if matches!(state.popup, PopupState::QuitConfirm) {
        return handle_quit_confirm(state, key);
    }
    match state.input_mode {
        InputMode::Normal => handle_normal_mode(state, key),
        InputMode::FilterEdit => handle_filter_mode(state, key, now),
        InputMode::AuthForm => handle_auth_mode(state, key),
    }
}

fn handle_quit_confirm(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('y') => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

/// Handles keys in normal mode.
fn handle_normal_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    // Popups consume Esc and their own keys first.
    if state.detail.is_open() {
        return match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                state.detail.close();
                KeyAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => dispatch_navigation(state, NavAction::Up),
            KeyCode::Down | KeyCode::Char('j') => dispatch_navigation(state, NavAction::Down),
            KeyCode::PageUp => dispatch_navigation(state, NavAction::PageUp(PAGE_STEP)),
            KeyCode::PageDown => dispatch_navigation(state, NavAction::PageDown(PAGE_STEP)),
            KeyCode::Home => dispatch_navigation(state, NavAction::Home),
            _ => KeyAction::None,
        };
    }
    match state.popup {
        PopupState::Help { .. } => {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    state.popup = PopupState::None;
                    KeyAction::None
                }
                KeyCode::Up | KeyCode::Char('k') => dispatch_navigation(state, NavAction::Up),
                KeyCode::Down | KeyCode::Char('j') => dispatch_navigation(state, NavAction::Down),
                KeyCode::PageUp => dispatch_navigation(state, NavAction::PageUp(PAGE_STEP)),
                KeyCode::PageDown => dispatch_navigation(state, NavAction::PageDown(PAGE_STEP)),
                KeyCode::Home => dispatch_navigation(state, NavAction::Home),
                _ => KeyAction::None,
            };
        }
        PopupState::ColumnMenu { cursor } => {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('q') => {
                    state.popup = PopupState::None;
                    KeyAction::None
                }
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let id = state.columns.all().nth(cursor).map(|c| c.id().to_string());
                    if let Some(id) = id
                        && !state.columns.toggle(&id)
                    {
                        state.status_message = Some("At least one column must stay visible".into());
                    }
                    state.clamp_focus();
                    KeyAction::None
                }
                KeyCode::Up | KeyCode::Char('k') => dispatch_navigation(state, NavAction::Up),
                KeyCode::Down | KeyCode::Char('j') => dispatch_navigation(state, NavAction::Down),
                KeyCode::Home => dispatch_navigation(state, NavAction::Home),
                KeyCode::End => dispatch_navigation(state, NavAction::End),
                _ => KeyAction::None,
            };
        }
        PopupState::None | PopupState::QuitConfirm => {}
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.popup = PopupState::QuitConfirm;
            KeyAction::None
        }
        KeyCode::Char('?') => {
            state.popup = PopupState::Help { scroll: 0 };
            KeyAction::None
        }
        KeyCode::Esc => {
            state.status_message = None;
            KeyAction::None
        }
        KeyCode::Char('t') => {
            state.theme = state.theme.next();
            state.status_message = Some(format!("Theme: {}", state.theme.name()));
            KeyAction::None
        }

        // Screens
        KeyCode::Char('1') => {
            state.switch_screen(Screen::Tickets);
            KeyAction::None
        }
        KeyCode::Char('2') => {
            state.switch_screen(Screen::SignIn);
            KeyAction::None
        }
        KeyCode::Char('3') => {
            state.switch_screen(Screen::SignUp);
            KeyAction::None
        }

        // Row navigation
        KeyCode::Up | KeyCode::Char('k') => dispatch_navigation(state, NavAction::Up),
        KeyCode::Down | KeyCode::Char('j') => dispatch_navigation(state, NavAction::Down),
        KeyCode::PageUp => dispatch_navigation(state, NavAction::PageUp(PAGE_STEP)),
        KeyCode::PageDown => dispatch_navigation(state, NavAction::PageDown(PAGE_STEP)),
        KeyCode::Home | KeyCode::Char('g') => dispatch_navigation(state, NavAction::Home),
        KeyCode::End | KeyCode::Char('G') => dispatch_navigation(state, NavAction::End),

        // Column focus
        KeyCode::Left => {
            state.focus_left();
            KeyAction::None
        }
        KeyCode::Right => {
            state.focus_right();
            KeyAction::None
        }

        // Sorting on the focused column
        KeyCode::Char(c @ ('a' | 'd' | 'A' | 'D')) => {
            let Some(id) = state.focused_column_id() else {
                return KeyAction::None;
            };
            let direction = if c.eq_ignore_ascii_case(&'a') {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
            if c.is_ascii_uppercase() {
                state.sorts.sort_also(&id, direction);
            } else {
                state.sorts.sort_only(&id, direction);
            }
            KeyAction::QueryChanged
        }
        KeyCode::Char('c') => match state.focused_column_id() {
            Some(id) if state.sorts.clear_column(&id) => KeyAction::QueryChanged,
            _ => KeyAction::None,
        },

        // Filters
        KeyCode::Char('f') | KeyCode::Char('/') => {
            state.open_filter_editor();
            KeyAction::None
        }
        KeyCode::Char('x') => {
            if state.remove_focused_filter() {
                KeyAction::QueryChanged
            } else {
                KeyAction::None
            }
        }
        KeyCode::Char('X') => {
            if state.clear_filters() {
                KeyAction::QueryChanged
            } else {
                KeyAction::None
            }
        }

        // Columns
        KeyCode::Char('v') => {
            state.popup = PopupState::ColumnMenu { cursor: 0 };
            KeyAction::None
        }
        KeyCode::Char('h') => {
            if let Some(id) = state.focused_column_id()
                && !state.columns.set_visible(&id, false)
            {
                state.status_message = Some("At least one column must stay visible".into());
            }
            state.clamp_focus();
            KeyAction::None
        }

        KeyCode::Enter => match state.selected_ticket() {
            Some(ticket) => KeyAction::OpenDetail(ticket.ticket_id.clone()),
            None => KeyAction::None,
        },
        KeyCode::Char('R') | KeyCode::Char('r') => KeyAction::Retry,

        _ => KeyAction::None,
    }
}

/// Handles keys while the filter editor is open.
fn handle_filter_mode(state: &mut AppState, key: KeyEvent, now: Instant) -> KeyAction {
    let Some(editor) = state.filter_editor.as_mut() else {
        state.input_mode = InputMode::Normal;
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc => {
            state.cancel_filter_editor();
            KeyAction::None
        }
        KeyCode::Enter => {
            if state.apply_filter_editor() {
                KeyAction::QueryChanged
            } else {
                KeyAction::None
            }
        }
        KeyCode::Tab if editor.kind == FilterKind::Text => {
            editor.operator = editor.operator.next();
            state.schedule_filter(now);
            KeyAction::None
        }
        KeyCode::Backspace => {
            editor.input.pop();
            state.schedule_filter(now);
            KeyAction::None
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if editor.kind == FilterKind::Date && !(c.is_ascii_digit() || c == '-') {
                return KeyAction::None;
            }
            editor.input.push(c);
            state.schedule_filter(now);
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

/// Handles keys on the sign-in and sign-up screens.
fn handle_auth_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if state.popup != PopupState::None {
        if key.code == KeyCode::Esc || key.code == KeyCode::F(1) {
            state.popup = PopupState::None;
        }
        return KeyAction::None;
    }
    if key.code == KeyCode::Esc {
        state.switch_screen(Screen::Tickets);
        return KeyAction::None;
    }
    if key.code == KeyCode::F(1) {
        state.popup = PopupState::Help { scroll: 0 };
        return KeyAction::None;
    }
    let Some(form) = state.auth_form_mut() else {
        state.input_mode = InputMode::Normal;
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            form.focus_next();
            KeyAction::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus_prev();
            KeyAction::None
        }
        KeyCode::F(2) => {
            form.show_password = !form.show_password;
            KeyAction::None
        }
        KeyCode::Backspace => {
            form.pop_char();
            KeyAction::None
        }
        KeyCode::Enter => match form.begin_submit() {
            Some(payload) => KeyAction::Submit(payload),
            None => KeyAction::None,
        },
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.push_char(c);
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Field, MSG_PASSWORD_TOO_SHORT};
    use crate::pager::PageResult;
    use crate::pager::tests::page;
    use crate::query::FilterOperator;
    use crate::tui::state::tests::config;
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(state, key(code), Instant::now())
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(&config());
        let req = state.list.next_request().unwrap();
        state.list.apply(PageResult {
            generation: req.generation,
            result: Ok(page(0..50, 200, Some("/tickets?page=2"))),
        });
        state
    }

    #[test]
    fn quit_asks_for_confirmation() {
        let mut state = AppState::new(&config());
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::None);
        assert_eq!(state.popup, PopupState::QuitConfirm);
        assert_eq!(press(&mut state, KeyCode::Esc), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);
        press(&mut state, KeyCode::Char('q'));
        assert_eq!(press(&mut state, KeyCode::Enter), KeyAction::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = AppState::new(&config());
        state.switch_screen(Screen::SignIn);
        let ev = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert_eq!(handle_key(&mut state, ev, Instant::now()), KeyAction::Quit);
    }

    #[test]
    fn sort_keys_on_focused_column() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Right); // requester
        assert_eq!(press(&mut state, KeyCode::Char('a')), KeyAction::QueryChanged);
        press(&mut state, KeyCode::Right); // category
        assert_eq!(press(&mut state, KeyCode::Char('D')), KeyAction::QueryChanged);

        let sorts: Vec<_> = state
            .sorts
            .iter()
            .map(|s| (s.column.clone(), s.direction))
            .collect();
        assert_eq!(
            sorts,
            vec![
                ("requester".to_string(), SortDirection::Asc),
                ("subcategory.name".to_string(), SortDirection::Desc),
            ]
        );

        // Sort only replaces the composite sort.
        press(&mut state, KeyCode::Char('d'));
        assert_eq!(state.sorts.len(), 1);
        assert_eq!(press(&mut state, KeyCode::Char('c')), KeyAction::QueryChanged);
        assert!(state.sorts.is_empty());
        assert_eq!(press(&mut state, KeyCode::Char('c')), KeyAction::None);
    }

    #[test]
    fn filter_editor_types_and_debounces() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Right);
        press(&mut state, KeyCode::Char('f'));
        assert_eq!(state.input_mode, InputMode::FilterEdit);

        let t0 = Instant::now();
        for c in "Jan".chars() {
            handle_key(&mut state, key(KeyCode::Char(c)), t0);
        }
        handle_key(&mut state, key(KeyCode::Tab), t0);
        assert_eq!(state.filter_editor.as_ref().unwrap().operator, FilterOperator::Equals);
        assert!(state.filters.is_empty());

        let entry = state.filter_debounce.poll(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(entry.operator, FilterOperator::Equals);
        assert_eq!(entry.value.to_wire(), "Jan");
    }

    #[test]
    fn filter_editor_enter_commits_and_esc_discards() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Char('/'));
        press(&mut state, KeyCode::Char('7'));
        assert_eq!(press(&mut state, KeyCode::Enter), KeyAction::QueryChanged);
        assert_eq!(state.filters.get("ticket_id").unwrap().value.to_wire(), "7");
        assert!(!state.filter_debounce.is_pending());

        press(&mut state, KeyCode::Char('/'));
        press(&mut state, KeyCode::Char('8'));
        assert_eq!(press(&mut state, KeyCode::Esc), KeyAction::None);
        assert!(!state.filter_debounce.is_pending());
        assert_eq!(state.filters.get("ticket_id").unwrap().value.to_wire(), "7");
    }

    #[test]
    fn date_editor_ignores_letters() {
        let mut state = AppState::new(&config());
        let created = state
            .columns
            .visible()
            .iter()
            .position(|c| c.id() == "created_at")
            .unwrap();
        state.focus_column = created;
        press(&mut state, KeyCode::Char('f'));
        press(&mut state, KeyCode::Char('x'));
        press(&mut state, KeyCode::Char('2'));
        assert_eq!(state.filter_editor.as_ref().unwrap().input, "2");
    }

    #[test]
    fn chip_removal_keys() {
        let mut state = AppState::new(&config());
        state.filters.set(crate::query::FilterEntry::text("ticket_id", FilterOperator::Contains, "1"));
        state.filters.set(crate::query::FilterEntry::text("priority", FilterOperator::Contains, "High"));
        assert_eq!(press(&mut state, KeyCode::Char('x')), KeyAction::QueryChanged);
        assert_eq!(state.filters.len(), 1);
        assert_eq!(press(&mut state, KeyCode::Char('x')), KeyAction::None);
        assert_eq!(press(&mut state, KeyCode::Char('X')), KeyAction::QueryChanged);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn navigation_reports_scroll() {
        let mut state = loaded_state();
        assert_eq!(press(&mut state, KeyCode::Down), KeyAction::Scrolled);
        assert_eq!(state.selected, 1);
        assert_eq!(press(&mut state, KeyCode::End), KeyAction::Scrolled);
        assert_eq!(state.selected, 49);
    }

    #[test]
    fn enter_opens_selected_ticket() {
        let mut state = loaded_state();
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Down);
        assert_eq!(
            press(&mut state, KeyCode::Enter),
            KeyAction::OpenDetail("2".to_string())
        );
    }

    #[test]
    fn detail_popup_captures_navigation() {
        let mut state = loaded_state();
        state.detail.activate("0");
        press(&mut state, KeyCode::Down);
        assert_eq!(state.selected, 0);
        assert_eq!(state.detail.scroll, 1);
        press(&mut state, KeyCode::Esc);
        assert!(!state.detail.is_open());
    }

    #[test]
    fn column_menu_toggles_visibility() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Char('v'));
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Char(' '));
        assert!(!state.columns.is_visible("requester"));
        press(&mut state, KeyCode::Char(' '));
        assert!(state.columns.is_visible("requester"));
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.popup, PopupState::None);
    }

    #[test]
    fn hide_focused_column() {
        let mut state = AppState::new(&config());
        let total = state.columns.len();
        state.focus_column = total - 1;
        press(&mut state, KeyCode::Char('h'));
        assert!(!state.columns.is_visible("updated_at"));
        assert_eq!(state.focus_column, total - 2);
    }

    #[test]
    fn screens_switch_with_numbers_and_escape_returns() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Char('3'));
        assert_eq!(state.screen, Screen::SignUp);
        assert_eq!(state.input_mode, InputMode::AuthForm);
        // Digits are typed into the form, not treated as screen keys.
        press(&mut state, KeyCode::Char('1'));
        assert_eq!(state.screen, Screen::SignUp);
        assert_eq!(state.sign_up.value(Field::Username), "1");
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.screen, Screen::Tickets);
    }

    #[test]
    fn short_password_submit_is_blocked() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Char('3'));
        for c in "janedoe".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "jane@example.com".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "short".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "short".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        assert_eq!(press(&mut state, KeyCode::Enter), KeyAction::None);
        assert_eq!(state.sign_up.errors.get(Field::Password), Some(MSG_PASSWORD_TOO_SHORT));
    }

    #[test]
    fn valid_sign_in_submits() {
        let mut state = AppState::new(&config());
        press(&mut state, KeyCode::Char('2'));
        for c in "jane@example.com".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "correct horse".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::F(2));
        assert!(state.sign_in.show_password);
        assert!(matches!(
            press(&mut state, KeyCode::Enter),
            KeyAction::Submit(AuthPayload::Login(_))
        ));
    }
}
