//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::widgets::Block;

use crate::config::Screen;

use super::state::{AppState, InputMode, PopupState};
use super::style::Theme;
use super::widgets::{
    render_auth_form, render_column_menu, render_filter_editor, render_header, render_help,
    render_quit_confirm, render_ticket_detail, render_tickets,
};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let theme = Theme::from_name(state.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(theme.base()), area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(4),    // Content
    ])
    .split(area);

    render_header(frame, chunks[0], state, &theme);

    match state.screen {
        Screen::Tickets => render_tickets(frame, chunks[1], state, &theme),
        Screen::SignIn => render_auth_form(frame, chunks[1], &state.sign_in, &theme),
        Screen::SignUp => render_auth_form(frame, chunks[1], &state.sign_up, &theme),
    }

    if state.screen == Screen::Tickets {
        if let Some(editor) = &state.filter_editor
            && state.input_mode == InputMode::FilterEdit
        {
            render_filter_editor(frame, area, editor, state.filter_debounce.is_pending(), &theme);
        }
        if let PopupState::ColumnMenu { cursor } = state.popup {
            render_column_menu(frame, area, &state.columns, cursor, &theme);
        }
        render_ticket_detail(frame, area, &mut state.detail, &theme);
    }

    // Help popup (rendered late to overlay everything)
    if let PopupState::Help { scroll } = &mut state.popup {
        render_help(frame, area, state.screen, scroll, &theme);
    }

    // Quit confirmation popup (rendered last to overlay everything)
    if state.popup == PopupState::QuitConfirm {
        render_quit_confirm(frame, area, &theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::pager::PageResult;
    use crate::pager::tests::page;
    use crate::tui::state::tests::config;
    use crate::tui::widgets::{EMPTY_TEXT, LOADING_TEXT};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn first_page_in_flight_shows_loading_row() {
        let mut state = AppState::new(&config());
        state.list.next_request();
        let screen = draw(&mut state, 120, 20);
        assert!(screen.contains(LOADING_TEXT));
        assert!(screen.contains("Showing 0"));
    }

    #[test]
    fn empty_listing_shows_no_results() {
        let mut state = AppState::new(&config());
        let req = state.list.next_request().unwrap();
        state.list.apply(PageResult {
            generation: req.generation,
            result: Ok(page(0..0, 0, None)),
        });
        let screen = draw(&mut state, 120, 20);
        assert!(screen.contains(EMPTY_TEXT));
        assert!(screen.contains("Showing 0 from 0"));
    }

    #[test]
    fn loaded_rows_and_footer_count() {
        let mut state = AppState::new(&config());
        let req = state.list.next_request().unwrap();
        state.list.apply(PageResult {
            generation: req.generation,
            result: Ok(page(0..50, 200, Some("/tickets?page=2"))),
        });
        let screen = draw(&mut state, 140, 20);
        assert!(screen.contains("# Ticket"));
        assert!(screen.contains("requester 0"));
        assert!(screen.contains("Showing 50 from 200"));
        // Body height follows the terminal: 20 rows minus header, chips,
        // footer and table header.
        assert_eq!(state.viewport_rows, 16);
        assert!(!screen.contains("requester 49"));
    }

    #[test]
    fn page_error_is_visible() {
        let mut state = AppState::new(&config());
        let req = state.list.next_request().unwrap();
        state.list.apply(PageResult {
            generation: req.generation,
            result: Err(ApiError::Transport("connection refused".into())),
        });
        let screen = draw(&mut state, 140, 20);
        assert!(screen.contains("connection refused"));
        assert!(screen.contains("retry"));
    }

    #[test]
    fn popups_render_without_panicking_on_small_terminals() {
        let mut state = AppState::new(&config());
        state.popup = PopupState::Help { scroll: 99 };
        draw(&mut state, 30, 8);
        state.popup = PopupState::QuitConfirm;
        let screen = draw(&mut state, 30, 8);
        assert!(screen.contains("quit"));
        state.popup = PopupState::None;
        state.detail.activate("5");
        let screen = draw(&mut state, 60, 12);
        assert!(screen.contains("# 5"));
    }

    #[test]
    fn auth_form_masks_password() {
        let mut state = AppState::new(&config());
        state.switch_screen(Screen::SignIn);
        state.sign_in.set_value(crate::auth::Field::Password, "secretpass");
        let screen = draw(&mut state, 100, 24);
        assert!(screen.contains("••••••••••"));
        assert!(!screen.contains("secretpass"));
    }
}
