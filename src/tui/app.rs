//! Main TUI application.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info};

use crate::api::TicketApi;
use crate::auth::AuthPayload;
use crate::config::{Config, Screen};
use crate::pager::Applied;
use crate::worker::{ApiEvent, ApiWorker};

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::AppState;

/// Main TUI application.
pub struct App {
    api: Arc<dyn TicketApi>,
    state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn TicketApi>, config: &Config) -> Self {
        Self {
            api,
            state: AppState::new(config),
            should_quit: false,
        }
    }

    /// Runs the TUI application.
    pub fn run(mut self, tick_rate: Duration) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let events = EventHandler::new(tick_rate);
        let worker = ApiWorker::new(Arc::clone(&self.api), events.sender());

        // Initial page
        self.fetch_next(&worker);

        let mut body_rows = self.state.viewport_rows;
        let result = loop {
            if let Err(e) = terminal.draw(|frame| render(frame, &mut self.state)) {
                break Err(e);
            }
            // Render sets the body height; a taller window may need more rows.
            if self.state.viewport_rows != body_rows {
                body_rows = self.state.viewport_rows;
                self.prefetch(&worker);
            }

            match events.next() {
                Ok(event) => self.handle_event(event, &worker, Instant::now()),
                Err(_) => self.should_quit = true,
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    pub(crate) fn handle_event(&mut self, event: Event, worker: &ApiWorker<Event>, now: Instant) {
        match event {
            Event::Tick => {
                if let Some(entry) = self.state.filter_debounce.poll(now)
                    && self.state.commit_filter(entry)
                {
                    self.refresh(worker);
                }
            }
            Event::Key(key) => {
                let action = handle_key(&mut self.state, key, now);
                self.apply_action(action, worker);
            }
            Event::Resize(_, _) => self.prefetch(worker),
            Event::Api(api_event) => self.apply_api_event(api_event, worker),
        }
    }

    fn apply_action(&mut self, action: KeyAction, worker: &ApiWorker<Event>) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::QueryChanged => self.refresh(worker),
            KeyAction::Scrolled => self.prefetch(worker),
            KeyAction::Retry => {
                if self.state.list.error().is_some() || self.state.list.is_empty() {
                    self.fetch_next(worker);
                }
            }
            KeyAction::OpenDetail(ticket_id) => {
                let request = self.state.detail.activate(&ticket_id);
                worker.fetch_detail(request);
            }
            KeyAction::Submit(AuthPayload::Login(credentials)) => worker.sign_in(credentials),
            KeyAction::Submit(AuthPayload::Register(registration)) => {
                worker.sign_up(registration)
            }
        }
    }

    fn apply_api_event(&mut self, event: ApiEvent, worker: &ApiWorker<Event>) {
        match event {
            ApiEvent::Page(result) => match self.state.list.apply(result) {
                Applied::Appended(n) => {
                    debug!(added = n, loaded = self.state.list.len(), "page appended");
                    self.prefetch(worker);
                }
                Applied::Failed => {
                    if let Some(err) = self.state.list.error() {
                        self.state.status_message = Some(format!("Loading tickets failed: {err}"));
                    }
                }
                Applied::Stale => {}
            },
            ApiEvent::Detail { request_id, result } => {
                self.state.detail.resolve(request_id, result);
            }
            ApiEvent::SignIn(result) => {
                let message = self.state.sign_in.finish(result);
                self.finish_auth(message);
            }
            ApiEvent::SignUp(result) => {
                let message = self.state.sign_up.finish(result);
                self.finish_auth(message);
            }
        }
    }

    fn finish_auth(&mut self, message: Option<String>) {
        if let Some(message) = message {
            info!(%message, "auth completed");
            self.state.status_message = Some(message);
            self.state.switch_screen(Screen::Tickets);
        }
    }

    /// Re-syncs the listing identity and starts over when it changed.
    fn refresh(&mut self, worker: &ApiWorker<Event>) {
        if self.state.sync_query() {
            self.fetch_next(worker);
        }
    }

    /// Requests the next page when the view is close to the end.
    fn prefetch(&mut self, worker: &ApiWorker<Event>) {
        if self.state.screen == Screen::Tickets && self.state.wants_more() {
            self.fetch_next(worker);
        }
    }

    fn fetch_next(&mut self, worker: &ApiWorker<Event>) {
        if let Some(request) = self.state.list.next_request() {
            worker.fetch_page(request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver};

    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    use crate::pager::tests::page;
    use crate::tui::state::tests::config;
    use crate::worker::tests::FakeApi;

    const WAIT: Duration = Duration::from_secs(5);

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn setup(api: Arc<FakeApi>) -> (App, ApiWorker<Event>, Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        let worker = ApiWorker::new(api.clone() as Arc<dyn TicketApi>, tx);
        (App::new(api, &config()), worker, rx)
    }

    /// Feeds the next worker result back into the app.
    fn pump(app: &mut App, worker: &ApiWorker<Event>, rx: &Receiver<Event>) {
        let event = rx.recv_timeout(WAIT).unwrap();
        app.handle_event(event, worker, Instant::now());
    }

    #[test]
    fn scrolling_to_the_end_fetches_the_next_page_once() {
        let api = Arc::new(FakeApi::default());
        {
            let mut pages = api.pages.lock().unwrap();
            pages.insert(
                "/tickets?department=IT".into(),
                page(0..50, 200, Some("/tickets?page=2")),
            );
            pages.insert(
                "/tickets?page=2&department=IT".into(),
                page(50..100, 200, Some("/tickets?page=3")),
            );
        }
        let (mut app, worker, rx) = setup(api.clone());
        app.state.viewport_rows = 10;

        app.fetch_next(&worker);
        pump(&mut app, &worker, &rx);
        assert_eq!(app.state.list.len(), 50);
        assert_eq!(api.calls.lock().unwrap().len(), 1);

        // Repeated scroll events near the bottom issue a single request.
        app.handle_event(key(KeyCode::End), &worker, Instant::now());
        app.handle_event(key(KeyCode::Up), &worker, Instant::now());
        app.handle_event(key(KeyCode::Down), &worker, Instant::now());
        pump(&mut app, &worker, &rx);
        assert_eq!(app.state.list.len(), 100);
        assert_eq!(
            api.calls.lock().unwrap().as_slice(),
            ["/tickets?department=IT", "/tickets?page=2&department=IT"]
        );
    }

    #[test]
    fn filter_commits_after_debounce_and_restarts_listing() {
        let api = Arc::new(FakeApi::default());
        let filtered = "/tickets?department=IT&queryParameters[requester][value]=Jane&queryParameters[requester][operator]=contains";
        {
            let mut pages = api.pages.lock().unwrap();
            pages.insert(
                "/tickets?department=IT".into(),
                page(0..50, 200, Some("/tickets?page=2")),
            );
            pages.insert(filtered.into(), page(0..3, 3, None));
        }
        let (mut app, worker, rx) = setup(api.clone());
        app.fetch_next(&worker);
        pump(&mut app, &worker, &rx);

        let t0 = Instant::now();
        app.handle_event(key(KeyCode::Right), &worker, t0);
        app.handle_event(key(KeyCode::Char('f')), &worker, t0);
        for c in "Jane".chars() {
            app.handle_event(key(KeyCode::Char(c)), &worker, t0);
        }
        app.handle_event(Event::Tick, &worker, t0 + Duration::from_millis(200));
        assert_eq!(app.state.list.len(), 50);

        app.handle_event(Event::Tick, &worker, t0 + Duration::from_millis(500));
        assert!(app.state.list.is_empty());
        assert!(app.state.list.is_loading());
        pump(&mut app, &worker, &rx);
        assert_eq!(app.state.list.len(), 3);
        assert_eq!(app.state.list.total(), Some(3));
        assert_eq!(api.calls.lock().unwrap().last().map(String::as_str), Some(filtered));
    }

    #[test]
    fn failed_page_is_retried_with_r() {
        let api = Arc::new(FakeApi::default());
        let (mut app, worker, rx) = setup(api.clone());
        app.fetch_next(&worker);
        pump(&mut app, &worker, &rx);
        assert!(app.state.list.error().is_some());
        assert!(app.state.status_message.is_some());

        api.pages
            .lock()
            .unwrap()
            .insert("/tickets?department=IT".into(), page(0..5, 5, None));
        app.handle_event(key(KeyCode::Char('R')), &worker, Instant::now());
        pump(&mut app, &worker, &rx);
        assert_eq!(app.state.list.len(), 5);
        assert!(app.state.list.error().is_none());
    }

    #[test]
    fn opening_a_row_loads_its_detail() {
        let api = Arc::new(FakeApi::default());
        api.pages
            .lock()
            .unwrap()
            .insert("/tickets?department=IT".into(), page(0..5, 5, None));
        let (mut app, worker, rx) = setup(api);
        app.fetch_next(&worker);
        pump(&mut app, &worker, &rx);

        app.handle_event(key(KeyCode::Down), &worker, Instant::now());
        app.handle_event(key(KeyCode::Enter), &worker, Instant::now());
        assert!(app.state.detail.is_open());
        pump(&mut app, &worker, &rx);
        match app.state.detail.state() {
            crate::detail::DetailState::Loaded(t) => assert_eq!(t.ticket_id, "1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn successful_sign_in_returns_to_tickets() {
        let api = Arc::new(FakeApi::default());
        let (mut app, worker, rx) = setup(api);
        app.handle_event(key(KeyCode::Char('2')), &worker, Instant::now());
        for c in "jane@example.com".chars() {
            app.handle_event(key(KeyCode::Char(c)), &worker, Instant::now());
        }
        app.handle_event(key(KeyCode::Tab), &worker, Instant::now());
        for c in "correct horse".chars() {
            app.handle_event(key(KeyCode::Char(c)), &worker, Instant::now());
        }
        app.handle_event(key(KeyCode::Enter), &worker, Instant::now());
        assert!(app.state.sign_in.submitting);
        pump(&mut app, &worker, &rx);
        assert_eq!(app.state.screen, Screen::Tickets);
        assert_eq!(app.state.status_message.as_deref(), Some("Welcome"));
    }

    #[test]
    fn rejected_sign_up_stays_on_form() {
        let api = Arc::new(FakeApi::default());
        let (mut app, worker, rx) = setup(api);
        app.state.switch_screen(Screen::SignUp);
        app.state.sign_up.set_value(crate::auth::Field::Username, "janedoe");
        app.state.sign_up.set_value(crate::auth::Field::Email, "jane@example.com");
        app.state.sign_up.set_value(crate::auth::Field::Password, "correct horse");
        app.state
            .sign_up
            .set_value(crate::auth::Field::PasswordConfirmation, "correct horse");
        app.handle_event(key(KeyCode::Enter), &worker, Instant::now());
        pump(&mut app, &worker, &rx);
        assert_eq!(app.state.screen, Screen::SignUp);
        assert_eq!(
            app.state.sign_up.errors.get(crate::auth::Field::Email),
            Some("taken")
        );
    }
}
