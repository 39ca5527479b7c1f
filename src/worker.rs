//! Runs API calls off the UI thread.
//!
//! Each job gets its own short-lived thread. Results come back through the
//! event channel the UI loop already reads, so the loop never blocks on I/O.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::api::{ApiError, AuthResponse, Credentials, Registration, Ticket, TicketApi};
use crate::detail::DetailRequest;
use crate::pager::{PageRequest, PageResult};

/// Completed API job.
#[derive(Debug, Clone)]
pub enum ApiEvent {
    Page(PageResult),
    Detail {
        request_id: u64,
        result: Result<Ticket, ApiError>,
    },
    SignIn(Result<AuthResponse, ApiError>),
    SignUp(Result<AuthResponse, ApiError>),
}

/// Spawns API jobs and posts their results as `E`.
pub struct ApiWorker<E> {
    api: Arc<dyn TicketApi>,
    tx: Sender<E>,
}

impl<E> ApiWorker<E>
where
    E: From<ApiEvent> + Send + 'static,
{
    pub fn new(api: Arc<dyn TicketApi>, tx: Sender<E>) -> Self {
        Self { api, tx }
    }

    fn spawn<F>(&self, job: &'static str, f: F)
    where
        F: FnOnce(&dyn TicketApi) -> ApiEvent + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = f(api.as_ref());
            // The receiver is gone only when the UI is shutting down.
            if tx.send(E::from(event)).is_err() {
                debug!(job, "event channel closed, dropping result");
            }
        });
    }

    pub fn fetch_page(&self, request: PageRequest) {
        self.spawn("page", move |api| {
            ApiEvent::Page(PageResult {
                generation: request.generation,
                result: api.list(&request.query),
            })
        });
    }

    pub fn fetch_detail(&self, request: DetailRequest) {
        self.spawn("detail", move |api| ApiEvent::Detail {
            request_id: request.request_id,
            result: api.ticket(&request.ticket_id),
        });
    }

    pub fn sign_in(&self, credentials: Credentials) {
        self.spawn("sign_in", move |api| ApiEvent::SignIn(api.login(&credentials)));
    }

    pub fn sign_up(&self, registration: Registration) {
        self.spawn("sign_up", move |api| {
            ApiEvent::SignUp(api.register(&registration))
        });
    }
}
