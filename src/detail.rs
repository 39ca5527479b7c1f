//! Ticket detail overlay state.
//!
//! Each activation gets a fresh request id; only the result carrying the
//! latest id is applied, so the last activated row always wins regardless of
//! the order responses arrive in.

use tracing::{debug, warn};

use crate::api::{ApiError, Ticket};

/// A detail fetch the caller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub request_id: u64,
    pub ticket_id: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Closed,
    Loading {
        ticket_id: String,
    },
    Loaded(Box<Ticket>),
    Failed {
        ticket_id: String,
        message: String,
    },
}

#[derive(Debug, Default)]
pub struct DetailLoader {
    latest: u64,
    state: DetailState,
    /// Scroll offset of the overlay content.
    pub scroll: usize,
}

impl DetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the overlay for `ticket_id` and supersedes any pending fetch.
    pub fn activate(&mut self, ticket_id: &str) -> DetailRequest {
        self.latest += 1;
        self.scroll = 0;
        self.state = DetailState::Loading {
            ticket_id: ticket_id.to_string(),
        };
        DetailRequest {
            request_id: self.latest,
            ticket_id: ticket_id.to_string(),
        }
    }

    /// Applies a fetch result. Returns false if it was superseded or the
    /// overlay was closed in the meantime.
    pub fn resolve(&mut self, request_id: u64, result: Result<Ticket, ApiError>) -> bool {
        if request_id != self.latest || !self.is_open() {
            debug!(request_id, latest = self.latest, "ignoring superseded detail response");
            return false;
        }
        self.state = match result {
            Ok(ticket) => DetailState::Loaded(Box::new(ticket)),
            Err(err) => {
                warn!(error = %err, "ticket detail fetch failed");
                let ticket_id = match &self.state {
                    DetailState::Loading { ticket_id } => ticket_id.clone(),
                    _ => String::new(),
                };
                DetailState::Failed {
                    ticket_id,
                    message: err.to_string(),
                }
            }
        };
        true
    }

    pub fn close(&mut self) {
        self.state = DetailState::Closed;
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DetailState::Closed)
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }
}
