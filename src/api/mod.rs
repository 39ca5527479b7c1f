//! Remote ticket API: wire types, error type and the `TicketApi` seam.
//!
//! The TUI never talks HTTP directly. Everything goes through `TicketApi`, so
//! the worker and tests can swap the HTTP client for an in-memory fake.

mod client;
pub mod types;

pub use client::HttpTicketApi;
pub use types::{
    Assignee, AuthResponse, Credentials, PageLinks, PageMeta, Registration, Subcategory, Ticket,
    TicketPage, TicketResponse,
};

use std::collections::BTreeMap;

/// Errors returned by `TicketApi` calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Base URL or continuation link could not be turned into a URL.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
    /// Connection, TLS or timeout failure.
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-success status other than 422.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// 422 with per-field messages.
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },
    /// Body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Operations the client needs from the ticket backend.
///
/// Implementations are called from worker threads, hence `Send + Sync`.
pub trait TicketApi: Send + Sync {
    /// Fetches one page. `query` is either a path produced by
    /// `query::build_query` or a server-supplied continuation link.
    fn list(&self, query: &str) -> Result<TicketPage, ApiError>;

    /// Fetches a single ticket by id.
    fn ticket(&self, ticket_id: &str) -> Result<Ticket, ApiError>;

    fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;
}
