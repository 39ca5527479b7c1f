//! ticketdesk - terminal client for a support ticket service.
//!
//! The library holds everything except process setup:
//! - `api` - wire types and the blocking HTTP client
//! - `query`, `pager`, `viewport`, `debounce`, `columns`, `detail` - the
//!   remote data-table model, independent of any UI
//! - `auth` - sign-in and sign-up form validation
//! - `worker` - runs API calls off the UI thread
//! - `tui` - ratatui screens and the event loop

pub mod api;
pub mod auth;
pub mod columns;
pub mod config;
pub mod debounce;
pub mod detail;
pub mod pager;
pub mod query;
pub mod tui;
pub mod viewport;
pub mod worker;
