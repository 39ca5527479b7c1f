//! Incrementally growing, server-paginated list.
//!
//! `PagedList` decides *what* to fetch next and folds responses back in; it
//! never performs I/O. Every identity reset bumps a generation counter, and
//! responses tagged with an older generation are dropped so rows of two
//! different listings never mix.

use tracing::{info, warn};

use crate::api::{ApiError, Ticket, TicketPage};
use crate::query::QueryKey;

/// Where the next page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    /// Nothing fetched yet for this identity.
    Start,
    /// Server-supplied continuation link.
    Next(String),
    /// Server reported no further page.
    Exhausted,
}

/// A page fetch the caller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    /// Path or absolute link to hand to `TicketApi::list`.
    pub query: String,
}

/// Outcome of a page fetch, tagged with the generation it was issued under.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub generation: u64,
    pub result: Result<TicketPage, ApiError>,
}

/// What `PagedList::apply` did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Rows appended (count may be zero).
    Appended(usize),
    /// Result belonged to a superseded identity and was dropped.
    Stale,
    /// Fetch failed; accumulated rows untouched, same page retried next time.
    Failed,
}

/// Accumulated listing for one `QueryKey`.
#[derive(Debug)]
pub struct PagedList {
    key: QueryKey,
    generation: u64,
    items: Vec<Ticket>,
    total: Option<u64>,
    cursor: Cursor,
    in_flight: bool,
    pages_loaded: usize,
    error: Option<ApiError>,
}

impl PagedList {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            generation: 0,
            items: Vec::new(),
            total: None,
            cursor: Cursor::Start,
            in_flight: false,
            pages_loaded: 0,
            error: None,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switches to a new identity. No-op when `key` equals the current one.
    /// Returns true if the list was reset.
    pub fn reset(&mut self, key: QueryKey) -> bool {
        if key == self.key {
            return false;
        }
        self.generation += 1;
        info!(
            generation = self.generation,
            query = %key.cache_key(),
            "listing identity changed, restarting pagination"
        );
        self.key = key;
        self.items.clear();
        self.total = None;
        self.cursor = Cursor::Start;
        self.in_flight = false;
        self.pages_loaded = 0;
        self.error = None;
        true
    }

    /// True while more rows may exist on the server.
    pub fn has_more(&self) -> bool {
        if self.cursor == Cursor::Exhausted {
            return false;
        }
        match self.total {
            Some(total) => (self.items.len() as u64) < total,
            None => true,
        }
    }

    /// Claims the next page fetch. `None` while a fetch is in flight or when
    /// the listing is complete.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.in_flight || !self.has_more() {
            return None;
        }
        let continuation = match &self.cursor {
            Cursor::Start => None,
            Cursor::Next(link) => Some(link.as_str()),
            Cursor::Exhausted => return None,
        };
        let query = self.key.query(continuation);
        self.in_flight = true;
        Some(PageRequest {
            generation: self.generation,
            query,
        })
    }

    /// Folds a fetch result into the list.
    pub fn apply(&mut self, result: PageResult) -> Applied {
        if result.generation != self.generation {
            warn!(
                stale = result.generation,
                current = self.generation,
                "dropping page for superseded listing"
            );
            return Applied::Stale;
        }
        self.in_flight = false;

        match result.result {
            Ok(page) => {
                let added = page.data.len();
                self.items.extend(page.data);
                self.total = page.meta.total;
                self.pages_loaded += 1;
                self.error = None;
                self.cursor = match page.links.next {
                    Some(next) if !next.is_empty() => Cursor::Next(next),
                    _ => Cursor::Exhausted,
                };
                Applied::Appended(added)
            }
            Err(err) => {
                warn!(error = %err, "page fetch failed");
                self.error = Some(err);
                Applied::Failed
            }
        }
    }

    pub fn items(&self) -> &[Ticket] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Server-reported total, once the first page arrived.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// A fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// First page is in flight and nothing is shown yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight && self.items.is_empty()
    }

    /// Error of the last failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }
}
