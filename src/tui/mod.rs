//! Terminal user interface for ticketdesk.
//!
//! Three screens (tickets, sign in, sign up) share one event loop. API calls
//! run on worker threads and report back through the event channel.

mod app;
mod event;
mod input;
mod render;
mod state;
mod style;
mod widgets;

pub use app::App;
pub use event::{Event, EventHandler};
pub use state::{AppState, InputMode};
pub use style::Theme;
