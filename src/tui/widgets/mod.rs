//! TUI widgets for ticketdesk.

mod auth_form;
mod column_menu;
pub mod detail_common;
mod filter_editor;
mod header;
mod help;
mod quit_confirm;
mod ticket_detail;
mod tickets;

pub use auth_form::render_auth_form;
pub use column_menu::render_column_menu;
pub use filter_editor::render_filter_editor;
pub use header::render_header;
pub use help::render_help;
pub use quit_confirm::render_quit_confirm;
pub use ticket_detail::render_ticket_detail;
pub use tickets::{EMPTY_TEXT, LOADING_TEXT, render_tickets};
