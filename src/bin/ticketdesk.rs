//! ticketdesk - terminal client for a support ticket service.
//!
//! Usage:
//!   ticketdesk --api-url https://support.example.com/api
//!   TICKETDESK_API_URL=http://localhost:8000/api ticketdesk --department HR
//!   ticketdesk --api-url http://localhost:8000/api --screen sign-in -v

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing::Level;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ticketdesk::api::HttpTicketApi;
use ticketdesk::config::{Args, Config};
use ticketdesk::tui::App;

/// Interval of idle ticks; bounds debounce latency.
const TICK_RATE: Duration = Duration::from_millis(100);

/// Sends logs to `path`. The terminal belongs to the TUI, so nothing is
/// written to stdout or stderr.
fn init_logging(path: &Path, verbose: u8) -> std::io::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("ticketdesk={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    let config = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &config.log_file
        && let Err(e) = init_logging(path, config.verbose)
    {
        eprintln!("Error opening log file '{}': {}", path.display(), e);
        std::process::exit(1);
    }

    let api = match HttpTicketApi::new(&config.api_url, config.timeout) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!(api_url = %config.api_url, department = %config.department, "starting");

    let app = App::new(Arc::new(api), &config);
    if let Err(e) = app.run(TICK_RATE) {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}
