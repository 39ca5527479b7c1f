//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

/// Terminal client for the support ticket service.
#[derive(Parser, Debug, Clone)]
#[command(name = "ticketdesk", version, about = "Support ticket browser")]
pub struct Args {
    /// Base URL of the ticket API, e.g. https://support.example.com/api
    #[arg(long, env = "TICKETDESK_API_URL", value_name = "URL")]
    pub api_url: String,

    /// Department whose tickets are listed.
    #[arg(long, env = "TICKETDESK_DEPARTMENT", default_value = "IT")]
    pub department: String,

    /// Color theme.
    #[arg(long, env = "TICKETDESK_THEME", value_enum, default_value_t = ThemeName::System)]
    pub theme: ThemeName,

    /// Screen shown at start.
    #[arg(long, value_enum, default_value_t = Screen::Tickets)]
    pub screen: Screen,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Log file path. "-" disables logging.
    /// Default: ticketdesk.log in the system temp directory.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available color palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeName {
    Dark,
    Light,
    Blue,
    Orange,
    Stone,
    /// Follows the terminal's own colors.
    #[default]
    System,
}

impl ThemeName {
    pub fn all() -> &'static [ThemeName] {
        &[
            ThemeName::Dark,
            ThemeName::Light,
            ThemeName::Blue,
            ThemeName::Orange,
            ThemeName::Stone,
            ThemeName::System,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
            ThemeName::Blue => "blue",
            ThemeName::Orange => "orange",
            ThemeName::Stone => "stone",
            ThemeName::System => "system",
        }
    }

    pub fn next(&self) -> ThemeName {
        let all = Self::all();
        let idx = all.iter().position(|t| t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Screen {
    #[default]
    Tickets,
    SignIn,
    SignUp,
}

impl Screen {
    pub fn all() -> &'static [Screen] {
        &[Screen::Tickets, Screen::SignIn, Screen::SignUp]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Tickets => "Tickets",
            Screen::SignIn => "Sign in",
            Screen::SignUp => "Sign up",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("department must not be empty")]
    EmptyDepartment,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub department: String,
    pub theme: ThemeName,
    pub screen: Screen,
    pub timeout: Option<Duration>,
    /// `None` disables logging.
    pub log_file: Option<PathBuf>,
    pub verbose: u8,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let log_file = match args.log_file.as_deref() {
            Some("-") => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(std::env::temp_dir().join("ticketdesk.log")),
        };
        let config = Self {
            api_url: args.api_url.trim_end_matches('/').to_string(),
            department: args.department.trim().to_string(),
            theme: args.theme,
            screen: args.screen,
            timeout: match args.timeout {
                Some(0) => return Err(ConfigError::ZeroTimeout),
                Some(secs) => Some(Duration::from_secs(secs)),
                None => None,
            },
            log_file,
            verbose: args.verbose,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason,
        };
        let url = Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if self.department.is_empty() {
            return Err(ConfigError::EmptyDepartment);
        }
        Ok(())
    }
}
