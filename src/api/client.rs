//! Blocking HTTP implementation of `TicketApi`.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{TicketEnvelope, ValidationBody};
use super::{ApiError, AuthResponse, Credentials, Registration, Ticket, TicketApi, TicketPage};

/// Longest server body echoed into an error message.
const MAX_ERROR_BODY: usize = 200;

/// `TicketApi` over `reqwest::blocking`.
pub struct HttpTicketApi {
    base: String,
    client: Client,
}

impl HttpTicketApi {
    /// Creates a client for `base_url`. `timeout` of `None` keeps reqwest's default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=utf-8"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    /// Resolves a relative path or an absolute continuation link.
    fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        resolve_url(&self.base, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_url(self.resolve(path)?)
    }

    fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        let body = resp.text()?;
        decode(status, &body)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.resolve(path)?;
        debug!(%url, "POST");
        let resp = self.client.post(url).json(body).send()?;
        let status = resp.status();
        let text = resp.text()?;
        decode(status, &text)
    }
}

impl TicketApi for HttpTicketApi {
    fn list(&self, query: &str) -> Result<TicketPage, ApiError> {
        self.get(query)
    }

    fn ticket(&self, ticket_id: &str) -> Result<Ticket, ApiError> {
        let env: TicketEnvelope = self.get_url(ticket_url(&self.base, ticket_id)?)?;
        Ok(env.data)
    }

    fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials)
    }

    fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", registration)
    }
}

/// Joins `path` onto `base` the way axios does (one slash between them).
/// Absolute http(s) links are used unchanged.
fn resolve_url(base: &str, path: &str) -> Result<Url, ApiError> {
    let raw = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };
    Url::parse(&raw).map_err(|_| ApiError::InvalidUrl(raw))
}

/// `<base>/tickets/<id>` with the id escaped as one path segment.
fn ticket_url(base: &str, ticket_id: &str) -> Result<Url, ApiError> {
    let mut url = resolve_url(base, "/tickets")?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(base.to_string()))?
        .push(ticket_id);
    Ok(url)
}

/// Maps a status + body pair onto a value or an `ApiError`.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        let parsed: ValidationBody = serde_json::from_str(body).unwrap_or_default();
        return Err(ApiError::Validation {
            message: parsed
                .message
                .unwrap_or_else(|| "The given data was invalid.".to_string()),
            errors: parsed.errors,
        });
    }

    if !status.is_success() {
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }

    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Prefers a JSON `message` field, then a truncated raw body, then the reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Msg {
        message: String,
    }

    if let Ok(m) = serde_json::from_str::<Msg>(body) {
        return m.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("error").to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}
