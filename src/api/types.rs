//! Wire types for the ticket API.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A support ticket as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ticket {
    /// Kept as text even when the server sends a number.
    #[serde(deserialize_with = "string_or_number")]
    pub ticket_id: String,
    pub requester: String,
    pub request: String,
    pub priority: String,
    pub subcategory: Subcategory,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub responses: Option<Vec<TicketResponse>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subcategory {
    #[serde(deserialize_with = "string_or_number")]
    pub subcategory_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Assignee {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// One reply in a ticket thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketResponse {
    pub id: u64,
    pub inquiry: String,
    pub created_at: String,
}

/// Pagination metadata of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: u64,
    /// Absent on some deployments; more rows may follow while `next` is set.
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub last_page: u64,
}

/// Continuation links of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// One page of the ticket listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketPage {
    pub data: Vec<Ticket>,
    #[serde(default)]
    pub meta: PageMeta,
    #[serde(default)]
    pub links: PageLinks,
}

/// `{ data: Ticket }` envelope of the detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TicketEnvelope {
    pub data: Ticket,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Whatever the auth backend answers on success. Only `message` is shown.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Laravel-style 422 body: `{ message, errors: { field: [msg, ..] } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ValidationBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
