//! Wire frames exchanged over the WebSocket.
//!
//! A client sends one `ClientRequest` per text frame and gets exactly one
//! `ServerResponse` back. Fields mirror the request/response shape of the
//! messaging protocol: a verb, `type`, `to`, `timeout` and a body. All of
//! them are optional at the serde level so validation can report precisely
//! what is missing.

use serde::{Deserialize, Deserializer, Serialize};

use crate::broker::EventKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Requested TTL in seconds; accepted as a JSON string or number.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Bulk read: drain a mailbox or list a topic.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub all: bool,
}

impl ClientRequest {
    pub fn write(
        kind: EventKind,
        to: impl Into<String>,
        body: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            method: Some("POST".to_string()),
            kind: Some(kind.to_string()),
            to: Some(to.into()),
            timeout: timeout_secs.map(|t| t.to_string()),
            body: Some(body.into()),
            all: false,
        }
    }

    pub fn read(kind: EventKind, to: impl Into<String>, all: bool) -> Self {
        Self {
            method: Some("GET".to_string()),
            kind: Some(kind.to_string()),
            to: Some(to.into()),
            timeout: None,
            body: None,
            all,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub status: u16,
    pub body: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }))
}
