//! Inbound events
//!
//! An `Event` is the typed, addressed request the transport hands to the
//! broker. Routing information travels in the metadata map:
//! - `To`: target name, always present
//! - `Timeout`: requested TTL in seconds, topic writes only
//! - `EventType`: `GET` for a single read, `GET_ALL` for a bulk read; absent
//!   for writes

use std::collections::HashMap;
use std::fmt;

pub const META_TO: &str = "To";
pub const META_TIMEOUT: &str = "Timeout";
pub const META_EVENT_TYPE: &str = "EventType";

pub const READ_ONE: &str = "GET";
pub const READ_ALL: &str = "GET_ALL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Topic,
    Personal,
}

impl EventKind {
    /// Case-insensitive parse of `"Topic"` / `"Personal"`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("topic") {
            Some(Self::Topic)
        } else if value.eq_ignore_ascii_case("personal") {
            Some(Self::Personal)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "Topic",
            Self::Personal => "Personal",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a queue handler does with an event it claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    ReadAll,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    metadata: HashMap<String, String>,
    payload: String,
}

impl Event {
    /// A write event for `to` carrying `payload`.
    pub fn write(kind: EventKind, to: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(META_TO.to_string(), to.into());
        Self {
            kind,
            metadata,
            payload: payload.into(),
        }
    }

    /// A topic write with its requested TTL in seconds.
    pub fn topic_write(to: impl Into<String>, payload: impl Into<String>, timeout_secs: u64) -> Self {
        Self::write(EventKind::Topic, to, payload).with_meta(META_TIMEOUT, timeout_secs.to_string())
    }

    /// A single-message read. Read events never carry a payload.
    pub fn read(kind: EventKind, to: impl Into<String>) -> Self {
        Self::write(kind, to, String::new()).with_meta(META_EVENT_TYPE, READ_ONE)
    }

    pub fn read_all(kind: EventKind, to: impl Into<String>) -> Self {
        Self::write(kind, to, String::new()).with_meta(META_EVENT_TYPE, READ_ALL)
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Target of the event. Every constructor sets it.
    pub fn to(&self) -> &str {
        self.meta(META_TO).unwrap_or_default()
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn action(&self) -> Action {
        match self.meta(META_EVENT_TYPE) {
            Some(READ_ONE) => Action::Read,
            Some(READ_ALL) => Action::ReadAll,
            _ => Action::Write,
        }
    }
}
