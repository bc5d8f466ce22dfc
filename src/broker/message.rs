//! Stored messages
//!
//! A `Message` is the copy of an event's metadata and payload a queue keeps.
//! Topic queues wrap it in a `TopicMessage` that also records when the item
//! expires. Neither is mutated once enqueued.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::broker::event::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    metadata: HashMap<String, String>,
    payload: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            metadata: HashMap::new(),
            payload: payload.into(),
            created_at: Utc::now(),
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn into_payload(self) -> String {
        self.payload
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<&Event> for Message {
    fn from(event: &Event) -> Self {
        Self {
            metadata: event.metadata().clone(),
            payload: event.payload().to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopicMessage {
    message: Message,
    expires_at: Instant,
}

impl TopicMessage {
    pub fn new(message: Message, expires_at: Instant) -> Self {
        Self {
            message,
            expires_at,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Expired once `now` reaches the expiry instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}
