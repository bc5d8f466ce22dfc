//! Queue contract shared by personal mailboxes and topic queues.
//!
//! A queue doubles as a handler in the dispatcher's chain: `cares` decides
//! whether an event is addressed to it and `handle_event` performs the read
//! or write the event asks for.

use std::fmt;

use crate::broker::event::{Action, Event, EventKind};
use crate::broker::message::Message;
use crate::utils::error::QueueError;

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A write was enqueued.
    Accepted { kind: EventKind, target: String },
    /// A single read returned this payload.
    Delivered(String),
    /// A bulk read returned these payloads, oldest first.
    Batch(Vec<String>),
    /// A single read found nothing to return.
    Empty { kind: EventKind, target: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Accepted { target, .. } => {
                write!(f, "Message successfully added for '{target}'.")
            }
            Outcome::Delivered(payload) => f.write_str(payload),
            Outcome::Batch(payloads) => write!(f, "{}", payloads.join("\n")),
            Outcome::Empty { target, .. } => write!(f, "No message in queue for '{target}'."),
        }
    }
}

pub trait MessageQueue: Send + Sync {
    fn target(&self) -> &str;

    fn kind(&self) -> EventKind;

    /// Store the message carried by a write event.
    fn add_event(&self, event: &Event) -> Result<(), QueueError>;

    fn get(&self) -> Result<Message, QueueError>;

    fn get_all(&self) -> Vec<Message>;

    /// Drop whatever the queue discipline considers stale. Returns how many
    /// items were removed.
    fn cleanup(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cares(&self, event: &Event) -> bool {
        event.kind() == self.kind() && event.to() == self.target()
    }

    /// Read-misses come back as `Outcome::Empty`; only a rejected write is an
    /// error.
    fn handle_event(&self, event: &Event) -> Result<Outcome, QueueError> {
        match event.action() {
            Action::Read => match self.get() {
                Ok(message) => Ok(Outcome::Delivered(message.into_payload())),
                Err(QueueError::Empty { .. }) => Ok(Outcome::Empty {
                    kind: self.kind(),
                    target: self.target().to_string(),
                }),
                Err(e) => Err(e),
            },
            Action::ReadAll => Ok(Outcome::Batch(
                self.get_all()
                    .into_iter()
                    .map(Message::into_payload)
                    .collect(),
            )),
            Action::Write => {
                self.add_event(event)?;
                Ok(Outcome::Accepted {
                    kind: self.kind(),
                    target: self.target().to_string(),
                })
            }
        }
    }
}
