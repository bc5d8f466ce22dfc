//! Error types shared by the queues and the dispatcher.
//!
//! Queue-level failures (`QueueError`) are recoverable and are converted by the
//! handler chain either into an [`Outcome`](crate::broker::Outcome) (empty
//! reads) or into a [`BrokerError`] the transport maps onto a status class.

use crate::broker::EventKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue for '{target}' is empty")]
    Empty { target: String },

    #[error("queue for '{target}' is full (capacity: {capacity})")]
    Full { target: String, capacity: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("no {kind} queue provisioned for '{target}'")]
    TargetNotProvisioned { kind: EventKind, target: String },

    /// The fallback handler should claim every event; seeing this means the
    /// handler chain lost its fallback.
    #[error("no handler claimed the {kind} event for '{target}'")]
    NoHandler { kind: EventKind, target: String },
}

/// Result type for dispatcher operations
pub type BrokerResult<T> = Result<T, BrokerError>;
