//! Broker engine
//!
//! The `Broker` is the single entry point the transport calls. It owns the
//! handler chain, which in turn exclusively owns every queue.
//!
//! Concurrency and usage notes:
//! - The API is synchronous and internally synchronized; share the broker as
//!   `Arc<Broker>` and call it from any number of connection tasks.
//! - Dispatch calls are serialized by the chain lock. Each call only holds it
//!   for an in-memory queue operation.
//! - Topic queues start their sweepers when provisioned, so the broker should
//!   be driven from inside a Tokio runtime; without one, sweepers fall back to
//!   plain threads.

use std::time::Duration;

use tracing::{debug, warn};

use crate::broker::chain::HandlerChain;
use crate::broker::event::{Event, EventKind};
use crate::broker::queue::Outcome;
use crate::config::BrokerSettings;
use crate::utils::error::{BrokerError, BrokerResult};

#[derive(Debug)]
pub struct Broker {
    chain: HandlerChain,
    max_server_timeout: Duration,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerSettings::default())
    }
}

impl Broker {
    pub fn new(settings: BrokerSettings) -> Self {
        let max_server_timeout = settings.max_timeout();
        Self {
            chain: HandlerChain::new(settings),
            max_server_timeout,
        }
    }

    /// Ceiling applied to every topic message TTL.
    pub fn max_server_timeout(&self) -> Duration {
        self.max_server_timeout
    }

    /// Route `event` to its queue, creating the queue on first reference.
    pub fn dispatch(&self, event: &Event) -> BrokerResult<Outcome> {
        let result = self.chain.dispatch(event);
        match &result {
            Ok(outcome) => debug!(kind = %event.kind(), to = event.to(), "dispatched: {outcome}"),
            Err(BrokerError::Queue(e)) => debug!(kind = %event.kind(), "rejected: {e}"),
            Err(e) => warn!(kind = %event.kind(), to = event.to(), "dispatch failed: {e}"),
        }
        result
    }

    /// Returns `true` if the queue did not exist yet.
    pub fn provision_personal_queue(&self, name: &str) -> bool {
        self.chain.provision(EventKind::Personal, name)
    }

    /// Returns `true` if the queue did not exist yet.
    pub fn provision_topic_queue(&self, name: &str) -> bool {
        self.chain.provision(EventKind::Topic, name)
    }

    /// Messages currently stored for `kind`/`target`, expired-but-unswept
    /// topic messages included.
    pub fn pending(&self, kind: EventKind, target: &str) -> BrokerResult<usize> {
        self.chain.pending(kind, target)
    }

    /// Provisioned queues in the order the dispatcher tries them.
    pub fn handlers(&self) -> Vec<(EventKind, String)> {
        self.chain.handlers_snapshot()
    }
}
