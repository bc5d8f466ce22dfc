//! Handler chain
//!
//! Ordered list of queue handlers with the fallback permanently last. An
//! event goes to the first handler that cares about it. When only the
//! fallback does, the missing queue is provisioned, inserted at the front and
//! handed the event directly.
//!
//! The whole scan, optional provisioning and handling run under one lock on
//! the list, so two first references to the same target cannot both create a
//! queue.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::broker::event::{Event, EventKind};
use crate::broker::personal::PersonalQueue;
use crate::broker::queue::{MessageQueue, Outcome};
use crate::broker::topic::TopicQueue;
use crate::config::BrokerSettings;
use crate::utils::error::{BrokerError, BrokerResult};

#[derive(Clone)]
enum Handler {
    Queue(Arc<dyn MessageQueue>),
    Fallback,
}

impl Handler {
    fn cares(&self, event: &Event) -> bool {
        match self {
            Handler::Queue(queue) => queue.cares(event),
            Handler::Fallback => true,
        }
    }

    fn queue_for(&self, kind: EventKind, target: &str) -> Option<&Arc<dyn MessageQueue>> {
        match self {
            Handler::Queue(queue) if queue.kind() == kind && queue.target() == target => {
                Some(queue)
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Queue(queue) => write!(f, "Queue({} '{}')", queue.kind(), queue.target()),
            Handler::Fallback => f.write_str("Fallback"),
        }
    }
}

pub struct HandlerChain {
    handlers: Mutex<Vec<Handler>>,
    settings: BrokerSettings,
}

impl HandlerChain {
    /// A chain holding only the fallback handler.
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            handlers: Mutex::new(vec![Handler::Fallback]),
            settings,
        }
    }

    pub fn dispatch(&self, event: &Event) -> BrokerResult<Outcome> {
        let mut handlers = self.handlers();

        let claimed = handlers.iter().find(|h| h.cares(event)).cloned();
        let queue = match claimed {
            Some(Handler::Queue(queue)) => queue,
            Some(Handler::Fallback) => {
                let (queue, _) =
                    Self::provision_locked(&mut handlers, &self.settings, event.kind(), event.to());
                debug_assert!(queue.cares(event));
                queue
            }
            None => {
                return Err(BrokerError::NoHandler {
                    kind: event.kind(),
                    target: event.to().to_string(),
                });
            }
        };

        Ok(queue.handle_event(event)?)
    }

    /// Create the queue for `kind`/`target` unless it already exists.
    /// Returns `true` when a queue was created.
    pub fn provision(&self, kind: EventKind, target: &str) -> bool {
        let mut handlers = self.handlers();
        let (_, created) = Self::provision_locked(&mut handlers, &self.settings, kind, target);
        created
    }

    /// Number of messages stored for `kind`/`target`.
    pub fn pending(&self, kind: EventKind, target: &str) -> BrokerResult<usize> {
        self.handlers()
            .iter()
            .find_map(|h| h.queue_for(kind, target))
            .map(|queue| queue.len())
            .ok_or_else(|| BrokerError::TargetNotProvisioned {
                kind,
                target: target.to_string(),
            })
    }

    /// Queue handlers in match order; the fallback is not listed.
    pub fn handlers_snapshot(&self) -> Vec<(EventKind, String)> {
        self.handlers()
            .iter()
            .filter_map(|h| match h {
                Handler::Queue(queue) => Some((queue.kind(), queue.target().to_string())),
                Handler::Fallback => None,
            })
            .collect()
    }

    fn provision_locked(
        handlers: &mut Vec<Handler>,
        settings: &BrokerSettings,
        kind: EventKind,
        target: &str,
    ) -> (Arc<dyn MessageQueue>, bool) {
        if let Some(existing) = handlers.iter().find_map(|h| h.queue_for(kind, target)) {
            return (existing.clone(), false);
        }

        let queue: Arc<dyn MessageQueue> = match kind {
            EventKind::Personal => {
                Arc::new(PersonalQueue::new(target, settings.personal_capacity))
            }
            EventKind::Topic => {
                let topic = Arc::new(TopicQueue::new(
                    target,
                    settings.max_timeout(),
                    settings.sweep_interval(),
                ));
                // detached; the sweeper ends with the queue
                let _ = TopicQueue::spawn_sweeper(&topic);
                topic
            }
        };

        // newest first; the fallback stays last
        handlers.insert(0, Handler::Queue(queue.clone()));
        info!(%kind, target_name = target, "provisioned queue");
        (queue, true)
    }

    fn handlers(&self) -> MutexGuard<'_, Vec<Handler>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &*self.handlers())
            .field("settings", &self.settings)
            .finish()
    }
}
