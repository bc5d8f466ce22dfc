//! Topic queue
//!
//! Broadcast queue with per-message TTL. Reads never remove anything, so any
//! number of readers can observe the same message until it expires. Expired
//! messages are removed only by `cleanup`, which a background sweeper runs
//! once per sweep interval for as long as the queue is alive.
//!
//! The sweeper sleeps the full interval and then sweeps; the queue lock is
//! taken only inside `cleanup`, never across the sleep.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::broker::event::{Event, EventKind, META_TIMEOUT};
use crate::broker::message::{Message, TopicMessage};
use crate::broker::queue::MessageQueue;
use crate::utils::error::QueueError;

/// TTL used when a topic write carries no usable `Timeout`. The server
/// ceiling still applies on top of it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(u32::MAX as u64);

/// Floor for the sweep period so a zero interval cannot spin.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub struct TopicQueue {
    target: String,
    max_timeout: Duration,
    sweep_interval: Duration,
    items: Mutex<VecDeque<TopicMessage>>,
}

impl TopicQueue {
    pub fn new(target: impl Into<String>, max_timeout: Duration, sweep_interval: Duration) -> Self {
        Self {
            target: target.into(),
            max_timeout,
            sweep_interval: sweep_interval.max(MIN_SWEEP_INTERVAL),
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_timeout(&self) -> Duration {
        self.max_timeout
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Append with expiry `now + min(timeout, max_timeout)`.
    pub fn add(&self, message: Message, timeout: Duration) {
        let ttl = timeout.min(self.max_timeout);
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);
        self.items().push_back(TopicMessage::new(message, expires_at));
    }

    /// Copy of every stored item together with its expiry.
    pub fn snapshot(&self) -> Vec<TopicMessage> {
        self.items().iter().cloned().collect()
    }

    /// Start the periodic sweep for this queue. The sweeper only holds a weak
    /// reference and stops once the queue is dropped.
    ///
    /// Runs as a Tokio task when called inside a runtime, on a dedicated
    /// thread otherwise. Returns `None` only if the thread cannot be started.
    pub fn spawn_sweeper(queue: &Arc<TopicQueue>) -> Option<Sweeper> {
        let weak = Arc::downgrade(queue);
        let interval = queue.sweep_interval;

        match Handle::try_current() {
            Ok(handle) => Some(Sweeper::Task(handle.spawn(sweep_loop(weak, interval)))),
            Err(_) => {
                warn!(topic = %queue.target, "no tokio runtime, sweeping on a dedicated thread");
                let spawned = thread::Builder::new()
                    .name(format!("sweep-{}", queue.target))
                    .spawn(move || {
                        loop {
                            thread::sleep(interval);
                            let Some(queue) = weak.upgrade() else { break };
                            queue.cleanup();
                        }
                    });
                match spawned {
                    Ok(join) => Some(Sweeper::Thread(join)),
                    Err(e) => {
                        error!(topic = %queue.target, "failed to start sweeper thread: {e}");
                        None
                    }
                }
            }
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<TopicMessage>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle on a running sweeper. Dropping it detaches the sweeper, which then
/// lives exactly as long as its queue.
#[derive(Debug)]
pub enum Sweeper {
    Task(JoinHandle<()>),
    Thread(thread::JoinHandle<()>),
}

impl Sweeper {
    pub fn is_finished(&self) -> bool {
        match self {
            Sweeper::Task(task) => task.is_finished(),
            Sweeper::Thread(join) => join.is_finished(),
        }
    }
}

async fn sweep_loop(queue: Weak<TopicQueue>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        let Some(queue) = queue.upgrade() else { break };
        queue.cleanup();
    }
}

impl MessageQueue for TopicQueue {
    fn target(&self) -> &str {
        &self.target
    }

    fn kind(&self) -> EventKind {
        EventKind::Topic
    }

    /// A missing or non-integer `Timeout` degrades to `DEFAULT_TIMEOUT_SECS`.
    fn add_event(&self, event: &Event) -> Result<(), QueueError> {
        let secs = event
            .meta(META_TIMEOUT)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or_else(|| {
                debug!(topic = %self.target, "unusable timeout, using default");
                DEFAULT_TIMEOUT_SECS as i64
            });
        // zero or negative: expired on arrival
        let ttl = Duration::from_secs(u64::try_from(secs).unwrap_or(0));
        self.add(Message::from(event), ttl);
        Ok(())
    }

    /// First message that has not expired yet; nothing is removed.
    fn get(&self) -> Result<Message, QueueError> {
        let now = Instant::now();
        self.items()
            .iter()
            .find(|item| !item.is_expired_at(now))
            .map(|item| item.message().clone())
            .ok_or_else(|| QueueError::Empty {
                target: self.target.clone(),
            })
    }

    /// Everything still stored, including expired items the sweeper has not
    /// reached yet.
    fn get_all(&self) -> Vec<Message> {
        self.items()
            .iter()
            .map(|item| item.message().clone())
            .collect()
    }

    fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut items = self.items();
        let before = items.len();
        let mut oldest: Option<DateTime<Utc>> = None;
        items.retain(|item| {
            let expired = item.is_expired_at(now);
            if expired {
                let created = item.message().created_at();
                oldest = Some(oldest.map_or(created, |seen| seen.min(created)));
            }
            !expired
        });
        let removed = before - items.len();
        if let Some(oldest) = oldest {
            debug!(
                topic = %self.target,
                removed,
                oldest_created = %oldest.to_rfc3339(),
                "purged expired topic messages"
            );
        }
        removed
    }

    fn len(&self) -> usize {
        self.items().len()
    }
}
