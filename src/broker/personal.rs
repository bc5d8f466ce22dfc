//! Personal mailbox
//!
//! A bounded FIFO with destructive reads: each message is handed to exactly
//! one reader. Nothing ever expires; items leave only when read.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::broker::event::{Event, EventKind};
use crate::broker::message::Message;
use crate::broker::queue::MessageQueue;
use crate::utils::error::QueueError;

#[derive(Debug)]
pub struct PersonalQueue {
    target: String,
    capacity: usize,
    items: Mutex<VecDeque<Message>>,
}

impl PersonalQueue {
    /// A zero `capacity` is raised to 1 so the mailbox can hold something.
    pub fn new(target: impl Into<String>, capacity: usize) -> Self {
        let target = target.into();
        if capacity == 0 {
            warn!(target_name = %target, "personal queue capacity 0, using 1");
        }
        let capacity = capacity.max(1);
        Self {
            target,
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append to the tail, or reject when the mailbox is full. A rejected
    /// message leaves the queue untouched.
    pub fn add(&self, message: Message) -> Result<(), QueueError> {
        let mut items = self.items();
        if items.len() >= self.capacity {
            debug!(
                target_name = %self.target,
                capacity = self.capacity,
                oldest_waiting = ?items.front().map(|m| m.created_at().to_rfc3339()),
                "personal queue full"
            );
            return Err(QueueError::Full {
                target: self.target.clone(),
                capacity: self.capacity,
            });
        }
        items.push_back(message);
        Ok(())
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MessageQueue for PersonalQueue {
    fn target(&self) -> &str {
        &self.target
    }

    fn kind(&self) -> EventKind {
        EventKind::Personal
    }

    fn add_event(&self, event: &Event) -> Result<(), QueueError> {
        self.add(Message::from(event))
    }

    /// Pop the head.
    fn get(&self) -> Result<Message, QueueError> {
        self.items().pop_front().ok_or_else(|| QueueError::Empty {
            target: self.target.clone(),
        })
    }

    /// Drain every resident message in one step.
    fn get_all(&self) -> Vec<Message> {
        self.items().drain(..).collect()
    }

    fn cleanup(&self) -> usize {
        0
    }

    fn len(&self) -> usize {
        self.items().len()
    }
}
