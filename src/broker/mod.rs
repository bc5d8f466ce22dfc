//! The broker core: event model, the two queue disciplines and the handler
//! chain that routes events between them.

pub mod chain;
pub mod engine;
pub mod event;
pub mod message;
pub mod personal;
pub mod queue;
pub mod topic;

pub use engine::Broker;
pub use event::{Event, EventKind};
pub use message::Message;
pub use queue::{MessageQueue, Outcome};
