//! The `client` module provides the consumer/producer side of the protocol.
//!
//! `MessagingClient` wraps one request/response exchange with a running
//! server and backs the `send` and `read` CLI subcommands.

pub mod messaging_client;
pub use messaging_client::{ClientError, MessagingClient};

#[cfg(test)]
mod tests;
