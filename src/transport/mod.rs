//! The `transport` module is responsible for handling network communication
//! with clients over WebSockets.
//!
//! It defines the request/response frames, the adapter that validates them
//! and maps broker outcomes onto status codes, and the WebSocket server
//! itself.

pub mod adapter;
pub mod message;
pub mod websocket;

pub use adapter::{RequestError, StatusClass};
pub use message::{ClientRequest, ServerResponse};
pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
mod tests;
