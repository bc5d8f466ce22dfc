//! # postbox
//!
//! `postbox` is a lightweight, in-memory message broker. Producers leave
//! messages either for an individual recipient (a personal mailbox) or on a
//! named topic; consumers pick them up later over a WebSocket
//! request/response protocol.
//!
//! ## Core Modules
//!
//! - `broker`: event model, personal and topic queues, and the handler chain
//!   that routes events and provisions queues on first use.
//! - `client`: a small client for the wire protocol, used by the CLI.
//! - `config`: layered configuration (defaults, file, environment).
//! - `transport`: request validation, status mapping and the WebSocket server.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
