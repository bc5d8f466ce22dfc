//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `postbox` application.
//!
//! It centralizes the error taxonomy shared by the queues, the dispatcher and
//! the transport, plus the tracing setup used by the binary.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("warn");
        logging::init("nonsense");
    }
}
