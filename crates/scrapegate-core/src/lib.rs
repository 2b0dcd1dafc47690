//! scrapegate core: transport-agnostic collector contracts, error types, and
//! the exposition-format writer.
//!
//! This crate defines the per-target collector capability and the error
//! surface shared by the gateway and its telemetry clients. It intentionally
//! carries no HTTP or runtime dependencies so collector families can be
//! implemented and tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `GatewayError`/`Result` so a bad target
//! never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod collector;
pub mod error;
pub mod exposition;

pub use collector::{Collector, CollectorFactory};
/// Shared result type.
pub use error::{Result, GatewayError};
