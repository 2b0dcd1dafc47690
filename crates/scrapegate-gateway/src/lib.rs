//! scrapegate gateway library entry.
//!
//! This crate wires configuration, the per-target collector registry, the
//! gzip pool, and the HTTP handlers into a scrape gateway. It is intended to
//! be consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod collector;
pub mod compress;
pub mod config;
pub mod ops;
pub mod router;
