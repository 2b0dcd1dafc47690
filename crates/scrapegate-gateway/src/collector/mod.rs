//! Collector lifecycle for the gateway.
//!
//! `CollectorRegistry` caches one collector per target; `http` provides the
//! telemetry-backed collector families built from host configuration.

pub mod http;
mod registry;

pub use http::HttpCollectorFactory;
pub use registry::CollectorRegistry;
