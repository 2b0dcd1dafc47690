//! Per-target collector capability.
//!
//! A `Collector` owns whatever session state it needs to talk to one remote
//! target and produces a fresh exposition-format snapshot on every `gather`.
//! Families of devices are modelled as separate implementations, built by a
//! `CollectorFactory` from target metadata.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// One target's metrics source. Gathers may run concurrently on the same
/// instance; implementations serialize access to mutable session state.
#[async_trait]
pub trait Collector: Send + Sync {
    fn target(&self) -> &str;
    async fn gather(&self) -> Result<String>;
}

/// Builds collectors on first touch of a target.
#[async_trait]
pub trait CollectorFactory: Send + Sync {
    async fn create(&self, target: &str) -> Result<Arc<dyn Collector>>;
}
