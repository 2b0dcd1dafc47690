//! Shared application state for the gateway.
//!
//! The collector registry and gzip pool are constructed here and handed to
//! handlers through axum state; nothing is process-global, so tests build a
//! fresh state per case.

use std::sync::Arc;

use scrapegate_core::error::Result;
use scrapegate_core::CollectorFactory;

use crate::collector::{CollectorRegistry, HttpCollectorFactory};
use crate::compress::GzipPool;
use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    registry: CollectorRegistry,
    gzip: GzipPool,
}

impl AppState {
    /// Build application state with the HTTP telemetry factory.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let factory = HttpCollectorFactory::new(cfg.telemetry.clone())?;
        Ok(Self::with_factory(cfg, Arc::new(factory)))
    }

    /// Build application state around an arbitrary collector factory.
    pub fn with_factory(cfg: GatewayConfig, factory: Arc<dyn CollectorFactory>) -> Self {
        let gzip = GzipPool::new(cfg.gateway.gzip_pool_capacity);
        Self {
            inner: Arc::new(AppStateInner {
                registry: CollectorRegistry::new(factory),
                gzip,
                cfg,
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &CollectorRegistry {
        &self.inner.registry
    }

    pub fn gzip(&self) -> &GzipPool {
        &self.inner.gzip
    }
}
