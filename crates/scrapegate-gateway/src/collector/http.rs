//! HTTP telemetry collector families.
//!
//! The host entry matching a target decides the family:
//! - `json`: the endpoint serves a JSON document; every numeric or boolean
//!   leaf becomes one `scrapegate_telemetry_value{path="..."}` gauge.
//! - `text`: the endpoint already serves exposition text; it is forwarded.
//!
//! Both families probe the endpoint once at construction, so an unreachable
//! or misconfigured target fails before anything is cached.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use scrapegate_core::error::{GatewayError, Result};
use scrapegate_core::exposition::{Exposition, MetricKind};
use scrapegate_core::{Collector, CollectorFactory};

use crate::config::{HostConfig, TelemetryKind, TelemetrySection};

const VALUE_METRIC: &str = "scrapegate_telemetry_value";
const SCRAPES_METRIC: &str = "scrapegate_scrapes_total";
const SCRAPE_ERRORS_METRIC: &str = "scrapegate_scrape_errors_total";

/// Builds collectors from the `telemetry.hosts` table.
pub struct HttpCollectorFactory {
    client: reqwest::Client,
    telemetry: TelemetrySection,
}

impl HttpCollectorFactory {
    pub fn new(telemetry: TelemetrySection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(telemetry.timeout())
            .build()
            .map_err(|e| GatewayError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client, telemetry })
    }
}

#[async_trait]
impl CollectorFactory for HttpCollectorFactory {
    async fn create(&self, target: &str) -> Result<Arc<dyn Collector>> {
        let host = self.telemetry.host(target).ok_or_else(|| {
            GatewayError::Config(format!("host {target} not found in configuration"))
        })?;

        let session = Session::new(self.client.clone(), target, host);
        tracing::debug!(host = %target, url = %session.url, kind = ?host.kind, "probing telemetry endpoint");

        match host.kind {
            TelemetryKind::Json => {
                session.fetch_json().await?;
                Ok(Arc::new(JsonCollector { session }))
            }
            TelemetryKind::Text => {
                session.fetch_text().await?;
                Ok(Arc::new(TextCollector { session }))
            }
        }
    }
}

#[derive(Debug, Default)]
struct ScrapeStats {
    scrapes: u64,
    errors: u64,
}

/// Connection details plus the mutable per-target counters. The mutex also
/// serializes gathers against one target.
struct Session {
    client: reqwest::Client,
    target: String,
    url: String,
    stats: Mutex<ScrapeStats>,
}

impl Session {
    fn new(client: reqwest::Client, target: &str, host: &HostConfig) -> Self {
        Self {
            client,
            target: target.to_string(),
            url: host.url(target),
            stats: Mutex::new(ScrapeStats::default()),
        }
    }

    async fn fetch_text(&self) -> Result<String> {
        let rsp = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GatewayError::Telemetry(format!("GET {} failed: {e}", self.url)))?;
        rsp.text()
            .await
            .map_err(|e| GatewayError::Telemetry(format!("read body from {} failed: {e}", self.url)))
    }

    async fn fetch_json(&self) -> Result<Value> {
        let body = self.fetch_text().await?;
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::Telemetry(format!("malformed json from {}: {e}", self.url)))
    }

    /// Run one scrape under the session lock and append the internal
    /// counters on success.
    async fn scrape<F, Fut>(&self, render: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Exposition>>,
    {
        let mut stats = self.stats.lock().await;
        stats.scrapes += 1;

        match render().await {
            Ok(mut out) => {
                let labels = [("host", self.target.as_str())];
                out.family(SCRAPES_METRIC, MetricKind::Counter, "Scrapes attempted against the target.")
                    .sample(SCRAPES_METRIC, &labels, stats.scrapes as f64)
                    .family(SCRAPE_ERRORS_METRIC, MetricKind::Counter, "Scrapes that failed against the target.")
                    .sample(SCRAPE_ERRORS_METRIC, &labels, stats.errors as f64);
                Ok(out.finish())
            }
            Err(e) => {
                stats.errors += 1;
                tracing::warn!(host = %self.target, errors = stats.errors, "scrape failed: {e}");
                Err(e.into_gather(&self.target))
            }
        }
    }
}

struct JsonCollector {
    session: Session,
}

#[async_trait]
impl Collector for JsonCollector {
    fn target(&self) -> &str {
        &self.session.target
    }

    async fn gather(&self) -> Result<String> {
        self.session
            .scrape(|| async {
                let doc = self.session.fetch_json().await?;
                let mut out = Exposition::new();
                out.family(VALUE_METRIC, MetricKind::Gauge, "Numeric telemetry leaf reported by the target.");
                flatten(&doc, &mut String::new(), &mut |path, v| {
                    out.sample(VALUE_METRIC, &[("host", self.target()), ("path", path)], v);
                });
                Ok(out)
            })
            .await
    }
}

struct TextCollector {
    session: Session,
}

#[async_trait]
impl Collector for TextCollector {
    fn target(&self) -> &str {
        &self.session.target
    }

    async fn gather(&self) -> Result<String> {
        self.session
            .scrape(|| async {
                let body = self.session.fetch_text().await?;
                let mut out = Exposition::new();
                out.raw(&body);
                Ok(out)
            })
            .await
    }
}

/// Depth-first walk over numeric and boolean leaves; object keys are joined
/// with `.`, array elements use their index.
fn flatten(v: &Value, path: &mut String, emit: &mut dyn FnMut(&str, f64)) {
    match v {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                emit(path, f);
            }
        }
        Value::Bool(b) => emit(path, if *b { 1.0 } else { 0.0 }),
        Value::Object(map) => {
            for (k, child) in map {
                descend(child, path, k, emit);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                descend(child, path, &i.to_string(), emit);
            }
        }
        Value::Null | Value::String(_) => {}
    }
}

fn descend(child: &Value, path: &mut String, seg: &str, emit: &mut dyn FnMut(&str, f64)) {
    let len = path.len();
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(seg);
    flatten(child, path, emit);
    path.truncate(len);
}
