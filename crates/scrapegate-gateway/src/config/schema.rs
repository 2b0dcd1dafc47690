use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use scrapegate_core::error::{GatewayError, Result};

/// Host key used when a target has no entry of its own.
pub const DEFAULT_HOST: &str = "default";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GatewayError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.telemetry.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_gzip_pool_capacity")]
    pub gzip_pool_capacity: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            gzip_pool_capacity: default_gzip_pool_capacity(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1024).contains(&self.gzip_pool_capacity) {
            return Err(GatewayError::Config(
                "gateway.gzip_pool_capacity must be between 1 and 1024".into(),
            ));
        }
        self.bind()?;
        Ok(())
    }

    pub fn bind(&self) -> Result<SocketAddr> {
        let s = if self.address.contains(':') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        };
        s.parse()
            .map_err(|e| GatewayError::Config(format!("invalid bind address {s}: {e}")))
    }
}

fn default_address() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    9348
}
fn default_gzip_pool_capacity() -> usize {
    16
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            hosts: HashMap::new(),
        }
    }
}

impl TelemetrySection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=120_000).contains(&self.timeout_ms) {
            return Err(GatewayError::Config(
                "telemetry.timeout_ms must be between 100 and 120000".into(),
            ));
        }
        for (name, host) in &self.hosts {
            host.validate()
                .map_err(|e| GatewayError::Config(format!("telemetry.hosts.{name}: {e}")))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Exact entry for `target`, falling back to the `default` entry.
    pub fn host(&self, target: &str) -> Option<&HostConfig> {
        self.hosts.get(target).or_else(|| self.hosts.get(DEFAULT_HOST))
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    /// JSON document, numeric leaves become gauges.
    #[default]
    Json,
    /// Exposition text forwarded as-is.
    Text,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    #[serde(default)]
    pub kind: TelemetryKind,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_path")]
    pub path: String,
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scheme != "http" && self.scheme != "https" {
            return Err(GatewayError::Config(format!(
                "scheme must be http or https, got {}",
                self.scheme
            )));
        }
        if !self.path.starts_with('/') {
            return Err(GatewayError::Config("path must start with '/'".into()));
        }
        Ok(())
    }

    /// Telemetry URL for `target` under this host entry.
    pub fn url(&self, target: &str) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}{}", self.scheme, target, port, self.path),
            None => format!("{}://{}{}", self.scheme, target, self.path),
        }
    }
}

fn default_scheme() -> String {
    "http".into()
}
fn default_path() -> String {
    "/telemetry".into()
}
