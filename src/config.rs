//! Viewer configuration: YAML file, environment overrides and builder methods.
//!
//! ```yaml
//! cache:
//!   enabled: true
//!   max_entries: 256
//!   ttl_ms: 300000
//! mock:
//!   latency_ms: 1000
//!   page_size: 5
//! ```

use crate::api::{MockApiConfig, DEFAULT_PAGE_SIZE};
use crate::cache::CacheConfig;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Session cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// LRU bound; unbounded when absent.
    pub max_entries: Option<usize>,
    /// Entry lifetime in milliseconds; entries never expire when absent.
    pub ttl_ms: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: None,
            ttl_ms: None,
        }
    }
}

/// Simulated backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSettings {
    pub latency_ms: u64,
    pub page_size: usize,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            latency_ms: 1000,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub cache: CacheSettings,
    pub mock: MockSettings,
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Yaml(inner) => Error::configuration_with_context(
                inner.to_string(),
                ErrorContext::new()
                    .with_details(path.as_ref().display().to_string())
                    .with_source("config"),
            ),
            other => other,
        })
    }

    /// Defaults with `TXN_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `TXN_CACHE_ENABLED`, `TXN_CACHE_MAX_ENTRIES`,
    /// `TXN_CACHE_TTL_SECS`, `TXN_MOCK_LATENCY_MS` and `TXN_PAGE_SIZE`.
    /// Unparsable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(enabled) = lookup("TXN_CACHE_ENABLED").and_then(|s| parse_flag(&s)) {
            self.cache.enabled = enabled;
        }
        if let Some(max) = lookup("TXN_CACHE_MAX_ENTRIES").and_then(|s| s.parse::<usize>().ok()) {
            self.cache.max_entries = Some(max);
        }
        if let Some(ttl) = lookup("TXN_CACHE_TTL_SECS").and_then(|s| s.parse::<u64>().ok()) {
            self.cache.ttl_ms = Some(ttl.saturating_mul(1000));
        }
        if let Some(latency) = lookup("TXN_MOCK_LATENCY_MS").and_then(|s| s.parse::<u64>().ok()) {
            self.mock.latency_ms = latency;
        }
        if let Some(size) = lookup("TXN_PAGE_SIZE").and_then(|s| s.parse::<usize>().ok()) {
            self.mock.page_size = size;
        }
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    pub fn with_cache_max_entries(mut self, max: usize) -> Self {
        self.cache.max_entries = Some(max);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl_ms = Some(duration_millis(ttl));
        self
    }

    pub fn with_mock_latency(mut self, latency: Duration) -> Self {
        self.mock.latency_ms = duration_millis(latency);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.mock.page_size = page_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.mock.page_size == 0 {
            return Err(Error::configuration_with_context(
                "page size must be at least 1",
                ErrorContext::new()
                    .with_field_path("mock.page_size")
                    .with_source("config"),
            ));
        }
        self.cache_config().validate()
    }

    pub fn cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::new().with_enabled(self.cache.enabled);
        if let Some(max) = self.cache.max_entries {
            config = config.with_max_entries(max);
        }
        if let Some(ttl) = self.cache.ttl_ms {
            config = config.with_ttl(Duration::from_millis(ttl));
        }
        config
    }

    pub fn mock_api_config(&self) -> MockApiConfig {
        MockApiConfig::new()
            .with_latency(Duration::from_millis(self.mock.latency_ms))
            .with_page_size(self.mock.page_size)
    }
}

/// Whole milliseconds, rounding any sub-millisecond remainder up so a
/// non-zero duration never becomes zero.
fn duration_millis(duration: Duration) -> u64 {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if duration.subsec_nanos() % 1_000_000 != 0 {
        millis.saturating_add(1)
    } else {
        millis
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
