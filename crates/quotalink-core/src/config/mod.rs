//! Engine configuration model.
//!
//! Two surface syntaxes produce an [`EngineConfig`]:
//! - a structured YAML/JSON document ([`EngineConfig::from_document`]),
//! - a compact collection list such as `foo=100:1m,bar=1000:30s` (`str::parse`).
//!
//! Neither parser checks cross-context consistency; that happens when the
//! registry is built from the config.

mod document;
mod text;

use std::time::Duration;

/// Sweep interval used when the configuration does not name one.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Weight applied to a link declared without one.
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// Complete engine configuration: every context plus the sweep cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub contexts: Vec<ContextConfig>,
    pub sweep_interval: Duration,
}

/// One named quota domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    pub name: String,
    pub rate: RateConfig,
    /// Outbound links in declaration order.
    pub links: Vec<LinkConfig>,
}

/// Quota and window for a context.
#[derive(Debug, Clone, PartialEq)]
pub struct RateConfig {
    /// Maximum consumption units per window.
    pub count: u64,
    pub ttl: Duration,
    /// Sub-interval width; `None` means a single fixed window.
    pub bucket_size: Option<Duration>,
}

/// Contribution of another context's utilization, scaled by `weight`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub target: String,
    pub weight: f64,
}

impl LinkConfig {
    pub fn new(target: impl Into<String>, weight: f64) -> Self {
        Self {
            target: target.into(),
            weight,
        }
    }
}

impl ContextConfig {
    /// A context with no links.
    pub fn new(name: impl Into<String>, rate: RateConfig) -> Self {
        Self {
            name: name.into(),
            rate,
            links: Vec::new(),
        }
    }

    /// Append a link, builder style.
    pub fn link(mut self, target: impl Into<String>, weight: f64) -> Self {
        self.links.push(LinkConfig::new(target, weight));
        self
    }
}

impl RateConfig {
    pub fn new(count: u64, ttl: Duration) -> Self {
        Self {
            count,
            ttl,
            bucket_size: None,
        }
    }

    pub fn with_bucket_size(mut self, bucket_size: Duration) -> Self {
        self.bucket_size = Some(bucket_size);
        self
    }
}

impl EngineConfig {
    pub fn new(contexts: Vec<ContextConfig>) -> Self {
        Self {
            contexts,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}
