//! Structured configuration document (YAML, and therefore JSON).

use std::time::Duration;

use serde::Deserialize;

use super::{
    ContextConfig, DEFAULT_LINK_WEIGHT, DEFAULT_SWEEP_INTERVAL, EngineConfig, LinkConfig,
    RateConfig,
};
use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    #[serde(alias = "linkers")]
    contexts: Vec<ContextDocument>,
    #[serde(default)]
    sweep_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContextDocument {
    name: String,
    rate: RateDocument,
    /// Shorthand for links of weight 1.0.
    #[serde(default)]
    contexts: Vec<String>,
    #[serde(default)]
    links: Vec<LinkDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RateDocument {
    count: u64,
    ttl_seconds: u64,
    #[serde(default)]
    bucket_size_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkDocument {
    Group(GroupLink),
    Named(NamedLink),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupLink {
    contexts: Vec<String>,
    #[serde(default = "default_weight")]
    weight: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamedLink {
    name: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    DEFAULT_LINK_WEIGHT
}

impl From<ContextDocument> for ContextConfig {
    fn from(doc: ContextDocument) -> Self {
        let mut links: Vec<LinkConfig> = doc
            .contexts
            .into_iter()
            .map(|target| LinkConfig::new(target, DEFAULT_LINK_WEIGHT))
            .collect();

        for link in doc.links {
            match link {
                LinkDocument::Group(GroupLink { contexts, weight }) => links.extend(
                    contexts
                        .into_iter()
                        .map(|target| LinkConfig::new(target, weight)),
                ),
                LinkDocument::Named(NamedLink { name, weight }) => {
                    links.push(LinkConfig::new(name, weight))
                }
            }
        }

        ContextConfig {
            name: doc.name,
            rate: RateConfig {
                count: doc.rate.count,
                ttl: Duration::from_secs(doc.rate.ttl_seconds),
                bucket_size: doc.rate.bucket_size_seconds.map(Duration::from_secs),
            },
            links,
        }
    }
}

impl EngineConfig {
    /// Parse a structured configuration document.
    ///
    /// The document is read as YAML, so JSON input is accepted unchanged.
    pub fn from_document(input: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument =
            serde_yaml::from_str(input).map_err(|e| ConfigError::Document(e.to_string()))?;

        Ok(EngineConfig {
            contexts: doc.contexts.into_iter().map(ContextConfig::from).collect(),
            sweep_interval: doc
                .sweep_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        })
    }
}
