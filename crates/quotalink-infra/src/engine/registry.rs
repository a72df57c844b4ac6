use std::collections::HashMap;

use quotalink_core::ConfigError;
use quotalink_core::config::EngineConfig;
use quotalink_core::domain::Window;

use super::context::{Context, ResolvedLink};
use crate::store::KeyStore;

/// Every configured context, keyed by name.
///
/// Built once from configuration and never mutated afterwards, so lookups
/// need no locking. Links are resolved to indices into the context table;
/// every stored index is valid for the lifetime of the registry.
pub struct Registry {
    contexts: Vec<Context>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Validate `config` and build the registry, one key store per context
    /// with `shards` shards each.
    ///
    /// Fails on an empty context list, duplicate names, invalid windows,
    /// negative or non-finite weights, unknown link targets and a zero sweep
    /// interval. Self-links are dropped: a context's own usage is already
    /// counted. A target linked twice keeps its first position and its last
    /// weight.
    pub fn build(config: &EngineConfig, shards: usize) -> Result<Self, ConfigError> {
        if config.contexts.is_empty() {
            return Err(ConfigError::Empty);
        }
        if config.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidSweep);
        }

        let mut index = HashMap::with_capacity(config.contexts.len());
        for (i, ctx) in config.contexts.iter().enumerate() {
            if index.insert(ctx.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateContext(ctx.name.clone()));
            }
        }

        let mut contexts = Vec::with_capacity(config.contexts.len());
        for (i, ctx) in config.contexts.iter().enumerate() {
            let window = Window::new(ctx.rate.ttl, ctx.rate.bucket_size).map_err(|e| {
                ConfigError::InvalidWindow {
                    context: ctx.name.clone(),
                    reason: e.to_string(),
                }
            })?;

            let mut links: Vec<ResolvedLink> = Vec::with_capacity(ctx.links.len());
            for link in &ctx.links {
                if !link.weight.is_finite() || link.weight < 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        context: ctx.name.clone(),
                        target: link.target.clone(),
                        weight: link.weight,
                    });
                }

                let target = *index
                    .get(&link.target)
                    .ok_or_else(|| ConfigError::UnknownLink {
                        context: ctx.name.clone(),
                        target: link.target.clone(),
                    })?;

                if target == i {
                    tracing::debug!(context = %ctx.name, "Ignoring self-link");
                    continue;
                }

                match links.iter_mut().find(|l| l.target == target) {
                    Some(existing) => {
                        tracing::warn!(
                            context = %ctx.name,
                            target = %link.target,
                            weight = link.weight,
                            "Duplicate link, keeping last weight"
                        );
                        existing.weight = link.weight;
                    }
                    None => links.push(ResolvedLink {
                        target,
                        weight: link.weight,
                    }),
                }
            }

            contexts.push(Context::new(
                ctx.name.clone(),
                KeyStore::new(window, ctx.rate.count, shards),
                links,
            ));
        }

        tracing::info!(
            contexts = contexts.len(),
            shards,
            "Context registry built"
        );

        Ok(Self { contexts, index })
    }

    /// Look a context up by name.
    pub fn get(&self, name: &str) -> Option<&Context> {
        self.index.get(name).map(|&i| &self.contexts[i])
    }

    /// The context stored at a resolved link index.
    pub fn by_index(&self, index: usize) -> &Context {
        &self.contexts[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.contexts.iter()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use quotalink_core::config::{ContextConfig, RateConfig};

    use super::*;

    fn rate() -> RateConfig {
        RateConfig::new(10, Duration::from_secs(60))
    }

    fn build(contexts: Vec<ContextConfig>) -> Result<Registry, ConfigError> {
        Registry::build(&EngineConfig::new(contexts), 4)
    }

    #[test]
    fn test_resolves_links_to_indices() {
        let registry = build(vec![
            ContextConfig::new("foo", rate()).link("bar", 1.0),
            ContextConfig::new("bar", rate()).link("foo", 0.5),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);

        let foo = registry.get("foo").unwrap();
        assert_eq!(foo.links().len(), 1);
        assert_eq!(registry.by_index(foo.links()[0].target()).name(), "bar");

        let bar = registry.get("bar").unwrap();
        assert_eq!(registry.by_index(bar.links()[0].target()).name(), "foo");
        assert_eq!(bar.links()[0].weight(), 0.5);

        assert!(registry.get("foobar").is_none());
    }

    #[test]
    fn test_self_link_is_dropped() {
        let registry = build(vec![ContextConfig::new("foo", rate()).link("foo", 1.0)]).unwrap();
        assert!(registry.get("foo").unwrap().links().is_empty());
    }

    #[test]
    fn test_duplicate_link_keeps_last_weight() {
        let registry = build(vec![
            ContextConfig::new("a", rate())
                .link("b", 1.0)
                .link("c", 1.0)
                .link("b", 0.25),
            ContextConfig::new("b", rate()),
            ContextConfig::new("c", rate()),
        ])
        .unwrap();

        let links = registry.get("a").unwrap().links();
        assert_eq!(links.len(), 2);
        assert_eq!(registry.by_index(links[0].target()).name(), "b");
        assert_eq!(links[0].weight(), 0.25);
        assert_eq!(registry.by_index(links[1].target()).name(), "c");
    }

    #[test]
    fn test_window_settings_reach_the_store() {
        let registry = build(vec![ContextConfig::new(
            "foo",
            rate().with_bucket_size(Duration::from_secs(15)),
        )])
        .unwrap();

        let foo = registry.get("foo").unwrap();
        assert_eq!(foo.limit(), 10);
        assert_eq!(foo.store().window().slots(), 4);
        assert_eq!(foo.store().window().ttl(), Duration::from_secs(60));
    }

    macro_rules! invalid_registry_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (config, expected): (EngineConfig, ConfigError) = $value;
                    match Registry::build(&config, 4) {
                        Err(e) => assert_eq!(e, expected),
                        Ok(_) => panic!("registry built from invalid config"),
                    }
                }
            )*
        }
    }

    invalid_registry_tests! {
        empty_registry: (EngineConfig::new(vec![]), ConfigError::Empty),
        zero_sweep: (
            EngineConfig::new(vec![ContextConfig::new("foo", rate())])
                .with_sweep_interval(Duration::ZERO),
            ConfigError::InvalidSweep,
        ),
        duplicate_context: (
            EngineConfig::new(vec![
                ContextConfig::new("foo", rate()),
                ContextConfig::new("foo", rate()),
            ]),
            ConfigError::DuplicateContext("foo".to_string()),
        ),
        unknown_link: (
            EngineConfig::new(vec![ContextConfig::new("foo", rate()).link("bar", 1.0)]),
            ConfigError::UnknownLink { context: "foo".to_string(), target: "bar".to_string() },
        ),
        negative_weight: (
            EngineConfig::new(vec![
                ContextConfig::new("foo", rate()).link("bar", -1.0),
                ContextConfig::new("bar", rate()),
            ]),
            ConfigError::InvalidWeight {
                context: "foo".to_string(),
                target: "bar".to_string(),
                weight: -1.0,
            },
        ),
        zero_ttl: (
            EngineConfig::new(vec![ContextConfig::new(
                "foo",
                RateConfig::new(10, Duration::ZERO),
            )]),
            ConfigError::InvalidWindow {
                context: "foo".to_string(),
                reason: "ttl must be greater than zero".to_string(),
            },
        ),
        too_many_slots: (
            EngineConfig::new(vec![ContextConfig::new(
                "foo",
                RateConfig::new(10, Duration::from_secs(86_400))
                    .with_bucket_size(Duration::from_secs(1)),
            )]),
            ConfigError::InvalidWindow {
                context: "foo".to_string(),
                reason: "window needs 86400 sub-intervals, at most 4096 are allowed".to_string(),
            },
        ),
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        let result = build(vec![
            ContextConfig::new("foo", rate()).link("bar", f64::NAN),
            ContextConfig::new("bar", rate()),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidWeight { .. })));
    }
}
