//! Decision engine: registry lookup, consumption and link resolution.

mod context;
mod registry;
mod resolver;


use std::sync::Arc;
use std::time::Duration;

use quotalink_core::config::EngineConfig;
use quotalink_core::domain::Decision;
use quotalink_core::ports::{Clock, RateLimiter};
use quotalink_core::{ConfigError, EngineError};

use crate::clock::SystemClock;
use crate::store::DEFAULT_SHARDS;
use crate::sweeper::Sweeper;

pub use context::{Context, ResolvedLink};
pub use registry::Registry;
pub use resolver::LinkResolver;

/// Facade over the registry, the link resolver and the clock.
///
/// Cheap to clone; clones share the same registry and counters.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Build the registry from `config` and run on the system clock.
    pub fn from_config(config: &EngineConfig, shards: usize) -> Result<Self, ConfigError> {
        let registry = Registry::build(config, shards)?;
        Ok(Self::new(Arc::new(registry), Arc::new(SystemClock)))
    }

    /// [`Engine::from_config`] with the default shard count.
    pub fn with_defaults(config: &EngineConfig) -> Result<Self, ConfigError> {
        Self::from_config(config, DEFAULT_SHARDS)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Consume one unit at the current time.
    pub fn check_and_consume(&self, context: &str, key: &str) -> Result<Decision, EngineError> {
        self.check_and_consume_at(context, key, self.clock.now_millis())
    }

    /// Consume one unit at `now` (milliseconds since the UNIX epoch).
    pub fn check_and_consume_at(
        &self,
        context: &str,
        key: &str,
        now: u64,
    ) -> Result<Decision, EngineError> {
        self.check_and_consume_units(context, key, 1, now)
    }

    /// Consume `units` at `now` and decide.
    ///
    /// Consumption is recorded whether or not the request is allowed, so a
    /// caller hammering past its quota keeps the window full.
    pub fn check_and_consume_units(
        &self,
        context: &str,
        key: &str,
        units: u64,
        now: u64,
    ) -> Result<Decision, EngineError> {
        let ctx = self
            .registry
            .get(context)
            .ok_or_else(|| EngineError::NotFound(context.to_string()))?;

        // The shard guard is released before linked stores are read, so a
        // mutual link can never wait on a lock this call already holds.
        let (own, limit) = ctx.store().consume_and_utilization(key, now, units);
        let utilization = LinkResolver::new(&self.registry).effective_utilization(ctx, key, own, now);

        let decision = Decision::evaluate(utilization, limit);
        if !decision.allowed {
            tracing::trace!(context, key, utilization, limit, "Request denied");
        }

        Ok(decision)
    }

    /// A sweeper over this engine's registry and clock.
    pub fn sweeper(&self, interval: Duration) -> Result<Sweeper, ConfigError> {
        Sweeper::new(self.registry.clone(), self.clock.clone(), interval)
    }
}

impl RateLimiter for Engine {
    fn check_and_consume(&self, context: &str, key: &str) -> Result<Decision, EngineError> {
        Engine::check_and_consume(self, context, key)
    }
}
