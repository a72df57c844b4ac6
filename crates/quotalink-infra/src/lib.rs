//! # Quotalink Infrastructure
//!
//! The rate-limiting engine behind the ports defined in `quotalink-core`:
//! sharded per-context key stores, the context registry with its resolved
//! link graph, the decision facade and the background sweeper.
//!
//! ## Feature Flags
//!
//! - `test-helpers` - exposes [`ManualClock`] outside this crate's own tests

pub mod clock;
pub mod engine;
pub mod store;
pub mod sweeper;

pub use clock::SystemClock;
pub use engine::{Context, Engine, LinkResolver, Registry};
pub use store::KeyStore;
pub use sweeper::{SweepReport, Sweeper, SweeperHandle};

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::ManualClock;
