//! Ports - trait definitions the engine and its callers are written against.

mod clock;
mod rate_limit;

pub use clock::Clock;
pub use rate_limit::RateLimiter;
