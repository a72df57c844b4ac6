//! Rate limiting port.

use crate::domain::Decision;
use crate::error::EngineError;

/// Decision service - what the request front end depends on.
///
/// Implementations never block on I/O; the call is CPU-bound apart from
/// short lock acquisitions.
pub trait RateLimiter: Send + Sync {
    /// Register one unit of consumption for `key` in `context` and decide
    /// whether the request is allowed.
    fn check_and_consume(&self, context: &str, key: &str) -> Result<Decision, EngineError>;
}
