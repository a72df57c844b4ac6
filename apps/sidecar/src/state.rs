//! Application state - shared across all handlers.

use std::sync::Arc;

use quotalink_core::ports::RateLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}
