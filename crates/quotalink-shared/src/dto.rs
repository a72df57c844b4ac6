//! Data Transfer Objects - response bodies for the sidecar API.

use serde::{Deserialize, Serialize};

/// Body of a decision response: `{"allowed": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub allowed: bool,
}

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}
