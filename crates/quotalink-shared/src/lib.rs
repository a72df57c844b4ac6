//! # Quotalink Shared
//!
//! Wire types shared between the sidecar and its clients.

pub mod dto;
pub mod response;

pub use dto::{DecisionResponse, HealthResponse};
pub use response::ErrorResponse;
