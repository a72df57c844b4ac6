//! # Quotalink Core
//!
//! The domain layer of the quotalink rate-limiting sidecar.
//! Windowed counters, context configuration and decisions live here,
//! free of storage and runtime dependencies.

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::{ConfigError, EngineError};
