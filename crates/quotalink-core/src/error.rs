//! Domain-level error types.

use thiserror::Error;

/// Configuration errors - fatal when building the engine at startup.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no contexts configured")]
    Empty,

    #[error("context {0} is declared more than once")]
    DuplicateContext(String),

    #[error("context {context} links unknown context {target}")]
    UnknownLink { context: String, target: String },

    #[error("invalid window for context {context}: {reason}")]
    InvalidWindow { context: String, reason: String },

    #[error("invalid weight {weight} on link {context} -> {target}")]
    InvalidWeight {
        context: String,
        target: String,
        weight: f64,
    },

    #[error("sweep interval must be greater than zero")]
    InvalidSweep,

    #[error("{msg}")]
    MalformedRate { msg: String },

    #[error("failed to parse configuration document: {0}")]
    Document(String),
}

/// Engine errors - the only failures visible on the decision path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("context not found: {0}")]
    NotFound(String),
}
