//! Per-context counter storage.

mod key_store;

pub use key_store::{DEFAULT_SHARDS, KeyStore};
