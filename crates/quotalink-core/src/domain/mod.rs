//! Domain entities - windowed counters and decisions.

mod bucket;
mod decision;

pub use bucket::{Bucket, MAX_SLOTS, Window, WindowError};
pub use decision::Decision;
