//! Approximate sliding-window counting with a fixed ring of sub-intervals.
//!
//! A [`Window`] splits the trailing `ttl` into `ceil(ttl / bucket_size)`
//! sub-intervals. Each [`Bucket`] keeps one counter per sub-interval, stamped
//! with the epoch (`now / bucket_size`) it was last written in. A slot whose
//! epoch has fallen out of the window reads as zero and is reset the next time
//! the ring wraps onto it, so memory per key never grows.
//!
//! When `bucket_size` does not divide `ttl` the ring covers slightly more than
//! `ttl` (its span, `slots * bucket_size`). Idleness is measured against the
//! span so a bucket is only idle once every slot reads as zero.
//!
//! All timestamps are milliseconds since the UNIX epoch.

use std::time::Duration;

use thiserror::Error;

/// Upper bound on sub-intervals per window.
pub const MAX_SLOTS: usize = 4096;

/// Window geometry rejected at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("ttl must be greater than zero")]
    ZeroTtl,

    #[error("bucket size must be greater than zero")]
    ZeroBucketSize,

    #[error("bucket size {bucket_size_ms}ms exceeds ttl {ttl_ms}ms")]
    BucketLargerThanTtl { bucket_size_ms: u64, ttl_ms: u64 },

    #[error("window needs {slots} sub-intervals, at most {max} are allowed")]
    TooManySlots { slots: u64, max: usize },
}

/// Ring geometry shared by every bucket of one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    ttl_ms: u64,
    bucket_size_ms: u64,
    span_ms: u64,
    slots: usize,
}

impl Window {
    /// Build a window of length `ttl` split into `bucket_size` sub-intervals.
    ///
    /// Without a bucket size the whole ttl is a single sub-interval: a plain
    /// fixed window that resets every `ttl`.
    pub fn new(ttl: Duration, bucket_size: Option<Duration>) -> Result<Self, WindowError> {
        let ttl_ms = duration_millis(ttl);
        if ttl_ms == 0 {
            return Err(WindowError::ZeroTtl);
        }

        let bucket_size_ms = bucket_size.map(duration_millis).unwrap_or(ttl_ms);
        if bucket_size_ms == 0 {
            return Err(WindowError::ZeroBucketSize);
        }
        if bucket_size_ms > ttl_ms {
            return Err(WindowError::BucketLargerThanTtl {
                bucket_size_ms,
                ttl_ms,
            });
        }

        let slots = ttl_ms.div_ceil(bucket_size_ms);
        if slots > MAX_SLOTS as u64 {
            return Err(WindowError::TooManySlots {
                slots,
                max: MAX_SLOTS,
            });
        }

        Ok(Self {
            ttl_ms,
            bucket_size_ms,
            span_ms: slots.saturating_mul(bucket_size_ms),
            slots: slots as usize,
        })
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn bucket_size(&self) -> Duration {
        Duration::from_millis(self.bucket_size_ms)
    }

    /// Time covered by the whole ring; at least `ttl`.
    pub fn span(&self) -> Duration {
        Duration::from_millis(self.span_ms)
    }

    /// Number of sub-intervals in the ring.
    pub fn slots(&self) -> usize {
        self.slots
    }

    fn epoch(&self, now: u64) -> u64 {
        now / self.bucket_size_ms
    }

    fn index(&self, epoch: u64) -> usize {
        (epoch % self.slots as u64) as usize
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    epoch: u64,
    count: u64,
}

/// Windowed usage for one key within one context.
///
/// The bucket does not carry its own geometry; callers pass the owning
/// context's [`Window`] on every operation.
#[derive(Debug, Clone)]
pub struct Bucket {
    slots: Box<[Slot]>,
    last_touched: u64,
}

impl Bucket {
    /// A zeroed bucket sized for `window`.
    pub fn new(window: &Window) -> Self {
        Self {
            slots: vec![Slot::default(); window.slots].into_boxed_slice(),
            last_touched: 0,
        }
    }

    /// Register `units` of consumption at `now` and return the utilization
    /// of the window afterwards.
    pub fn consume(&mut self, window: &Window, now: u64, units: u64) -> u64 {
        // A timestamp behind the last touch is folded forward so a clock
        // regression cannot reset newer slots.
        let now = now.max(self.last_touched);
        let epoch = window.epoch(now);
        let slot = &mut self.slots[window.index(epoch)];

        if slot.epoch != epoch {
            slot.epoch = epoch;
            slot.count = 0;
        }
        slot.count = slot.count.saturating_add(units);
        self.last_touched = now;

        self.utilization(window, now)
    }

    /// Sum of the slots that still fall inside the window ending at `now`.
    pub fn utilization(&self, window: &Window, now: u64) -> u64 {
        let current = window.epoch(now.max(self.last_touched));
        let oldest = current.saturating_sub(window.slots as u64 - 1);

        self.slots
            .iter()
            .filter(|slot| slot.epoch >= oldest && slot.epoch <= current)
            .fold(0u64, |total, slot| total.saturating_add(slot.count))
    }

    /// Timestamp of the most recent consumption.
    pub fn last_touched(&self) -> u64 {
        self.last_touched
    }

    /// True once nothing has touched the bucket for longer than the window
    /// span, at which point [`Bucket::utilization`] reads zero.
    pub fn is_idle(&self, window: &Window, now: u64) -> bool {
        now.saturating_sub(self.last_touched) > window.span_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = 1000;

    fn window(ttl_secs: u64, bucket_secs: Option<u64>) -> Window {
        Window::new(
            Duration::from_secs(ttl_secs),
            bucket_secs.map(Duration::from_secs),
        )
        .unwrap()
    }

    #[test]
    fn test_window_slot_count() {
        assert_eq!(window(60, None).slots(), 1);
        assert_eq!(window(60, Some(10)).slots(), 6);
        assert_eq!(window(60, Some(7)).slots(), 9);
        assert_eq!(window(60, Some(60)).slots(), 1);

        assert_eq!(window(60, Some(10)).span(), Duration::from_secs(60));
        assert_eq!(window(60, Some(7)).span(), Duration::from_secs(63));
    }

    #[test]
    fn test_window_rejects_bad_geometry() {
        assert_eq!(
            Window::new(Duration::ZERO, None),
            Err(WindowError::ZeroTtl)
        );
        assert_eq!(
            Window::new(Duration::from_secs(10), Some(Duration::ZERO)),
            Err(WindowError::ZeroBucketSize)
        );
        assert!(matches!(
            Window::new(Duration::from_secs(10), Some(Duration::from_secs(11))),
            Err(WindowError::BucketLargerThanTtl { .. })
        ));
        assert_eq!(
            Window::new(Duration::from_secs(86_400), Some(Duration::from_secs(1))),
            Err(WindowError::TooManySlots {
                slots: 86_400,
                max: MAX_SLOTS
            })
        );
        assert_eq!(window(4096, Some(1)).slots(), MAX_SLOTS);
    }

    #[test]
    fn test_consume_accumulates_within_window() {
        let w = window(60, Some(10));
        let mut bucket = Bucket::new(&w);

        assert_eq!(bucket.consume(&w, 1000 * SEC, 1), 1);
        assert_eq!(bucket.consume(&w, 1005 * SEC, 1), 2);
        assert_eq!(bucket.consume(&w, 1030 * SEC, 3), 5);
        assert_eq!(bucket.utilization(&w, 1030 * SEC), 5);
        assert_eq!(bucket.last_touched(), 1030 * SEC);
    }

    #[test]
    fn test_fixed_window_resets_on_boundary() {
        let w = window(60, None);
        let mut bucket = Bucket::new(&w);

        bucket.consume(&w, 1200 * SEC, 1);
        bucket.consume(&w, 1259 * SEC, 1);
        assert_eq!(bucket.utilization(&w, 1259 * SEC), 2);

        // 1260 starts the next fixed window.
        assert_eq!(bucket.consume(&w, 1260 * SEC, 1), 1);
    }

    #[test]
    fn test_sliding_ring_expires_one_sub_interval_at_a_time() {
        let w = window(30, Some(10));
        let mut bucket = Bucket::new(&w);

        bucket.consume(&w, 100 * SEC, 1); // epoch 10
        bucket.consume(&w, 110 * SEC, 2); // epoch 11
        bucket.consume(&w, 120 * SEC, 4); // epoch 12
        assert_eq!(bucket.utilization(&w, 125 * SEC), 7);

        // epoch 13 evicts epoch 10 only
        assert_eq!(bucket.utilization(&w, 130 * SEC), 6);
        // epoch 14 evicts epoch 11
        assert_eq!(bucket.utilization(&w, 140 * SEC), 4);
        // epoch 15 evicts everything
        assert_eq!(bucket.utilization(&w, 150 * SEC), 0);
    }

    #[test]
    fn test_stale_slot_is_reset_when_ring_wraps() {
        let w = window(30, Some(10));
        let mut bucket = Bucket::new(&w);

        bucket.consume(&w, 100 * SEC, 5); // epoch 10, slot 1
        // epoch 13 lands on slot 1 again and must not inherit the 5
        assert_eq!(bucket.consume(&w, 130 * SEC, 1), 1);
    }

    #[test]
    fn test_long_idle_gap_reads_zero() {
        let w = window(30, Some(7));
        let mut bucket = Bucket::new(&w);

        bucket.consume(&w, 100 * SEC, 3);
        assert_eq!(bucket.utilization(&w, 10_000 * SEC), 0);
        assert_eq!(bucket.consume(&w, 10_000 * SEC, 1), 1);
    }

    #[test]
    fn test_clock_regression_does_not_wipe_newer_slots() {
        let w = window(30, Some(10));
        let mut bucket = Bucket::new(&w);

        bucket.consume(&w, 125 * SEC, 2);
        assert_eq!(bucket.consume(&w, 95 * SEC, 1), 3);
        assert_eq!(bucket.last_touched(), 125 * SEC);
    }

    #[test]
    fn test_is_idle_after_ttl() {
        let w = window(30, Some(10));
        let mut bucket = Bucket::new(&w);
        bucket.consume(&w, 100 * SEC, 1);

        assert!(!bucket.is_idle(&w, 130 * SEC));
        assert!(bucket.is_idle(&w, 130 * SEC + 1));
    }

    #[test]
    fn test_uneven_ring_is_not_idle_while_counts_remain() {
        // 60s split into 7s sub-intervals: 9 slots spanning 63s.
        let w = window(60, Some(7));
        let t0 = 7 * SEC * 242_857_143;
        let mut bucket = Bucket::new(&w);
        bucket.consume(&w, t0, 5);

        assert_eq!(bucket.utilization(&w, t0 + 61 * SEC), 5);
        assert!(!bucket.is_idle(&w, t0 + 61 * SEC));

        assert_eq!(bucket.utilization(&w, t0 + 63 * SEC), 0);
        assert!(bucket.is_idle(&w, t0 + 63 * SEC + 1));
    }
}
