//! Pluggable time sources.
//!
//! Every timestamped operation reads the current instant through the
//! [`Clock`] trait. Production code uses [`SystemClock`]; tests drive a
//! [`MockClock`] by hand so that ties and orderings are reproducible.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use convergent::clock::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let t0 = clock.now();
//!
//! clock.advance(Duration::from_secs(60));
//! assert!(clock.now() > t0);
//!
//! clock.rewind(Duration::from_secs(120));
//! assert!(clock.now() < t0);
//! ```

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time, in nanoseconds since the Unix epoch.
///
/// Totally ordered; two timestamps compare equal only when they were taken
/// at the same nanosecond. A `u64` covers instants up to the year 2554.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Build a timestamp from nanoseconds since the epoch.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Nanoseconds since the epoch.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// A source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock time from [`SystemTime`].
///
/// Successive readings from one instance are strictly increasing: when the
/// system clock has not moved (or has gone backward) since the last
/// reading, the previous reading plus one nanosecond is returned instead.
/// An add followed at once by a remove on the same set is therefore always
/// ordered, never a tie.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    /// Create a system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let physical = duration_nanos(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        );
        let next = |last: u64| physical.max(last.saturating_add(1));
        let last = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(next(last)))
            .unwrap_or_else(|last| last);
        Timestamp(next(last))
    }
}

/// A manually driven clock.
///
/// Time stands still until moved with [`advance`](MockClock::advance),
/// [`rewind`](MockClock::rewind) or [`set`](MockClock::set). Clones share the
/// same instant, so a test can hand one clone to a set and keep another to
/// steer it.
#[derive(Debug, Clone)]
pub struct MockClock {
    nanos: Arc<AtomicU64>,
}

impl MockClock {
    /// Starting point of a fresh mock clock: 2000-01-01T00:00:00Z.
    ///
    /// Far enough from zero that rewinding by minutes or hours in tests
    /// never saturates.
    pub const START: Timestamp = Timestamp(946_684_800_000_000_000);

    /// Create a mock clock positioned at [`MockClock::START`].
    #[must_use]
    pub fn new() -> Self {
        Self::at(Self::START)
    }

    /// Create a mock clock positioned at `ts`.
    #[must_use]
    pub fn at(ts: Timestamp) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(ts.0)),
        }
    }

    /// Move time forward by `by`, stopping at the far end.
    pub fn advance(&self, by: Duration) {
        let delta = duration_nanos(by);
        self.nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(delta))
            })
            .ok();
    }

    /// Move time backward by `by`, stopping at the epoch.
    pub fn rewind(&self, by: Duration) {
        let delta = duration_nanos(by);
        self.nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_sub(delta))
            })
            .ok();
    }

    /// Jump to an absolute instant.
    pub fn set(&self, ts: Timestamp) {
        self.nanos.store(ts.0, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.nanos.load(Ordering::SeqCst))
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
