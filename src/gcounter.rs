use core::fmt;
use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identity::{IdGenerator, UuidGenerator};
use crate::lock;
use crate::{Crdt, DeltaCrdt};

/// A grow-only counter (G-Counter).
///
/// Each replica maintains its own count. The total value is the sum of all
/// replica counts. This counter can only be incremented, never decremented.
///
/// All operations take `&self`; the per-replica map sits behind a
/// read-write lock, so a counter can be shared across threads in an `Arc`.
///
/// # Example
///
/// ```
/// use convergent::prelude::*;
///
/// let c1 = GCounter::with_identity("node-1");
/// c1.increment();
/// c1.increment();
///
/// let c2 = GCounter::with_identity("node-2");
/// c2.increment();
///
/// c1.merge(&c2);
/// assert_eq!(c1.value(), 3);
/// ```
pub struct GCounter {
    identity: String,
    counts: RwLock<BTreeMap<String, u64>>,
}

impl GCounter {
    /// Create a new G-Counter with a random UUID identity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(&UuidGenerator)
    }

    /// Create a new G-Counter whose identity comes from `generator`.
    pub fn with_generator<G: IdGenerator + ?Sized>(generator: &G) -> Self {
        Self::with_identity(generator.generate())
    }

    /// Create a new G-Counter for the given replica identity.
    ///
    /// The caller is responsible for the identity being unique among the
    /// replicas that will ever merge with each other.
    pub fn with_identity(identity: impl Into<String>) -> Self {
        Self::from_parts(identity.into(), BTreeMap::new())
    }

    pub(crate) fn from_parts(identity: String, counts: BTreeMap<String, u64>) -> Self {
        Self {
            identity,
            counts: RwLock::new(counts),
        }
    }

    /// Increment this replica's count by 1.
    pub fn increment(&self) {
        self.bump(1);
    }

    /// Increment this replica's count by `delta`.
    ///
    /// # Errors
    ///
    /// [`Error::NegativeIncrement`] if `delta` is negative; the counter is
    /// left untouched.
    pub fn increment_by(&self, delta: i64) -> Result<()> {
        let n = u64::try_from(delta).map_err(|_| {
            warn!(replica = %self.identity, delta, "rejected negative increment");
            Error::NegativeIncrement { delta }
        })?;
        self.bump(n);
        Ok(())
    }

    fn bump(&self, n: u64) {
        let mut counts = self.counts.write();
        let entry = counts.entry(self.identity.clone()).or_insert(0);
        *entry = entry.saturating_add(n);
    }

    /// Get the total counter value across all replicas.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.counts
            .read()
            .values()
            .fold(0u64, |acc, &n| acc.saturating_add(n))
    }

    /// Get this replica's identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Get the count recorded for a specific replica.
    #[must_use]
    pub fn count_for(&self, identity: &str) -> u64 {
        self.counts.read().get(identity).copied().unwrap_or(0)
    }

    /// Number of replicas with an entry in this counter.
    #[must_use]
    pub fn replicas(&self) -> usize {
        self.counts.read().len()
    }

    /// Copy of the per-replica counts.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counts.read().clone()
    }
}

/// Raise every entry of `into` to at least the matching entry of `from`.
/// Returns how many entries changed.
fn join(into: &mut BTreeMap<String, u64>, from: &BTreeMap<String, u64>) -> usize {
    let mut raised = 0;
    for (identity, &count) in from {
        let entry = into.entry(identity.clone()).or_insert(0);
        if count > *entry {
            *entry = count;
            raised += 1;
        }
    }
    raised
}

impl Default for GCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone is the same replica, not a new one: it keeps this counter's
/// identity. Increments made independently on the original and the clone
/// land on one entry, and merging them back keeps only the larger count, so
/// the smaller side's increments are lost. Start a new replica with
/// [`GCounter::with_identity`] or [`GCounter::with_generator`] and
/// [`merge`](Crdt::merge) the state into it instead.
impl Clone for GCounter {
    fn clone(&self) -> Self {
        Self::from_parts(self.identity.clone(), self.counts())
    }
}

impl PartialEq for GCounter {
    fn eq(&self, other: &Self) -> bool {
        if self.identity != other.identity {
            return false;
        }
        match lock::read_read(&self.counts, &other.counts) {
            Some((a, b)) => *a == *b,
            None => true,
        }
    }
}

impl Eq for GCounter {}

impl fmt::Debug for GCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GCounter")
            .field("identity", &self.identity)
            .field("counts", &*self.counts.read())
            .finish()
    }
}

impl fmt::Display for GCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Crdt for GCounter {
    fn merge(&self, other: &Self) {
        let Some((mut counts, theirs)) = lock::write_read(&self.counts, &other.counts) else {
            return;
        };
        let raised = join(&mut counts, &theirs);
        debug!(
            replica = %self.identity,
            from = %other.identity,
            raised,
            "merged counter state"
        );
    }
}

/// Delta for [`GCounter`]: only the entries where `self` is ahead of `other`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GCounterDelta {
    counts: BTreeMap<String, u64>,
}

impl GCounterDelta {
    /// Whether the delta carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of replica entries carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

impl DeltaCrdt for GCounter {
    type Delta = GCounterDelta;

    fn delta(&self, other: &Self) -> GCounterDelta {
        let Some((ours, theirs)) = lock::read_read(&self.counts, &other.counts) else {
            return GCounterDelta::default();
        };
        let counts = ours
            .iter()
            .filter(|&(identity, &count)| count > theirs.get(identity).copied().unwrap_or(0))
            .map(|(identity, &count)| (identity.clone(), count))
            .collect();
        GCounterDelta { counts }
    }

    fn apply_delta(&self, delta: &GCounterDelta) {
        let raised = join(&mut self.counts.write(), &delta.counts);
        debug!(replica = %self.identity, raised, "applied counter delta");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_counter_is_zero() {
        let c = GCounter::with_identity("a");
        assert_eq!(c.value(), 0);
        assert_eq!(c.replicas(), 0);
    }

    #[test]
    fn new_counters_get_distinct_identities() {
        let a = GCounter::new();
        let b = GCounter::new();
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn increment_increases_value() {
        let c = GCounter::with_identity("a");
        c.increment();
        assert_eq!(c.value(), 1);
        c.increment();
        assert_eq!(c.value(), 2);
    }

    #[test]
    fn increment_by() {
        let c = GCounter::with_identity("a");
        c.increment_by(5).unwrap();
        assert_eq!(c.value(), 5);
        c.increment_by(0).unwrap();
        assert_eq!(c.value(), 5);
    }

    #[test]
    fn negative_increment_is_rejected() {
        let c = GCounter::with_identity("a");
        c.increment_by(3).unwrap();

        let err = c.increment_by(-5).unwrap_err();
        assert!(matches!(err, Error::NegativeIncrement { delta: -5 }));
        assert_eq!(c.value(), 3);
    }

    #[test]
    fn merge_takes_max() {
        let c1 = GCounter::with_identity("a");
        c1.increment();
        c1.increment();

        let c2 = GCounter::with_identity("a");
        c2.increment();

        // c1 has a=2, c2 has a=1, merge should keep a=2
        c1.merge(&c2);
        assert_eq!(c1.value(), 2);
    }

    #[test]
    fn merge_different_identities() {
        let c1 = GCounter::with_identity("a");
        c1.increment();

        let c2 = GCounter::with_identity("b");
        c2.increment();
        c2.increment();

        c1.merge(&c2);
        assert_eq!(c1.value(), 3);
        assert_eq!(c1.replicas(), 2);
    }

    #[test]
    fn merge_is_commutative() {
        let c1 = GCounter::with_identity("a");
        c1.increment();

        let c2 = GCounter::with_identity("b");
        c2.increment();
        c2.increment();

        let left = c1.clone();
        left.merge(&c2);

        let right = c2.clone();
        right.merge(&c1);

        assert_eq!(left.value(), right.value());
        assert_eq!(left.counts(), right.counts());
    }

    #[test]
    fn merge_is_idempotent() {
        let c1 = GCounter::with_identity("a");
        c1.increment();

        let c2 = GCounter::with_identity("b");
        c2.increment();

        c1.merge(&c2);
        let after_first = c1.clone();
        c1.merge(&c2);

        assert_eq!(c1, after_first);
    }

    #[test]
    fn self_merge_is_a_no_op() {
        let c = GCounter::with_identity("a");
        c.increment_by(4).unwrap();
        c.merge(&c);
        assert_eq!(c.value(), 4);
        assert_eq!(c.replicas(), 1);
    }

    #[test]
    fn merge_never_lowers_local_entry() {
        let c1 = GCounter::with_identity("a");
        c1.increment_by(10).unwrap();

        let stale = GCounter::with_identity("b");
        stale.merge(&c1);
        c1.increment();

        c1.merge(&stale);
        assert_eq!(c1.count_for("a"), 11);
    }

    #[test]
    fn count_for_identity() {
        let c = GCounter::with_identity("a");
        c.increment();
        c.increment();
        assert_eq!(c.count_for("a"), 2);
        assert_eq!(c.count_for("b"), 0);
    }

    #[test]
    fn display_shows_total() {
        let c = GCounter::with_identity("a");
        c.increment_by(42).unwrap();
        assert_eq!(c.to_string(), "42");
    }

    #[test]
    fn equality_includes_identity() {
        let a = GCounter::with_identity("a");
        let b = GCounter::with_identity("b");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn clone_keeps_identity_and_shares_its_entry() {
        let original = GCounter::with_identity("a");
        original.increment_by(2).unwrap();

        let copy = original.clone();
        assert_eq!(copy.identity(), "a");

        original.increment_by(3).unwrap();
        copy.increment_by(1).unwrap();
        original.merge(&copy);

        // Both sides bumped entry "a"; merge keeps the larger count only.
        assert_eq!(original.count_for("a"), 5);
        assert_eq!(original.value(), 5);
    }

    #[test]
    fn fresh_replica_keeps_independent_increments() {
        let original = GCounter::with_identity("a");
        original.increment_by(2).unwrap();

        let forked = GCounter::with_identity("b");
        forked.merge(&original);

        original.increment_by(3).unwrap();
        forked.increment_by(1).unwrap();
        original.merge(&forked);

        assert_eq!(original.value(), 6);
    }

    #[test]
    fn delta_contains_only_new_entries() {
        let c1 = GCounter::with_identity("a");
        c1.increment();
        c1.increment();

        let c2 = GCounter::with_identity("b");
        c2.increment();

        let d = c1.delta(&c2);
        // c1 has a=2, c2 has b=1: delta should contain a=2
        assert_eq!(d.counts.get("a"), Some(&2));
        assert!(!d.counts.contains_key("b"));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn apply_delta_updates_state() {
        let c1 = GCounter::with_identity("a");
        c1.increment();
        c1.increment();

        let c2 = GCounter::with_identity("b");
        c2.increment();

        let d = c1.delta(&c2);
        c2.apply_delta(&d);
        assert_eq!(c2.value(), 3);
    }

    #[test]
    fn delta_is_empty_when_equal() {
        let c1 = GCounter::with_identity("a");
        c1.increment();

        let c2 = c1.clone();
        assert!(c1.delta(&c2).is_empty());
        assert!(c1.delta(&c1).is_empty());
    }

    #[test]
    fn delta_equivalent_to_full_merge() {
        let c1 = GCounter::with_identity("a");
        c1.increment();
        c1.increment();

        let c2 = GCounter::with_identity("b");
        c2.increment();

        let full = c2.clone();
        full.merge(&c1);

        let via_delta = c2.clone();
        via_delta.apply_delta(&c1.delta(&c2));

        assert_eq!(full, via_delta);
    }
}
