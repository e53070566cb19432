/// Core trait implemented by every replicated type in this crate.
///
/// A CRDT (Conflict-free Replicated Data Type) guarantees that concurrent
/// updates on different replicas will converge to the same state after merging,
/// without requiring coordination.
///
/// Replicas guard their state internally, so `merge` takes `&self` and a
/// replica can be shared across threads behind an `Arc` while peers merge
/// into it.
///
/// # Properties
///
/// All implementations must satisfy:
/// - **Commutativity:** `a.merge(b)` and `b.merge(a)` observe the same state
/// - **Associativity:** `a.merge(b.merge(c))` observes `a.merge(b).merge(c)`
/// - **Idempotency:** `a.merge(a)` leaves `a` unchanged
pub trait Crdt {
    /// Merge another replica's state into this one.
    ///
    /// After merging, `self` holds the least upper bound of both states.
    /// Merging a replica into itself is a no-op.
    fn merge(&self, other: &Self);
}

/// Extension trait for delta-state CRDTs.
///
/// Instead of shipping the full state, a replica can compute the part of its
/// state a peer is missing and ship only that.
///
/// # Example
///
/// ```
/// use convergent::prelude::*;
///
/// let c1 = GCounter::with_identity("a");
/// c1.increment();
/// c1.increment();
///
/// let c2 = GCounter::with_identity("b");
/// c2.increment();
///
/// // Generate a delta from c1 that c2 doesn't have
/// let delta = c1.delta(&c2);
///
/// // Apply just the delta instead of full state merge
/// c2.apply_delta(&delta);
/// assert_eq!(c2.value(), 3);
/// ```
pub trait DeltaCrdt: Crdt {
    /// The type of delta produced by this CRDT.
    type Delta;

    /// Generate a delta containing changes in `self` that `other` does not have.
    fn delta(&self, other: &Self) -> Self::Delta;

    /// Apply a delta to this replica's state.
    ///
    /// Equivalent to merging the state that produced the delta.
    fn apply_delta(&self, delta: &Self::Delta);
}
