use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock, Timestamp};
use crate::error::{Error, Result};
use crate::lock;
use crate::Crdt;

/// Tie-break policy for an element added and removed at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Bias {
    /// The element stays in the set.
    #[default]
    Add,
    /// The element leaves the set.
    Remove,
}

impl FromStr for Bias {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("add") {
            Ok(Bias::Add)
        } else if s.eq_ignore_ascii_case("remove") {
            Ok(Bias::Remove)
        } else {
            Err(Error::NoSuchBias { name: s.to_owned() })
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bias::Add => "add",
            Bias::Remove => "remove",
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
struct Registers<T: Ord> {
    adds: BTreeMap<T, Timestamp>,
    removes: BTreeMap<T, Timestamp>,
}

impl<T: Ord> Registers<T> {
    fn is_member(&self, value: &T, bias: Bias) -> bool {
        let Some(added) = self.adds.get(value) else {
            return false;
        };
        match self.removes.get(value) {
            None => true,
            Some(removed) if added > removed => true,
            Some(removed) if added < removed => false,
            Some(_) => bias == Bias::Add,
        }
    }
}

/// Raise every timestamp in `into` to at least the matching one in `from`.
/// Returns how many entries changed.
fn join<T: Ord + Clone>(into: &mut BTreeMap<T, Timestamp>, from: &BTreeMap<T, Timestamp>) -> usize {
    let mut raised = 0;
    for (value, &ts) in from {
        match into.get_mut(value) {
            Some(current) if *current >= ts => {}
            Some(current) => {
                *current = ts;
                raised += 1;
            }
            None => {
                into.insert(value.clone(), ts);
                raised += 1;
            }
        }
    }
    raised
}

/// A last-writer-wins element set (LWW-Element-Set).
///
/// Every element carries two registers: the instant it was last added and
/// the instant it was last removed. An element is a member when its add
/// time is later than its remove time; exact ties go to the set's [`Bias`].
/// Removing an element that was never added does not make it a member, and
/// remove records are kept forever so that later merges still see them.
///
/// Timestamps come from a [`Clock`], the system clock unless replaced with
/// [`with_clock`](LwwSet::with_clock).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use convergent::clock::MockClock;
/// use convergent::prelude::*;
///
/// let clock = MockClock::new();
/// let s1 = LwwSet::new().with_clock(clock.clone());
/// let s2 = LwwSet::new().with_clock(clock.clone());
///
/// s1.add("apple");
/// clock.advance(Duration::from_secs(1));
/// s2.remove(&"apple");
///
/// s1.merge(&s2);
/// assert!(!s1.contains(&"apple")); // the later remove wins
///
/// clock.advance(Duration::from_secs(1));
/// s1.add("apple");
/// assert!(s1.contains(&"apple")); // and a later add wins again
/// ```
pub struct LwwSet<T: Ord + Clone> {
    bias: Bias,
    clock: Arc<dyn Clock>,
    registers: RwLock<Registers<T>>,
}

impl<T: Ord + Clone> LwwSet<T> {
    /// Create an empty add-biased set on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bias(Bias::default())
    }

    /// Create an empty set with the given tie-break bias.
    #[must_use]
    pub fn with_bias(bias: Bias) -> Self {
        Self {
            bias,
            clock: Arc::new(SystemClock::new()),
            registers: RwLock::new(Registers {
                adds: BTreeMap::new(),
                removes: BTreeMap::new(),
            }),
        }
    }

    /// Create an empty set from a bias name, `"add"` or `"remove"` in any
    /// case.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchBias`] for any other name.
    pub fn with_bias_name(name: &str) -> Result<Self> {
        Ok(Self::with_bias(name.parse()?))
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.set_clock(clock);
        self
    }

    /// Replace the time source.
    ///
    /// Needs exclusive access, so it can only happen before the set is
    /// shared.
    pub fn set_clock<C: Clock + 'static>(&mut self, clock: C) {
        self.clock = Arc::new(clock);
    }

    /// The tie-break bias fixed at construction.
    #[must_use]
    pub fn bias(&self) -> Bias {
        self.bias
    }

    /// Record that `value` was added now.
    ///
    /// Overwrites any earlier local add time for the same element.
    pub fn add(&self, value: T) {
        let now = self.clock.now();
        self.registers.write().adds.insert(value, now);
        trace!(at = %now, "recorded add");
    }

    /// Record that `value` was removed now.
    ///
    /// The element need not be present; the remove record is kept either
    /// way and takes part in later merges.
    pub fn remove(&self, value: &T) {
        let now = self.clock.now();
        self.registers.write().removes.insert(value.clone(), now);
        trace!(at = %now, "recorded remove");
    }

    /// Whether `value` is currently a member.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.registers.read().is_member(value, self.bias)
    }

    /// Time of the latest add recorded for `value`.
    #[must_use]
    pub fn added_at(&self, value: &T) -> Option<Timestamp> {
        self.registers.read().adds.get(value).copied()
    }

    /// Time of the latest remove recorded for `value`.
    #[must_use]
    pub fn removed_at(&self, value: &T) -> Option<Timestamp> {
        self.registers.read().removes.get(value).copied()
    }

    /// Current members, in ascending order.
    #[must_use]
    pub fn elements(&self) -> Vec<T> {
        let registers = self.registers.read();
        registers
            .adds
            .keys()
            .filter(|value| registers.is_member(value, self.bias))
            .cloned()
            .collect()
    }

    /// Number of current members.
    #[must_use]
    pub fn len(&self) -> usize {
        let registers = self.registers.read();
        registers
            .adds
            .keys()
            .filter(|value| registers.is_member(value, self.bias))
            .count()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Ord + Clone> Default for LwwSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Clone for LwwSet<T> {
    fn clone(&self) -> Self {
        Self {
            bias: self.bias,
            clock: Arc::clone(&self.clock),
            registers: RwLock::new(self.registers.read().clone()),
        }
    }
}

/// Two sets are equal when they hold the same registers under the same bias.
/// The clock is not compared.
impl<T: Ord + Clone> PartialEq for LwwSet<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.bias != other.bias {
            return false;
        }
        match lock::read_read(&self.registers, &other.registers) {
            Some((a, b)) => *a == *b,
            None => true,
        }
    }
}

impl<T: Ord + Clone> Eq for LwwSet<T> {}

impl<T: Ord + Clone + fmt::Debug> fmt::Debug for LwwSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registers = self.registers.read();
        f.debug_struct("LwwSet")
            .field("bias", &self.bias)
            .field("clock", &self.clock)
            .field("adds", &registers.adds)
            .field("removes", &registers.removes)
            .finish()
    }
}

impl<T: Ord + Clone> Crdt for LwwSet<T> {
    fn merge(&self, other: &Self) {
        let Some((mut ours, theirs)) = lock::write_read(&self.registers, &other.registers) else {
            return;
        };
        let adds = join(&mut ours.adds, &theirs.adds);
        let removes = join(&mut ours.removes, &theirs.removes);
        debug!(
            adds,
            removes,
            tracked = ours.adds.len(),
            tombstones = ours.removes.len(),
            "merged set registers"
        );
    }
}
