//! # convergent
//!
//! Two state-based CRDTs for replicas that update locally without
//! coordination and later reconcile through a deterministic merge.
//!
//! A CRDT (Conflict-free Replicated Data Type) is a data structure that can be
//! replicated across multiple devices and updated independently. When replicas
//! are merged, they are guaranteed to converge to the same state without
//! requiring coordination or consensus.
//!
//! ## Quick Start
//!
//! ```
//! use convergent::prelude::*;
//!
//! // Grow-only counter
//! let c1 = GCounter::new();
//! c1.increment();
//!
//! let c2 = GCounter::new();
//! c2.increment_by(4)?;
//!
//! c1.merge(&c2);
//! assert_eq!(c1.value(), 5);
//!
//! // Last-write-wins element set
//! let s = LwwSet::with_bias(Bias::Remove);
//! s.add("apple");
//! assert!(s.contains(&"apple"));
//! # Ok::<(), convergent::Error>(())
//! ```
//!
//! ## Available CRDTs
//!
//! - [`GCounter`] - Grow-only counter (increment only)
//! - [`LwwSet`] - Last-write-wins element set with a configurable [`Bias`]
//!   for add/remove ties
//!
//! ## Sharing replicas
//!
//! Every operation takes `&self`. Each replica guards its state with a
//! read-write lock, and [`Crdt::merge`] acquires the two replicas' locks in a
//! fixed global order, so `a.merge(&b)` and `b.merge(&a)` may run on
//! different threads at the same time. Merging a replica into itself is a
//! no-op.
//!
//! ## Time and identity
//!
//! [`LwwSet`] stamps operations with a [`clock::Clock`]; tests use
//! [`clock::MockClock`] to control ordering and ties exactly. [`GCounter`]
//! draws its replica identity from an [`identity::IdGenerator`], random
//! UUIDs by default.
//!
//! ## Features
//!
//! - `serde` (default): the JSON snapshot codec for [`GCounter`] and serde
//!   support for [`Bias`], [`clock::Timestamp`] and [`GCounterDelta`].

#![warn(missing_docs)]

mod crdt;
mod error;
mod gcounter;
mod lock;
mod lww_set;
#[cfg(feature = "serde")]
mod snapshot;

pub mod clock;
pub mod identity;
pub mod prelude;

pub use crdt::{Crdt, DeltaCrdt};
pub use error::{Error, Result};
pub use gcounter::{GCounter, GCounterDelta};
pub use lww_set::{Bias, LwwSet};
#[cfg(feature = "serde")]
pub use snapshot::GCounterSnapshot;
