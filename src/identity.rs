//! Replica identity generation.
//!
//! A [`GCounter`](crate::GCounter) keys its own entry by a replica identity
//! drawn once at construction. The generator is a capability handed to the
//! constructor, so tests can make identities deterministic.
//!
//! ```
//! use convergent::GCounter;
//!
//! let ids = std::cell::Cell::new(0);
//! let next = || {
//!     ids.set(ids.get() + 1);
//!     format!("replica-{}", ids.get())
//! };
//!
//! assert_eq!(GCounter::with_generator(&next).identity(), "replica-1");
//! assert_eq!(GCounter::with_generator(&next).identity(), "replica-2");
//! ```

use uuid::Uuid;

/// A source of unique replica identities.
pub trait IdGenerator {
    /// Produce an identity not produced before by any replica.
    fn generate(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random (version 4) UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
