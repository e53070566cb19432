//! Convenient re-exports for common usage.
//!
//! ```
//! use convergent::prelude::*;
//! ```

pub use crate::Bias;
pub use crate::Crdt;
pub use crate::DeltaCrdt;
pub use crate::GCounter;
pub use crate::LwwSet;
