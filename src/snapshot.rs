//! Serialized form of a [`GCounter`].
//!
//! A snapshot is the record `{ "i": identity, "e": { identity: count } }`.
//! Both fields are required; an empty `"e"` map is a freshly created
//! counter. Decoding never guesses: anything malformed is an
//! [`Error::CorruptSnapshot`](crate::Error::CorruptSnapshot).
//!
//! ```
//! use convergent::GCounter;
//!
//! let c = GCounter::with_identity("node-1");
//! c.increment_by(3)?;
//!
//! let bytes = c.to_json()?;
//! assert_eq!(bytes, br#"{"i":"node-1","e":{"node-1":3}}"#);
//!
//! let restored = GCounter::from_json(&bytes)?;
//! assert_eq!(restored, c);
//! # Ok::<(), convergent::Error>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::Result;
use crate::GCounter;

/// Transport- and storage-neutral state of a [`GCounter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GCounterSnapshot {
    /// Identity of the replica that produced the snapshot.
    #[serde(rename = "i")]
    pub identity: String,
    /// Per-replica counts.
    #[serde(rename = "e")]
    pub counts: BTreeMap<String, u64>,
}

impl GCounter {
    /// Capture the identity and per-replica counts.
    #[must_use]
    pub fn snapshot(&self) -> GCounterSnapshot {
        GCounterSnapshot {
            identity: self.identity().to_owned(),
            counts: self.counts(),
        }
    }

    /// Rebuild a counter from a snapshot, keeping its identity.
    #[must_use]
    pub fn from_snapshot(snapshot: GCounterSnapshot) -> Self {
        Self::from_parts(snapshot.identity, snapshot.counts)
    }

    /// Encode this counter as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptSnapshot`](crate::Error::CorruptSnapshot) if the
    /// encoder fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.snapshot())?)
    }

    /// Decode a counter from a JSON snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptSnapshot`](crate::Error::CorruptSnapshot) on invalid
    /// JSON, a missing field, a wrong type or a negative count.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let snapshot: GCounterSnapshot = serde_json::from_slice(bytes).map_err(|e| {
            warn!(error = %e, "failed to decode counter snapshot");
            e
        })?;
        Ok(Self::from_snapshot(snapshot))
    }
}

impl Serialize for GCounter {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GCounter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        GCounterSnapshot::deserialize(deserializer).map(Self::from_snapshot)
    }
}
