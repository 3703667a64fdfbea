//! Fault tokens.
//!
//! A [`Fault`] is the error half of a [`Maybe`](crate::Maybe): an immutable
//! record stamped with a process-unique [`FaultId`], its creation time, an
//! optional [`Label`] and a diagnostic payload.
//!
//! Two faults are equal only when they are the same fault. Sharing a label,
//! a payload or even a timestamp does not make them equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Error;
use crate::label::Label;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);
static LAST_MILLIS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Process-unique identity of a [`Fault`].
///
/// Encoded as a ULID whose time part is the fault's timestamp and whose
/// random part is a process-wide sequence number, so ids sort by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaultId(Ulid);

impl FaultId {
    fn mint(timestamp: DateTime<Utc>) -> Self {
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let millis = u64::try_from(timestamp.timestamp_millis()).unwrap_or_default();
        Self(Ulid::from_parts(millis, u128::from(sequence)))
    }

    /// Get the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for FaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FaultId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_str(s)
            .map(Self)
            .map_err(|e| Error::invalid_fault_id(s, e.to_string()))
    }
}

/// Read the clock, never going backwards within the process.
fn monotonic_now() -> DateTime<Utc> {
    let now = Utc::now();
    let observed = now.timestamp_millis();
    let issued = LAST_MILLIS.fetch_max(observed, Ordering::AcqRel).max(observed);
    DateTime::from_timestamp_millis(issued).unwrap_or(now)
}

/// The default diagnostic payload: a value with no structure.
///
/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Empty {}

/// A uniquely identified failure.
#[derive(Debug)]
pub struct Fault<F = Empty> {
    id: FaultId,
    timestamp: DateTime<Utc>,
    label: Option<Label>,
    data: F,
}

impl<F> Fault<F> {
    pub(crate) fn mint(label: Option<Label>, data: F) -> Self {
        let timestamp = monotonic_now();
        let id = FaultId::mint(timestamp);
        tracing::trace!(fault_id = %id, label = ?label, "minted fault");
        Self {
            id,
            timestamp,
            label,
            data,
        }
    }

    /// The fault's process-unique identity.
    #[must_use]
    pub const fn id(&self) -> FaultId {
        self.id
    }

    /// Creation time, truncated to the millisecond.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// The identity label, absent when the fault was described by nothing.
    #[must_use]
    pub const fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// The diagnostic payload.
    #[must_use]
    pub const fn data(&self) -> &F {
        &self.data
    }

    /// Consume the fault, keeping only its payload.
    #[must_use]
    pub fn into_data(self) -> F {
        self.data
    }
}

impl<F> PartialEq for Fault<F> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<F> Eq for Fault<F> {}

impl<F> Hash for Fault<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<F> fmt::Display for Fault<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "Fault({label})"),
            None => f.write_str("Fault()"),
        }
    }
}

impl<F: fmt::Debug> std::error::Error for Fault<F> {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fault_ids_are_unique() {
        let first = Fault::mint(Some(Label::from("x")), Empty {});
        let second = Fault::mint(Some(Label::from("x")), Empty {});
        assert_ne!(first.id(), second.id());
        assert_ne!(first, second);
        assert_eq!(first.label(), second.label());
    }

    #[test]
    fn test_fault_equals_itself() {
        let fault = Fault::mint(None, 7_u8);
        let same: &Fault<u8> = &fault;
        assert!(same == &fault);
        assert_eq!(same.id(), fault.id());
    }

    #[test]
    fn test_fault_hash_follows_identity() {
        let first = Fault::mint(Some(Label::from("same")), Empty {});
        let second = Fault::mint(Some(Label::from("same")), Empty {});
        let set: HashSet<FaultId> = [first.id(), second.id(), first.id()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_fault_exposes_payload() {
        let fault = Fault::mint(None, vec![1, 2, 3]);
        assert_eq!(fault.data(), &vec![1, 2, 3]);
        assert_eq!(fault.into_data(), vec![1, 2, 3]);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let stamps: Vec<i64> = (0..64)
            .map(|_| Fault::mint(None, Empty {}).timestamp_millis())
            .collect();
        assert!(stamps.windows(2).all(|pair| pair.first() <= pair.get(1)));
    }

    #[test]
    fn test_timestamp_has_millisecond_resolution() {
        let fault = Fault::mint(None, Empty {});
        assert_eq!(
            DateTime::from_timestamp_millis(fault.timestamp_millis()),
            Some(fault.timestamp())
        );
        assert_eq!(fault.timestamp().timestamp_millis(), fault.timestamp_millis());
    }

    #[test]
    fn test_fault_id_sorts_by_creation() {
        let first = Fault::mint(None, Empty {});
        let second = Fault::mint(None, Empty {});
        assert!(first.id() < second.id());
    }

    #[test]
    fn test_fault_id_round_trips_through_text() {
        let id = Fault::mint(None, Empty {}).id();
        let text = id.to_string();
        assert_eq!(text.len(), 26);
        assert_eq!(text.parse::<FaultId>(), Ok(id));
    }

    #[test]
    fn test_fault_id_serialization() {
        let id = Fault::mint(None, Empty {}).id();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: FaultId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_fault_id_rejects_garbage() {
        let parsed = "not-a-fault".parse::<FaultId>();
        assert!(matches!(parsed, Err(Error::InvalidFaultId { ref input, .. }) if input == "not-a-fault"));
    }

    #[test]
    fn test_fault_display() {
        assert_eq!(Fault::mint(Some(Label::from("error")), Empty {}).to_string(), "Fault(error)");
        assert_eq!(Fault::mint(Some(Label::Number(3.0)), Empty {}).to_string(), "Fault(3)");
        assert_eq!(Fault::mint(None, Empty {}).to_string(), "Fault()");
    }

    #[test]
    fn test_empty_serializes_as_empty_object() {
        assert_eq!(serde_json::to_string(&Empty {}).unwrap(), "{}");
    }
}
