use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(u32);

impl MemberId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a promise within a household.
///
/// Monotonically assigned at creation. Zero is structurally unrepresentable
/// via `NonZeroU64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromiseId(NonZeroU64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("promise id must be a non-zero 64-bit integer")]
pub struct PromiseIdError;

impl PromiseId {
    pub const FIRST: Self = Self(NonZeroU64::MIN);

    pub fn try_new(value: u64) -> Result<Self, PromiseIdError> {
        NonZeroU64::new(value).map(Self).ok_or(PromiseIdError)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0.get()
    }

    /// The id following this one, or `None` once the id space is exhausted.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<u64> for PromiseId {
    type Error = PromiseIdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl std::str::FromStr for PromiseId {
    type Err = PromiseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().trim_start_matches('#');
        let value: u64 = raw.parse().map_err(|_err| PromiseIdError)?;
        Self::try_new(value)
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::PromiseId;

    #[test]
    fn promise_id_rejects_zero() {
        assert!(PromiseId::try_new(0).is_err());
        assert!("0".parse::<PromiseId>().is_err());
    }

    #[test]
    fn promise_id_deserialize_rejects_zero() {
        let parsed: Result<PromiseId, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
    }

    #[test]
    fn promise_id_parses_hash_prefix() {
        let id: PromiseId = "#12".parse().unwrap();
        assert_eq!(id.value(), 12);
    }

    #[test]
    fn promise_id_next_stops_at_max() {
        let max = PromiseId::try_new(u64::MAX).unwrap();
        assert!(max.next().is_none());
        assert_eq!(PromiseId::FIRST.next().map(PromiseId::value), Some(2));
    }
}
