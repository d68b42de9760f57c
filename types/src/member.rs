//! Family members and their ledger balances.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MemberId, NonEmptyString};

/// A household member.
///
/// `balance` is signed and never clamped: a penalty may push it below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: NonEmptyString,
    #[serde(default)]
    role: String,
    balance: i64,
}

impl Member {
    #[must_use]
    pub fn new(id: MemberId, name: NonEmptyString, role: impl Into<String>, balance: i64) -> Self {
        Self {
            id,
            name,
            role: role.into(),
            balance,
        }
    }

    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    #[must_use]
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Copy of this member carrying a new balance.
    #[must_use]
    pub fn with_balance(&self, balance: i64) -> Self {
        Self {
            balance,
            ..self.clone()
        }
    }

    /// Whether `name` refers to this member (surrounding whitespace ignored).
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.trim() == name.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("member {0} not found")]
pub struct MemberNotFound(String);

impl MemberNotFound {
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Self(format!("{:?}", name.trim()))
    }

    #[must_use]
    pub fn by_id(id: MemberId) -> Self {
        Self(id.to_string())
    }

    /// The name or id that failed to resolve, as displayed.
    #[must_use]
    pub fn requested(&self) -> &str {
        &self.0
    }
}
