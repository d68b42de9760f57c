//! Promise data model and status state machine.
//!
//! ```text
//! [Pending] --verify(true)--> [Active] --complete--> [Completed]
//!     |                           |
//! verify(false)                  fail
//!     v                           v
//! [Failed]                    [Failed]
//! ```
//!
//! Completed and Failed are terminal. Transitions never mutate in place: each
//! returns a new `Promise` and leaves the original untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MemberId, NonEmptyString, PromiseId};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {raw:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    raw: String,
}

// ── Kind ─────────────────────────────────────────────────────

/// Whether the amount is paid out on success or deducted on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseKind {
    #[default]
    Reward,
    Penalty,
}

impl PromiseKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reward => "reward",
            Self::Penalty => "penalty",
        }
    }
}

impl FromStr for PromiseKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reward" => Ok(Self::Reward),
            "penalty" => Ok(Self::Penalty),
            _ => Err(ParseEnumError {
                kind: "promise kind",
                raw: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PromiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Status ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseStatus {
    Pending,
    Active,
    Completed,
    Failed,
}

/// Terminal result of an active promise, the input to ledger settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Completed,
    Failed,
}

impl Outcome {
    #[must_use]
    pub const fn status(self) -> PromiseStatus {
        match self {
            Self::Completed => PromiseStatus::Completed,
            Self::Failed => PromiseStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid promise transition from {from} to {to}")]
pub struct TransitionError {
    pub from: PromiseStatus,
    pub to: PromiseStatus,
}

impl PromiseStatus {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Active, Self::Completed, Self::Failed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Progress shown for a promise in this status, in percent.
    #[must_use]
    pub const fn progress_percent(self) -> u8 {
        match self {
            Self::Completed => 100,
            Self::Active => 50,
            Self::Pending | Self::Failed => 0,
        }
    }

    /// Approval decision on a pending promise.
    pub fn try_verify(self, approved: bool) -> Result<Self, TransitionError> {
        let to = if approved { Self::Active } else { Self::Failed };
        match self {
            Self::Pending => Ok(to),
            from => Err(TransitionError { from, to }),
        }
    }

    /// Settling transition out of `Active`.
    pub fn try_settle(self, outcome: Outcome) -> Result<Self, TransitionError> {
        let to = outcome.status();
        match self {
            Self::Active => Ok(to),
            from => Err(TransitionError { from, to }),
        }
    }
}

impl FromStr for PromiseStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "promise status",
                raw: s.to_owned(),
            })
    }
}

impl fmt::Display for PromiseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Amount ───────────────────────────────────────────────────

/// A strictly positive integer amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("amount must be a positive integer (got {raw:?})")]
pub struct AmountError {
    raw: String,
}

impl AmountError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Amount {
    pub fn try_new(value: i64) -> Result<Self, AmountError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(AmountError {
                raw: value.to_string(),
            })
        }
    }

    /// Parse user input such as `"10000"` or `"10,000"`.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
        digits
            .parse::<i64>()
            .ok()
            .and_then(|value| Self::try_new(value).ok())
            .ok_or_else(|| AmountError {
                raw: raw.to_owned(),
            })
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Promise ──────────────────────────────────────────────────

/// Validated, id-resolved terms of a new promise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseTerms {
    pub title: NonEmptyString,
    pub description: String,
    pub category: String,
    pub performer: MemberId,
    pub creator: MemberId,
    pub amount: Amount,
    pub kind: PromiseKind,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promise {
    id: PromiseId,
    title: NonEmptyString,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    performer: MemberId,
    creator: MemberId,
    amount: Amount,
    kind: PromiseKind,
    deadline: DateTime<Utc>,
    status: PromiseStatus,
}

impl Promise {
    /// A freshly created promise awaiting verification.
    #[must_use]
    pub fn pending(id: PromiseId, terms: PromiseTerms) -> Self {
        Self {
            id,
            title: terms.title,
            description: terms.description,
            category: terms.category,
            performer: terms.performer,
            creator: terms.creator,
            amount: terms.amount,
            kind: terms.kind,
            deadline: terms.deadline,
            status: PromiseStatus::Pending,
        }
    }

    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn performer(&self) -> MemberId {
        self.performer
    }

    #[must_use]
    pub fn creator(&self) -> MemberId {
        self.creator
    }

    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    #[must_use]
    pub fn kind(&self) -> PromiseKind {
        self.kind
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    #[must_use]
    pub fn status(&self) -> PromiseStatus {
        self.status
    }

    pub fn verified(&self, approved: bool) -> Result<Self, TransitionError> {
        let status = self.status.try_verify(approved)?;
        Ok(self.with_status(status))
    }

    pub fn settled(&self, outcome: Outcome) -> Result<Self, TransitionError> {
        let status = self.status.try_settle(outcome)?;
        Ok(self.with_status(status))
    }

    fn with_status(&self, status: PromiseStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    /// Whole days until the deadline, rounded up. Zero or negative once due.
    #[must_use]
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        let secs = (self.deadline - now).num_seconds();
        let days = secs / SECONDS_PER_DAY;
        // Integer division truncates toward zero, which is already the ceiling below zero.
        if secs % SECONDS_PER_DAY > 0 {
            days + 1
        } else {
            days
        }
    }
}
