//! Raw creation input and its field-level validation.
//!
//! A draft carries what a form collected, names and all. Validation here covers
//! everything decidable without the roster; name resolution and the balance
//! check happen in the lifecycle manager.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Amount, MemberNotFound, NonEmptyString, PromiseKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Performer,
    Creator,
    Amount,
    Deadline,
}

impl DraftField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Performer => "performer",
            Self::Creator => "creator",
            Self::Amount => "amount",
            Self::Deadline => "deadline",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("missing required field: {field}")]
    MissingField { field: DraftField },
    #[error("performer and creator must be different members")]
    SameParticipant,
    #[error("amount must be a positive integer (got {raw:?})")]
    InvalidAmount { raw: String },
    #[error("insufficient balance: {balance} available, {amount} required")]
    InsufficientBalance { balance: i64, amount: i64 },
    #[error(transparent)]
    UnknownMember(#[from] MemberNotFound),
}

/// Creation request as collected from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromiseDraft {
    pub title: Option<String>,
    pub description: String,
    pub category: String,
    pub performer: Option<String>,
    pub creator: Option<String>,
    pub amount: Option<String>,
    pub kind: PromiseKind,
    pub deadline: Option<DateTime<Utc>>,
}

/// A draft whose fields passed validation; participants are still names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub title: NonEmptyString,
    pub description: String,
    pub category: String,
    pub performer: NonEmptyString,
    pub creator: NonEmptyString,
    pub amount: Amount,
    pub kind: PromiseKind,
    pub deadline: DateTime<Utc>,
}

fn required(value: Option<String>, field: DraftField) -> Result<NonEmptyString, DraftError> {
    value
        .and_then(|raw| NonEmptyString::new(raw.trim()).ok())
        .ok_or(DraftError::MissingField { field })
}

impl PromiseDraft {
    /// Check presence, distinct participants and amount, in that order.
    pub fn validate(self) -> Result<ValidatedDraft, DraftError> {
        let title = required(self.title, DraftField::Title)?;
        let performer = required(self.performer, DraftField::Performer)?;
        let creator = required(self.creator, DraftField::Creator)?;
        let raw_amount = required(self.amount, DraftField::Amount)?;
        let deadline = self.deadline.ok_or(DraftError::MissingField {
            field: DraftField::Deadline,
        })?;

        if performer == creator {
            return Err(DraftError::SameParticipant);
        }

        let amount = Amount::parse(&raw_amount).map_err(|err| DraftError::InvalidAmount {
            raw: err.raw().to_owned(),
        })?;

        Ok(ValidatedDraft {
            title,
            description: self.description,
            category: self.category,
            performer,
            creator,
            amount,
            kind: self.kind,
            deadline,
        })
    }
}
