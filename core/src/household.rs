//! The household: one roster and one promise book, replaced wholesale per command.
//!
//! This is the only surface UI handlers talk to. Commands take `&self` and return
//! a new `Household`; the old value stays valid, so callers swap their stored
//! state only on success.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use pledge_types::{MemberId, Promise, PromiseDraft, PromiseId, PromiseStatus};

use crate::error::CommandError;
use crate::ledger::{MemberStats, Roster, RosterError};
use crate::lifecycle::{BalancePolicy, PromiseBook};
use crate::store::Snapshot;
use crate::summary::Summary;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("duplicate promise id {0}")]
    DuplicatePromiseId(PromiseId),
    #[error("promise {promise} references unknown member {member}")]
    UnknownParticipant { promise: PromiseId, member: MemberId },
    #[error("promise {0} has the same performer and creator")]
    SameParticipant(PromiseId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Household {
    roster: Roster,
    book: PromiseBook,
    policy: BalancePolicy,
}

impl Household {
    #[must_use]
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            book: PromiseBook::default(),
            policy: BalancePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(self, policy: BalancePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Rebuild a household from persisted state, checking referential integrity.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let roster = Roster::new(snapshot.members)?;
        let mut seen = HashSet::new();
        for promise in &snapshot.promises {
            if !seen.insert(promise.id()) {
                return Err(SnapshotError::DuplicatePromiseId(promise.id()));
            }
            if promise.creator() == promise.performer() {
                return Err(SnapshotError::SameParticipant(promise.id()));
            }
            for member in [promise.creator(), promise.performer()] {
                if roster.find(member).is_err() {
                    return Err(SnapshotError::UnknownParticipant {
                        promise: promise.id(),
                        member,
                    });
                }
            }
        }
        Ok(Self {
            roster,
            book: PromiseBook::new(snapshot.promises),
            policy: BalancePolicy::default(),
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            members: self.roster.members().to_vec(),
            promises: self.book.promises().to_vec(),
        }
    }

    // ── Commands ─────────────────────────────────────────────

    pub fn create(&self, draft: PromiseDraft) -> Result<(Self, PromiseId), CommandError> {
        let promise = self
            .book
            .create(draft, &self.roster, self.policy)
            .inspect_err(|err| warn!("Rejected promise draft: {err}"))?;
        let id = promise.id();
        debug!(promise = %id, kind = %promise.kind(), amount = %promise.amount(), "Created promise");
        Ok((
            Self {
                book: self.book.appended(promise),
                ..self.clone()
            },
            id,
        ))
    }

    pub fn verify(&self, id: PromiseId, approved: bool) -> Result<Self, CommandError> {
        let book = self
            .book
            .verify(id, approved)
            .inspect_err(|err| warn!("Verify rejected: {err}"))?;
        Ok(Self {
            book,
            ..self.clone()
        })
    }

    pub fn complete(&self, id: PromiseId) -> Result<Self, CommandError> {
        let (book, roster) = self
            .book
            .complete(id, &self.roster)
            .inspect_err(|err| warn!("Complete rejected: {err}"))?;
        Ok(Self {
            roster,
            book,
            policy: self.policy,
        })
    }

    pub fn fail(&self, id: PromiseId) -> Result<Self, CommandError> {
        let (book, roster) = self
            .book
            .fail(id, &self.roster)
            .inspect_err(|err| warn!("Fail rejected: {err}"))?;
        Ok(Self {
            roster,
            book,
            policy: self.policy,
        })
    }

    // ── Queries ──────────────────────────────────────────────

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn promises(&self) -> &[Promise] {
        self.book.promises()
    }

    #[must_use]
    pub fn policy(&self) -> BalancePolicy {
        self.policy
    }

    pub fn promise(&self, id: PromiseId) -> Result<&Promise, CommandError> {
        self.book.get(id)
    }

    pub fn list_by_status(&self, status: PromiseStatus) -> impl Iterator<Item = &Promise> {
        self.book.list_by_status(status)
    }

    pub fn history(&self) -> impl Iterator<Item = &Promise> {
        self.book.history()
    }

    #[must_use]
    pub fn member_stats(&self) -> Vec<MemberStats<'_>> {
        self.roster.derive_stats(self.book.promises())
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(self.book.promises())
    }
}
