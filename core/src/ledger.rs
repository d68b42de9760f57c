//! Member roster and balance settlement.
//!
//! The roster is an immutable snapshot: settlement computes every new balance
//! first and only then builds a replacement roster, so a lookup failure or an
//! overflow leaves the original untouched.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use pledge_types::{
    Amount, Member, MemberId, MemberNotFound, Outcome, Promise, PromiseKind, PromiseStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("duplicate member id {0}")]
    DuplicateId(MemberId),
    #[error("duplicate member name {0:?}")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    MemberNotFound(#[from] MemberNotFound),
    #[error("balance of member {member} would overflow")]
    BalanceOverflow { member: MemberId },
}

// ── Settlement rule ──────────────────────────────────────────

/// Signed balance adjustments produced by one settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettlementDeltas {
    pub creator: i64,
    pub performer: i64,
}

impl SettlementDeltas {
    /// A reward moves `amount` from creator to performer on completion; a
    /// penalty deducts `amount` from the performer alone on failure. The other
    /// outcome of each kind moves nothing.
    #[must_use]
    pub fn for_settlement(kind: PromiseKind, outcome: Outcome, amount: Amount) -> Self {
        let amount = amount.get();
        match (kind, outcome) {
            (PromiseKind::Reward, Outcome::Completed) => Self {
                creator: -amount,
                performer: amount,
            },
            (PromiseKind::Penalty, Outcome::Failed) => Self {
                creator: 0,
                performer: -amount,
            },
            (PromiseKind::Reward, Outcome::Failed) | (PromiseKind::Penalty, Outcome::Completed) => {
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.creator == 0 && self.performer == 0
    }
}

// ── Roster ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<Member>,
}

/// A member together with counts over the promises they perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberStats<'a> {
    pub member: &'a Member,
    pub active_count: usize,
    pub total_count: usize,
}

impl Roster {
    /// Build a roster, rejecting duplicate ids and duplicate names.
    pub fn new(members: Vec<Member>) -> Result<Self, RosterError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for member in &members {
            if !ids.insert(member.id()) {
                return Err(RosterError::DuplicateId(member.id()));
            }
            let name = member.name().trim();
            if !names.insert(name) {
                return Err(RosterError::DuplicateName(name.to_owned()));
            }
        }
        Ok(Self { members })
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }

    pub fn find(&self, id: MemberId) -> Result<&Member, MemberNotFound> {
        self.members
            .iter()
            .find(|member| member.id() == id)
            .ok_or_else(|| MemberNotFound::by_id(id))
    }

    pub fn find_by_name(&self, name: &str) -> Result<&Member, MemberNotFound> {
        self.members
            .iter()
            .find(|member| member.answers_to(name))
            .ok_or_else(|| MemberNotFound::by_name(name))
    }

    /// Sum of all balances. Widened so that it cannot overflow.
    #[must_use]
    pub fn total_balance(&self) -> i128 {
        self.members.iter().map(|m| i128::from(m.balance())).sum()
    }

    /// Apply the settlement of `promise` ending in `outcome`, returning a new roster.
    ///
    /// Both participants must exist even when the rule moves nothing.
    pub fn settle(&self, promise: &Promise, outcome: Outcome) -> Result<Self, LedgerError> {
        let deltas = SettlementDeltas::for_settlement(promise.kind(), outcome, promise.amount());
        let creator = self.find(promise.creator())?;
        let performer = self.find(promise.performer())?;

        let creator_balance = creator
            .balance()
            .checked_add(deltas.creator)
            .ok_or(LedgerError::BalanceOverflow {
                member: creator.id(),
            })?;
        let performer_balance = performer
            .balance()
            .checked_add(deltas.performer)
            .ok_or(LedgerError::BalanceOverflow {
                member: performer.id(),
            })?;

        debug!(
            promise = %promise.id(),
            kind = %promise.kind(),
            outcome = %outcome.status(),
            creator_delta = deltas.creator,
            performer_delta = deltas.performer,
            "Settled promise"
        );

        if deltas.is_zero() {
            return Ok(self.clone());
        }

        let (creator_id, performer_id) = (creator.id(), performer.id());
        let members = self
            .members
            .iter()
            .map(|member| {
                if member.id() == creator_id {
                    member.with_balance(creator_balance)
                } else if member.id() == performer_id {
                    member.with_balance(performer_balance)
                } else {
                    member.clone()
                }
            })
            .collect();
        Ok(Self { members })
    }

    /// Per-member promise counts, in roster order. Pure projection.
    #[must_use]
    pub fn derive_stats<'a>(&'a self, promises: &[Promise]) -> Vec<MemberStats<'a>> {
        self.members
            .iter()
            .map(|member| {
                let performed = promises.iter().filter(|p| p.performer() == member.id());
                let (active_count, total_count) =
                    performed.fold((0, 0), |(active, total), promise| {
                        let is_active = promise.status() == PromiseStatus::Active;
                        (active + usize::from(is_active), total + 1)
                    });
                MemberStats {
                    member,
                    active_count,
                    total_count,
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
