//! Promise collection and the status lifecycle.
//!
//! Every operation takes `&self` and hands back a replacement collection (and
//! roster, for settling transitions). Settlement runs before the replacement is
//! built, so a failed settlement never leaves a promise marked terminal.

use tracing::debug;

use pledge_types::{
    DraftError, Outcome, Promise, PromiseDraft, PromiseId, PromiseStatus, PromiseTerms,
};

use crate::error::CommandError;
use crate::ledger::Roster;

/// Whether creation rejects promises whose creator cannot currently cover the amount.
///
/// Funds are not reserved at creation under either policy; balances only move
/// at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    #[default]
    Enforce,
    Advisory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromiseBook {
    promises: Vec<Promise>,
}

impl PromiseBook {
    #[must_use]
    pub fn new(promises: Vec<Promise>) -> Self {
        Self { promises }
    }

    #[must_use]
    pub fn promises(&self) -> &[Promise] {
        &self.promises
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.promises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.promises.is_empty()
    }

    pub fn get(&self, id: PromiseId) -> Result<&Promise, CommandError> {
        self.promises
            .iter()
            .find(|p| p.id() == id)
            .ok_or(CommandError::PromiseNotFound(id))
    }

    pub fn list_by_status(&self, status: PromiseStatus) -> impl Iterator<Item = &Promise> {
        self.promises.iter().filter(move |p| p.status() == status)
    }

    /// Settled promises, completed and failed alike.
    pub fn history(&self) -> impl Iterator<Item = &Promise> {
        self.promises.iter().filter(|p| p.status().is_terminal())
    }

    /// Next available id (max existing + 1).
    fn next_id(&self) -> Result<PromiseId, CommandError> {
        match self.promises.iter().map(Promise::id).max() {
            None => Ok(PromiseId::FIRST),
            Some(max) => max.next().ok_or(CommandError::IdsExhausted),
        }
    }

    /// Validate `draft` against `roster` and build a pending promise.
    ///
    /// The result is not part of the book until passed to [`Self::appended`].
    pub fn create(
        &self,
        draft: PromiseDraft,
        roster: &Roster,
        policy: BalancePolicy,
    ) -> Result<Promise, CommandError> {
        let valid = draft.validate()?;
        let performer = roster
            .find_by_name(&valid.performer)
            .map_err(DraftError::from)?;
        let creator = roster
            .find_by_name(&valid.creator)
            .map_err(DraftError::from)?;

        if policy == BalancePolicy::Enforce && creator.balance() < valid.amount.get() {
            return Err(DraftError::InsufficientBalance {
                balance: creator.balance(),
                amount: valid.amount.get(),
            }
            .into());
        }

        let id = self.next_id()?;
        Ok(Promise::pending(
            id,
            PromiseTerms {
                title: valid.title,
                description: valid.description,
                category: valid.category,
                performer: performer.id(),
                creator: creator.id(),
                amount: valid.amount,
                kind: valid.kind,
                deadline: valid.deadline,
            },
        ))
    }

    #[must_use]
    pub fn appended(&self, promise: Promise) -> Self {
        let mut promises = self.promises.clone();
        promises.push(promise);
        Self { promises }
    }

    pub fn verify(&self, id: PromiseId, approved: bool) -> Result<Self, CommandError> {
        let current = self.get(id)?;
        let updated = current
            .verified(approved)
            .map_err(|source| CommandError::InvalidTransition { id, source })?;
        debug!(promise = %id, approved, status = %updated.status(), "Verified promise");
        Ok(self.replaced(updated))
    }

    pub fn complete(&self, id: PromiseId, roster: &Roster) -> Result<(Self, Roster), CommandError> {
        self.settle(id, Outcome::Completed, roster)
    }

    pub fn fail(&self, id: PromiseId, roster: &Roster) -> Result<(Self, Roster), CommandError> {
        self.settle(id, Outcome::Failed, roster)
    }

    fn settle(
        &self,
        id: PromiseId,
        outcome: Outcome,
        roster: &Roster,
    ) -> Result<(Self, Roster), CommandError> {
        let current = self.get(id)?;
        let updated = current
            .settled(outcome)
            .map_err(|source| CommandError::InvalidTransition { id, source })?;
        let roster = roster
            .settle(&updated, outcome)
            .map_err(|source| CommandError::Settlement { id, source })?;
        Ok((self.replaced(updated), roster))
    }

    fn replaced(&self, updated: Promise) -> Self {
        let promises = self
            .promises
            .iter()
            .map(|p| {
                if p.id() == updated.id() {
                    updated.clone()
                } else {
                    p.clone()
                }
            })
            .collect();
        Self { promises }
    }
}
