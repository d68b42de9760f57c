//! Aggregate counts over a promise collection.

use serde::Serialize;

use pledge_types::{Promise, PromiseStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
}

impl Summary {
    #[must_use]
    pub fn of(promises: &[Promise]) -> Self {
        promises.iter().fold(Self::default(), |mut acc, promise| {
            acc.total += 1;
            match promise.status() {
                PromiseStatus::Pending => acc.pending += 1,
                PromiseStatus::Active => acc.active += 1,
                PromiseStatus::Completed => acc.completed += 1,
                PromiseStatus::Failed => acc.failed += 1,
            }
            acc
        })
    }

    /// Completed share of all promises, in whole percent (floor). Zero when empty.
    #[must_use]
    pub fn completion_rate(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 / self.total) as u8
    }
}
