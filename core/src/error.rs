//! Errors returned by household commands.

use thiserror::Error;

use pledge_types::{DraftError, PromiseId, TransitionError};

use crate::ledger::LedgerError;

/// Failure of a create / verify / complete / fail command.
///
/// Every variant leaves the household it was invoked on unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid promise: {0}")]
    Draft(#[from] DraftError),
    #[error("promise {0} not found")]
    PromiseNotFound(PromiseId),
    #[error("promise {id}: {source}")]
    InvalidTransition {
        id: PromiseId,
        source: TransitionError,
    },
    #[error("settlement of promise {id} failed: {source}")]
    Settlement { id: PromiseId, source: LedgerError },
    #[error("no promise ids left to assign")]
    IdsExhausted,
}
