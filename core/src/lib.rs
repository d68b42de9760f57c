//! Core domain logic for Pledge.
//!
//! - [`ledger`]: member roster and balance settlement
//! - [`lifecycle`]: promise creation and the status state machine
//! - [`Household`]: the command/query facade over both
//! - [`store`]: persistence adapters for household snapshots

mod error;
mod household;
pub mod ledger;
pub mod lifecycle;
pub mod store;
mod summary;

pub use error::CommandError;
pub use household::{Household, SnapshotError};
pub use ledger::{LedgerError, MemberStats, Roster, RosterError, SettlementDeltas};
pub use lifecycle::{BalancePolicy, PromiseBook};
pub use store::{JsonFileStore, MemoryStore, Snapshot, Store, StoreError};
pub use summary::Summary;
