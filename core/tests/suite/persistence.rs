//! Household state through the storage adapters.

use pledge_core::{Household, JsonFileStore, MemoryStore, SnapshotError, Store};
use pledge_types::{PromiseKind, PromiseStatus};

use crate::common::{balance_of, deadline, draft, two_member_household};

fn played_out() -> Household {
    let household = two_member_household();
    let (household, reward) = household
        .create(draft("B", "A", 200, PromiseKind::Reward))
        .unwrap();
    let (household, _pending) = household
        .create(draft("B", "A", 30, PromiseKind::Penalty))
        .unwrap();
    household.verify(reward, true).unwrap().complete(reward).unwrap()
}

#[test]
fn json_store_reloads_identical_household() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::in_dir(dir.path());
    let household = played_out();

    store.save(&household.snapshot()).unwrap();
    let loaded = Household::from_snapshot(store.load().unwrap().unwrap()).unwrap();

    assert_eq!(loaded, household);
    assert_eq!(balance_of(&loaded, "A"), 800);
    assert_eq!(loaded.promises()[1].deadline(), deadline());
    assert_eq!(loaded.promises()[1].status(), PromiseStatus::Pending);
}

#[test]
fn reloaded_household_keeps_lifecycle_rules() {
    let mut store = MemoryStore::new();
    store.save(&played_out().snapshot()).unwrap();
    let loaded = Household::from_snapshot(store.load().unwrap().unwrap()).unwrap();

    let completed = loaded.promises()[0].id();
    assert!(loaded.complete(completed).is_err());

    let pending = loaded.promises()[1].id();
    let (next, id) = loaded
        .create(draft("B", "A", 10, PromiseKind::Reward))
        .unwrap();
    assert!(id > pending);
    assert_eq!(next.promises().len(), 3);
}

#[test]
fn tampered_file_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::in_dir(dir.path());
    let mut snapshot = played_out().snapshot();
    snapshot.members.truncate(1);
    store.save(&snapshot).unwrap();

    let err = Household::from_snapshot(store.load().unwrap().unwrap()).unwrap_err();
    assert!(matches!(err, SnapshotError::UnknownParticipant { .. }));
}
