//! End-to-end household scenarios.

use pledge_core::{BalancePolicy, CommandError};
use pledge_types::{DraftError, PromiseKind, PromiseStatus};

use crate::common::{balance_of, draft, two_member_household};

#[test]
fn reward_completed_moves_funds_from_creator_to_performer() {
    let household = two_member_household();

    let (household, id) = household
        .create(draft("B", "A", 200, PromiseKind::Reward))
        .unwrap();
    assert_eq!(household.promise(id).unwrap().status(), PromiseStatus::Pending);

    let household = household.verify(id, true).unwrap();
    assert_eq!(household.promise(id).unwrap().status(), PromiseStatus::Active);

    let household = household.complete(id).unwrap();
    assert_eq!(
        household.promise(id).unwrap().status(),
        PromiseStatus::Completed
    );
    assert_eq!(balance_of(&household, "A"), 800);
    assert_eq!(balance_of(&household, "B"), 200);
}

#[test]
fn penalty_failed_deducts_from_performer_only() {
    let household = two_member_household();

    let (household, id) = household
        .create(draft("B", "A", 200, PromiseKind::Penalty))
        .unwrap();
    let household = household.verify(id, true).unwrap();
    let household = household.fail(id).unwrap();

    assert_eq!(household.promise(id).unwrap().status(), PromiseStatus::Failed);
    assert_eq!(balance_of(&household, "B"), -200);
    assert_eq!(balance_of(&household, "A"), 1_000);
}

#[test]
fn same_participant_leaves_state_unchanged() {
    let household = two_member_household();
    let before = household.clone();

    let err = household
        .create(draft("A", "A", 200, PromiseKind::Reward))
        .unwrap_err();

    assert_eq!(err, CommandError::Draft(DraftError::SameParticipant));
    assert_eq!(household, before);
    assert!(household.promises().is_empty());
}

#[test]
fn rejected_verification_is_terminal_without_settlement() {
    let household = two_member_household();
    let (household, id) = household
        .create(draft("B", "A", 200, PromiseKind::Penalty))
        .unwrap();

    let household = household.verify(id, false).unwrap();
    assert_eq!(household.promise(id).unwrap().status(), PromiseStatus::Failed);
    assert_eq!(balance_of(&household, "B"), 0);

    assert!(matches!(
        household.fail(id),
        Err(CommandError::InvalidTransition { .. })
    ));
    assert!(matches!(
        household.verify(id, true),
        Err(CommandError::InvalidTransition { .. })
    ));
}

#[test]
fn double_completion_does_not_double_settle() {
    let household = two_member_household();
    let (household, id) = household
        .create(draft("B", "A", 200, PromiseKind::Reward))
        .unwrap();
    let household = household.verify(id, true).unwrap().complete(id).unwrap();

    let err = household.complete(id).unwrap_err();
    assert!(matches!(err, CommandError::InvalidTransition { .. }));
    assert_eq!(balance_of(&household, "A"), 800);
    assert_eq!(balance_of(&household, "B"), 200);
}

#[test]
fn failed_command_leaves_previous_household_usable() {
    let household = two_member_household();
    let (pending, id) = household
        .create(draft("B", "A", 200, PromiseKind::Reward))
        .unwrap();

    // Completing straight from pending is rejected; the pending household is intact.
    assert!(pending.complete(id).is_err());
    assert_eq!(pending.promise(id).unwrap().status(), PromiseStatus::Pending);
    assert_eq!(pending.roster(), household.roster());
}

#[test]
fn summary_and_stats_track_lifecycle() {
    let household = two_member_household().with_policy(BalancePolicy::Advisory);
    let (household, first) = household
        .create(draft("B", "A", 100, PromiseKind::Reward))
        .unwrap();
    let (household, second) = household
        .create(draft("A", "B", 50, PromiseKind::Penalty))
        .unwrap();
    let household = household.verify(first, true).unwrap();

    let summary = household.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.active, 1);
    assert_eq!(summary.pending, 1);

    let household = household.complete(first).unwrap();
    let household = household.verify(second, false).unwrap();
    let summary = household.summary();
    assert_eq!((summary.completed, summary.failed), (1, 1));
    assert_eq!(summary.completion_rate(), 50);
    assert_eq!(household.history().count(), 2);
}

#[test]
fn enforced_balance_check_applies_to_creator() {
    let household = two_member_household();
    let err = household
        .create(draft("A", "B", 50, PromiseKind::Penalty))
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::Draft(DraftError::InsufficientBalance {
            balance: 0,
            amount: 50,
        })
    );

    let advisory = household.with_policy(BalancePolicy::Advisory);
    assert!(
        advisory
            .create(draft("A", "B", 50, PromiseKind::Penalty))
            .is_ok()
    );
}

#[test]
fn stats_count_performed_promises() {
    let household = two_member_household();
    let (household, first) = household
        .create(draft("B", "A", 100, PromiseKind::Reward))
        .unwrap();
    let (household, _second) = household
        .create(draft("B", "A", 100, PromiseKind::Penalty))
        .unwrap();
    let household = household.verify(first, true).unwrap();

    let stats = household.member_stats();
    let b = stats.iter().find(|s| s.member.name() == "B").unwrap();
    assert_eq!((b.active_count, b.total_count), (1, 2));
    let a = stats.iter().find(|s| s.member.name() == "A").unwrap();
    assert_eq!((a.active_count, a.total_count), (0, 0));
}
