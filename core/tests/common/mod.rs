//! Shared fixtures for household integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use pledge_core::{Household, Roster};
use pledge_types::{Member, MemberId, NonEmptyString, PromiseDraft, PromiseKind};

pub fn member(id: u32, name: &str, balance: i64) -> Member {
    Member::new(
        MemberId::new(id),
        NonEmptyString::new(name).expect("fixture names are non-empty"),
        "",
        balance,
    )
}

/// Roster `[A:1000, B:0]`.
pub fn two_member_household() -> Household {
    let roster = Roster::new(vec![member(1, "A", 1_000), member(2, "B", 0)])
        .expect("fixture roster is valid");
    Household::new(roster)
}

pub fn deadline() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 7, 18, 0, 0)
        .single()
        .expect("fixture deadline is unambiguous")
}

pub fn draft(performer: &str, creator: &str, amount: i64, kind: PromiseKind) -> PromiseDraft {
    PromiseDraft {
        title: Some("Weekly chores".to_owned()),
        description: "Take out the trash every evening".to_owned(),
        category: "chores".to_owned(),
        performer: Some(performer.to_owned()),
        creator: Some(creator.to_owned()),
        amount: Some(amount.to_string()),
        kind,
        deadline: Some(deadline()),
    }
}

pub fn balance_of(household: &Household, name: &str) -> i64 {
    household
        .roster()
        .find_by_name(name)
        .expect("fixture member exists")
        .balance()
}
