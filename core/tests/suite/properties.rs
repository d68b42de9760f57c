//! Invariants checked over generated command sequences.

use std::collections::HashMap;

use pledge_core::{BalancePolicy, Household, Roster};
use pledge_types::{MemberId, PromiseId, PromiseKind, PromiseStatus};

use crate::common::{draft, member};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

const NAMES: [&str; 3] = ["Mom", "Dad", "Kid"];

fn household() -> Household {
    let roster = Roster::new(vec![
        member(1, "Mom", 5_000),
        member(2, "Dad", 3_000),
        member(3, "Kid", 0),
    ])
    .unwrap();
    Household::new(roster).with_policy(BalancePolicy::Advisory)
}

fn balances(household: &Household) -> HashMap<MemberId, i64> {
    household
        .roster()
        .iter()
        .map(|m| (m.id(), m.balance()))
        .collect()
}

fn assert_stats_match_recount(household: &Household) {
    for stats in household.member_stats() {
        let id = stats.member.id();
        let total = household
            .promises()
            .iter()
            .filter(|p| p.performer() == id)
            .count();
        let active = household
            .promises()
            .iter()
            .filter(|p| p.performer() == id && p.status() == PromiseStatus::Active)
            .count();
        assert_eq!(stats.total_count, total, "total for {id}");
        assert_eq!(stats.active_count, active, "active for {id}");
    }
}

#[test]
fn generated_sequences_preserve_ledger_invariants() {
    for seed in 1..=40 {
        let mut rng = Lcg(seed);
        let mut state = household();
        let mut ids: Vec<PromiseId> = Vec::new();
        let mut settled: HashMap<PromiseId, usize> = HashMap::new();

        for _ in 0..60 {
            let before = state.clone();
            let before_balances = balances(&before);

            let result = match rng.below(4) {
                0 => {
                    let performer = NAMES[rng.below(3) as usize];
                    let creator = NAMES[rng.below(3) as usize];
                    let amount = rng.below(400) as i64 + 1;
                    let kind = if rng.below(2) == 0 {
                        PromiseKind::Reward
                    } else {
                        PromiseKind::Penalty
                    };
                    match state.create(draft(performer, creator, amount, kind)) {
                        Ok((next, id)) => {
                            assert_ne!(performer, creator);
                            assert!(!ids.contains(&id), "id {id} reused");
                            assert_eq!(next.promise(id).unwrap().status(), PromiseStatus::Pending);
                            assert_eq!(balances(&next), before_balances);
                            ids.push(id);
                            Ok(next)
                        }
                        Err(err) => {
                            assert_eq!(performer, creator, "unexpected rejection: {err}");
                            Err(err)
                        }
                    }
                }
                op if !ids.is_empty() => {
                    let id = ids[rng.below(ids.len() as u64) as usize];
                    let status = before.promise(id).unwrap().status();
                    let result = match op {
                        1 => state.verify(id, rng.below(3) != 0),
                        2 => state.complete(id),
                        _ => state.fail(id),
                    };
                    let allowed = match op {
                        1 => status == PromiseStatus::Pending,
                        _ => status == PromiseStatus::Active,
                    };
                    assert_eq!(result.is_ok(), allowed, "op {op} from {status}");
                    if let Ok(next) = &result {
                        if op != 1 {
                            *settled.entry(id).or_default() += 1;
                            let promise = next.promise(id).unwrap();
                            let after = balances(next);
                            let amount = promise.amount().get();
                            let delta = |m: MemberId| after[&m] - before_balances[&m];
                            match (promise.kind(), promise.status()) {
                                (PromiseKind::Reward, PromiseStatus::Completed) => {
                                    assert_eq!(delta(promise.creator()), -amount);
                                    assert_eq!(delta(promise.performer()), amount);
                                    assert_eq!(
                                        next.roster().total_balance(),
                                        before.roster().total_balance()
                                    );
                                }
                                (PromiseKind::Penalty, PromiseStatus::Failed) => {
                                    assert_eq!(delta(promise.creator()), 0);
                                    assert_eq!(delta(promise.performer()), -amount);
                                }
                                _ => assert_eq!(after, before_balances),
                            }
                        } else {
                            assert_eq!(balances(next), before_balances);
                        }
                    }
                    result
                }
                _ => continue,
            };

            match result {
                Ok(next) => state = next,
                Err(_) => assert_eq!(state, before, "failed command changed state"),
            }
            assert_stats_match_recount(&state);
        }

        assert!(settled.values().all(|count| *count == 1));
        let terminal_from_active = state
            .promises()
            .iter()
            .filter(|p| settled.contains_key(&p.id()))
            .all(|p| p.status().is_terminal());
        assert!(terminal_from_active);
    }
}
