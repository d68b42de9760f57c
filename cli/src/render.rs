//! Plain-text rendering of household state for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use pledge_core::{MemberStats, Roster, Summary};
use pledge_types::{MemberId, Promise, PromiseKind};

/// `12000` -> `"12,000"`, `-300` -> `"-300"`.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn member_name(roster: &Roster, id: MemberId) -> String {
    roster
        .find(id)
        .map_or_else(|_| id.to_string(), |member| member.name().to_owned())
}

fn signed_amount(promise: &Promise) -> String {
    let amount = thousands(promise.amount().get());
    match promise.kind() {
        PromiseKind::Reward => format!("+{amount}"),
        PromiseKind::Penalty => format!("-{amount}"),
    }
}

fn due(promise: &Promise, now: DateTime<Utc>) -> String {
    let deadline = promise.deadline().format("%Y-%m-%d %H:%M");
    if promise.status().is_terminal() {
        return format!("due {deadline}");
    }
    if promise.is_overdue(now) {
        return format!("due {deadline} (overdue)");
    }
    match promise.days_left(now) {
        0 => format!("due {deadline} (today)"),
        1 => format!("due {deadline} (1 day left)"),
        days => format!("due {deadline} ({days} days left)"),
    }
}

pub fn promise_line(promise: &Promise, roster: &Roster, now: DateTime<Utc>) -> String {
    format!(
        "#{id:<3} {status:<9} {title}  [{performer} <- {creator}]  {amount} {kind}  {due}",
        id = promise.id().value(),
        status = promise.status().as_str(),
        title = promise.title(),
        performer = member_name(roster, promise.performer()),
        creator = member_name(roster, promise.creator()),
        amount = signed_amount(promise),
        kind = promise.kind(),
        due = due(promise, now),
    )
}

pub fn promise_list<'a>(
    promises: impl IntoIterator<Item = &'a Promise>,
    roster: &Roster,
    now: DateTime<Utc>,
) -> String {
    let lines: Vec<String> = promises
        .into_iter()
        .map(|promise| promise_line(promise, roster, now))
        .collect();
    if lines.is_empty() {
        return "No promises.".to_owned();
    }
    lines.join("\n")
}

pub fn promise_detail(promise: &Promise, roster: &Roster, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", promise.id(), promise.title());
    let _ = writeln!(
        out,
        "  status:    {} ({}%)",
        promise.status(),
        promise.status().progress_percent()
    );
    let _ = writeln!(out, "  performer: {}", member_name(roster, promise.performer()));
    let _ = writeln!(out, "  creator:   {}", member_name(roster, promise.creator()));
    let _ = writeln!(
        out,
        "  amount:    {} ({})",
        signed_amount(promise),
        promise.kind()
    );
    let _ = writeln!(out, "  {}", due(promise, now));
    if !promise.category().is_empty() {
        let _ = writeln!(out, "  category:  {}", promise.category());
    }
    if !promise.description().is_empty() {
        let _ = writeln!(out, "  {}", promise.description());
    }
    out.trim_end().to_owned()
}

pub fn members(roster: &Roster) -> String {
    roster
        .iter()
        .map(|member| {
            let role = if member.role().is_empty() {
                String::new()
            } else {
                format!(" ({})", member.role())
            };
            format!(
                "{:<4} {}{role}  {}",
                member.id().to_string(),
                member.name(),
                thousands(member.balance())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stats(member_stats: &[MemberStats<'_>], summary: &Summary) -> String {
    let mut out = String::new();
    for stat in member_stats {
        let _ = writeln!(
            out,
            "{:<12} balance {:>10}  active {}  total {}",
            stat.member.name(),
            thousands(stat.member.balance()),
            stat.active_count,
            stat.total_count
        );
    }
    let _ = write!(
        out,
        "{} promises: {} pending, {} active, {} completed, {} failed ({}% completed)",
        summary.total,
        summary.pending,
        summary.active,
        summary.completed,
        summary.failed,
        summary.completion_rate()
    );
    out
}
