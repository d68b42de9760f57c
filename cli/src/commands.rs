//! Command-line surface: argument parsing and command dispatch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};

use pledge_config::PledgeConfig;
use pledge_core::{BalancePolicy, Household, JsonFileStore, Roster, Store};
use pledge_types::{PromiseDraft, PromiseId, PromiseKind, PromiseStatus};

use crate::render;

#[derive(Parser, Debug)]
#[command(name = "pledge", version)]
#[command(about = "Track family promises and settle their rewards and penalties")]
pub struct Cli {
    /// Directory holding household.json (overrides `[app] data_dir`)
    #[arg(long, env = "PLEDGE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List household members and their balances
    Members,
    /// List promises, optionally filtered by status
    List {
        #[arg(long)]
        status: Option<PromiseStatus>,
    },
    /// List completed and failed promises
    History,
    /// Show one promise in full
    Show { id: PromiseId },
    /// Propose a new promise (starts out pending)
    Create(CreateArgs),
    /// Approve or reject a pending promise
    Verify(VerifyArgs),
    /// Mark an active promise as completed and settle it
    Complete { id: PromiseId },
    /// Mark an active promise as failed and settle it
    Fail { id: PromiseId },
    /// Per-member activity and overall completion rate
    Stats,
    /// Remember who is acting, used as the default creator
    Whoami { name: String },
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    /// Member who must fulfil the promise
    #[arg(long)]
    pub performer: String,
    /// Positive whole amount; commas are allowed
    #[arg(long)]
    pub amount: String,
    /// RFC 3339, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD` (UTC)
    #[arg(long, value_parser = parse_deadline)]
    pub deadline: DateTime<Utc>,
    /// Member who proposes the promise (defaults to `[app] acting_member`)
    #[arg(long)]
    pub creator: Option<String>,
    #[arg(long, default_value_t = PromiseKind::Reward)]
    pub kind: PromiseKind,
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args, Debug, PartialEq, Eq)]
#[command(group(ArgGroup::new("decision").required(true).args(["approve", "reject"])))]
pub struct VerifyArgs {
    pub id: PromiseId,
    #[arg(long)]
    pub approve: bool,
    #[arg(long)]
    pub reject: bool,
}

/// Parse a deadline given on the command line. Bare dates mean the end of that day.
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed.and_utc());
        }
    }
    if let Some(end_of_day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
    {
        return Ok(end_of_day.and_utc());
    }
    Err(format!(
        "invalid deadline {raw:?} (expected RFC 3339, YYYY-MM-DD HH:MM or YYYY-MM-DD)"
    ))
}

/// Result of applying a command: text to print and, for mutations, the new state.
#[derive(Debug)]
pub struct Applied {
    pub output: String,
    pub household: Option<Household>,
}

impl Applied {
    fn query(output: String) -> Self {
        Self {
            output,
            household: None,
        }
    }

    fn mutation(output: String, household: Household) -> Self {
        Self {
            output,
            household: Some(household),
        }
    }
}

/// Apply one household command. For `whoami` this only checks the name; [`run`] persists it.
pub fn apply(
    command: &Command,
    household: &Household,
    acting_member: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Applied> {
    let roster = household.roster();
    let applied = match command {
        Command::Members => Applied::query(render::members(roster)),
        Command::List { status } => {
            let listed = match status {
                Some(status) => render::promise_list(household.list_by_status(*status), roster, now),
                None => render::promise_list(household.promises(), roster, now),
            };
            Applied::query(listed)
        }
        Command::History => Applied::query(render::promise_list(household.history(), roster, now)),
        Command::Show { id } => {
            Applied::query(render::promise_detail(household.promise(*id)?, roster, now))
        }
        Command::Stats => Applied::query(render::stats(
            &household.member_stats(),
            &household.summary(),
        )),
        Command::Create(args) => {
            let draft = PromiseDraft {
                title: Some(args.title.clone()),
                description: args.description.clone(),
                category: args.category.clone(),
                performer: Some(args.performer.clone()),
                creator: args.creator.clone().or_else(|| acting_member.map(str::to_owned)),
                amount: Some(args.amount.clone()),
                kind: args.kind,
                deadline: Some(args.deadline),
            };
            let (next, id) = household.create(draft)?;
            Applied::mutation(format!("Created promise #{id} (pending)"), next)
        }
        Command::Verify(args) => {
            let next = household.verify(args.id, args.approve)?;
            let status = next.promise(args.id)?.status();
            Applied::mutation(format!("Promise #{} is now {status}", args.id), next)
        }
        Command::Complete { id } => {
            let next = household.complete(*id)?;
            Applied::mutation(settled_message(&next, *id, "completed")?, next)
        }
        Command::Fail { id } => {
            let next = household.fail(*id)?;
            Applied::mutation(settled_message(&next, *id, "failed")?, next)
        }
        Command::Whoami { name } => {
            let member = roster.find_by_name(name)?;
            Applied::query(format!("Acting as {}", member.name()))
        }
    };
    Ok(applied)
}

fn settled_message(household: &Household, id: PromiseId, verb: &str) -> Result<String> {
    let promise = household.promise(id)?;
    let roster = household.roster();
    let mut parts = Vec::new();
    for member_id in [promise.performer(), promise.creator()] {
        let member = roster.find(member_id)?;
        parts.push(format!(
            "{} {}",
            member.name(),
            render::thousands(member.balance())
        ));
    }
    Ok(format!("Promise #{id} {verb}; balances now {}", parts.join(", ")))
}

fn open_household(store: &JsonFileStore, config: &PledgeConfig) -> Result<Household> {
    let household = match store.load()? {
        Some(snapshot) => Household::from_snapshot(snapshot)
            .with_context(|| format!("invalid household state in {}", store.path().display()))?,
        None => {
            tracing::info!(path = %store.path().display(), "No saved household, seeding roster");
            let members = config
                .seed_members()
                .context("invalid member in config")?;
            Household::new(Roster::new(members).context("invalid member roster in config")?)
        }
    };
    let policy = if config.enforce_balance_check() {
        BalancePolicy::Enforce
    } else {
        BalancePolicy::Advisory
    };
    Ok(household.with_policy(policy))
}

pub fn run(command: &Command, config: &PledgeConfig, data_dir: &Path) -> Result<()> {
    let mut store = JsonFileStore::in_dir(data_dir);
    let household = open_household(&store, config)?;

    let applied = apply(command, &household, config.acting_member(), Utc::now())?;

    if let Command::Whoami { name } = command {
        PledgeConfig::persist_acting_member(name.trim())
            .context("failed to save acting member to config")?;
    }
    if let Some(next) = applied.household {
        store.save(&next.snapshot())?;
    }

    println!("{}", applied.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use clap::{CommandFactory, Parser};

    use pledge_core::{BalancePolicy, Household, Roster};
    use pledge_types::{
        Member, MemberId, NonEmptyString, PromiseId, PromiseKind, PromiseStatus,
    };

    use super::{Cli, Command, CreateArgs, VerifyArgs, apply, parse_deadline};

    fn household() -> Household {
        Household::new(
            Roster::new(vec![
                Member::new(MemberId::new(1), NonEmptyString::new("Mom").unwrap(), "guardian", 45_000),
                Member::new(MemberId::new(2), NonEmptyString::new("Minjun").unwrap(), "child", 12_000),
            ])
            .unwrap(),
        )
    }

    fn create(creator: Option<&str>) -> Command {
        Command::Create(CreateArgs {
            title: "Theme park trip".to_owned(),
            performer: "Minjun".to_owned(),
            amount: "10,000".to_owned(),
            deadline: Utc.with_ymd_and_hms(2025, 7, 7, 18, 0, 0).unwrap(),
            creator: creator.map(str::to_owned),
            kind: PromiseKind::Reward,
            category: "activity".to_owned(),
            description: String::new(),
        })
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_defaults() {
        let cli = Cli::try_parse_from([
            "pledge",
            "create",
            "--title",
            "Dishes",
            "--performer",
            "Minjun",
            "--amount",
            "5000",
            "--deadline",
            "2025-07-10 20:00",
        ])
        .unwrap();
        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.kind, PromiseKind::Reward);
        assert_eq!(args.creator, None);
        assert_eq!(args.deadline, Utc.with_ymd_and_hms(2025, 7, 10, 20, 0, 0).unwrap());
    }

    #[test]
    fn verify_requires_a_decision() {
        assert!(Cli::try_parse_from(["pledge", "verify", "1"]).is_err());
        assert!(Cli::try_parse_from(["pledge", "verify", "1", "--approve", "--reject"]).is_err());

        let cli = Cli::try_parse_from(["pledge", "verify", "#3", "--reject"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Verify(VerifyArgs {
                id: PromiseId::try_new(3).unwrap(),
                approve: false,
                reject: true,
            })
        );
    }

    #[test]
    fn list_parses_status_filter() {
        let cli = Cli::try_parse_from(["pledge", "list", "--status", "Active"]).unwrap();
        assert_eq!(
            cli.command,
            Command::List {
                status: Some(PromiseStatus::Active)
            }
        );
        assert!(Cli::try_parse_from(["pledge", "list", "--status", "disputed"]).is_err());
    }

    #[test]
    fn deadline_formats() {
        assert_eq!(
            parse_deadline("2025-07-07T18:00:00+09:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 7, 7, 9, 0, 0).unwrap()
        );
        assert_eq!(
            parse_deadline("2025-07-07").unwrap(),
            Utc.with_ymd_and_hms(2025, 7, 7, 23, 59, 59).unwrap()
        );
        assert!(parse_deadline("next friday").is_err());
    }

    #[test]
    fn create_falls_back_to_acting_member() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let applied = apply(&create(None), &household(), Some("Mom"), now).unwrap();
        assert_eq!(applied.output, "Created promise #1 (pending)");

        let next = applied.household.unwrap();
        let promise = next.promise(PromiseId::FIRST).unwrap();
        assert_eq!(promise.creator(), MemberId::new(1));
        assert_eq!(promise.status(), PromiseStatus::Pending);
    }

    #[test]
    fn create_without_creator_is_rejected() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let err = apply(&create(None), &household(), None, now).unwrap_err();
        assert!(err.to_string().contains("creator"), "{err}");
    }

    #[test]
    fn complete_reports_settled_balances() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let created = apply(&create(Some("Mom")), &household(), None, now)
            .unwrap()
            .household
            .unwrap();
        let active = created.verify(PromiseId::FIRST, true).unwrap();

        let applied = apply(&Command::Complete { id: PromiseId::FIRST }, &active, None, now).unwrap();
        assert_eq!(
            applied.output,
            "Promise #1 completed; balances now Minjun 22,000, Mom 35,000"
        );

        let again = apply(
            &Command::Complete { id: PromiseId::FIRST },
            &applied.household.unwrap(),
            None,
            now,
        );
        assert!(again.is_err());
    }

    #[test]
    fn queries_do_not_produce_new_state() {
        let household = household().with_policy(BalancePolicy::Advisory);
        let now = Utc::now();
        for command in [Command::Members, Command::Stats, Command::History] {
            assert!(apply(&command, &household, None, now).unwrap().household.is_none());
        }
        assert!(apply(&Command::Show { id: PromiseId::FIRST }, &household, None, now).is_err());
    }

    #[test]
    fn whoami_checks_the_roster() {
        let now = Utc::now();
        let ok = apply(&Command::Whoami { name: "Minjun".to_owned() }, &household(), None, now)
            .unwrap();
        assert_eq!(ok.output, "Acting as Minjun");
        assert!(apply(&Command::Whoami { name: "Dad".to_owned() }, &household(), None, now).is_err());
    }
}
