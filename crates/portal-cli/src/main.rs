//! Portal CLI application.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use portal_core::progress::display_percent;
use portal_core::schedule::SeriesSchedule;
use portal_core::session::MasteryGain;
use portal_core::{
    Catalog, Clock, Config, CyclePhase, FixedClock, Profile, ReleaseScheduler, Role,
    SessionHandle, SessionState, SystemClock,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Catalog file (overrides the configured path)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Role of the acting user
    #[arg(long, default_value = "consumer")]
    role: Role,

    /// Month (0-11) the release cycle starts in (publisher or director)
    #[arg(long, default_value_t = 0)]
    cycle_start_month: u32,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's drops, series progress and the cycle phase
    Schedule,

    /// Show contributor payouts for catalog items
    Rewards {
        /// Catalog item ids contributed by the user
        #[arg(long, value_delimiter = ',')]
        contributed: Vec<String>,

        /// Item ids already claimed
        #[arg(long, value_delimiter = ',')]
        claimed: Vec<String>,

        /// Claim every outstanding reward
        #[arg(long)]
        claim_all: bool,
    },

    /// Record consumption events and show mastery progress
    Ledger {
        /// Category of each completed session, in order
        #[arg(long = "consume")]
        categories: Vec<String>,

        /// Number of pedagogy insights received
        #[arg(long, default_value_t = 0)]
        insights: u32,
    },
}

#[derive(Serialize)]
struct ScheduleReport {
    date: NaiveDate,
    cycle_start_month: u32,
    cycle: CyclePhase,
    series: Vec<SeriesSchedule>,
}

#[derive(Serialize)]
struct RewardsReport {
    entries: Vec<portal_core::rewards::RewardEntry>,
    unclaimed_total: f64,
    credited: f64,
    balance: f64,
}

#[derive(Serialize)]
struct LedgerReport {
    gains: Vec<MasteryGain>,
    categories: Vec<(String, u64)>,
    distinct_categories: usize,
    total_sessions: u64,
    session_minutes: u64,
    balance: f64,
    achievements: Vec<String>,
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", text);
    Ok(())
}

fn run_schedule(
    args: &Args,
    config: &Config,
    catalog: &Catalog,
    session: &SessionHandle,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let today = clock.today();
    let cycle_start_month = session.snapshot().cycle_start_month;
    let scheduler = ReleaseScheduler::new(config.schedule.clone(), clock);

    let cycle = scheduler
        .current_cycle_phase(cycle_start_month)
        .context("Invalid cycle start month")?;

    let series = catalog
        .all_series()
        .iter()
        .map(|s| scheduler.describe(s, catalog.episodes(&s.id).len() as u32))
        .collect::<Vec<_>>();

    let report = ScheduleReport {
        date: today,
        cycle_start_month,
        cycle,
        series,
    };

    if args.json {
        return print_json(&report);
    }

    println!(
        "{} | cycle phase {} of 3 ({:.1}%)",
        report.date, report.cycle.phase, report.cycle.percent
    );
    for row in &report.series {
        println!(
            "{:<32} {:<18} {:>3}/{:<3} {:>3}%  {}{}",
            row.title,
            row.label,
            row.released,
            row.episodes_per_period,
            row.completion_percent,
            if row.drops_today { "NEW TODAY " } else { "" },
            "+".repeat(row.placeholders as usize),
        );
    }

    Ok(())
}

fn run_rewards(
    args: &Args,
    catalog: &Catalog,
    session: &SessionHandle,
    contributed: &[String],
    claimed: &[String],
    claim_all: bool,
) -> Result<()> {
    for id in contributed {
        let item = catalog
            .item(id)
            .with_context(|| format!("Unknown catalog item: {}", id))?;
        session.contribute(item.clone())?;
    }

    for id in claimed {
        let item = catalog
            .item(id)
            .with_context(|| format!("Unknown catalog item: {}", id))?;
        session.claim(id, portal_core::compute_payout(item, session.rates()))?;
    }

    let unclaimed_total = session.unclaimed_rewards_total();
    let credited = if claim_all { session.claim_all()? } else { 0.0 };

    let report = RewardsReport {
        entries: session.reward_entries(),
        unclaimed_total,
        credited,
        balance: session.snapshot().wallet.total_earnings,
    };

    if args.json {
        return print_json(&report);
    }

    for entry in &report.entries {
        println!(
            "{:<32} {:<10} {:>4} {:<5} {:>8.0}  {}",
            entry.title,
            entry.media_type.to_string(),
            entry.duration,
            entry.unit,
            entry.payout,
            if entry.claimed { "claimed" } else { "claimable" },
        );
    }
    println!("unclaimed: {:.2}", report.unclaimed_total);
    if claim_all {
        println!("credited:  {:.2}", report.credited);
    }
    println!("balance:   {:.2}", report.balance);

    Ok(())
}

fn run_ledger(args: &Args, session: &SessionHandle, categories: &[String], insights: u32) -> Result<()> {
    for _ in 0..insights {
        session.record_insight();
    }

    let gains = categories
        .iter()
        .map(|category| session.gain_mastery(category))
        .collect::<Result<Vec<_>, _>>()?;

    let state = session.snapshot();
    let stats = state.consumed_categories.stats();
    let report = LedgerReport {
        gains,
        categories: state
            .consumed_categories
            .iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect(),
        distinct_categories: stats.distinct_categories,
        total_sessions: stats.total_sessions,
        session_minutes: state.session_minutes,
        balance: state.wallet.total_earnings,
        achievements: state
            .achievements
            .iter()
            .map(|(a, _)| a.name().to_string())
            .collect(),
    };

    if args.json {
        return print_json(&report);
    }

    for (category, count) in &report.categories {
        println!(
            "{:<24} level {:>3}  [{:<10}] {:>3}%",
            category,
            count,
            "#".repeat((display_percent(*count) / 10) as usize),
            display_percent(*count),
        );
    }
    println!(
        "{} categories, {} sessions, {} minutes, balance {:.2}",
        report.distinct_categories, report.total_sessions, report.session_minutes, report.balance
    );
    for name in &report.achievements {
        println!("achievement: {}", name);
    }

    Ok(())
}

/// Start a session for the acting role; a non-default cycle month goes
/// through the role check
fn open_session(args: &Args, config: &Config, clock: Arc<dyn Clock>) -> Result<SessionHandle> {
    let state = SessionState::new(Profile::new("cli", args.role));
    let session = SessionHandle::new(state, config.rewards, config.progress, clock);
    if args.cycle_start_month != 0 {
        session
            .set_cycle_start_month(args.cycle_start_month)
            .context("Failed to set cycle start month")?;
    }
    Ok(session)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging; keep stdout clean for JSON output
    let mut log_config = portal_core::LogConfig::from_settings(
        &config.logging,
        &config.log_dir(),
        "portal-cli",
        args.verbose,
    )?;
    if args.json {
        log_config.console = false;
    }
    portal_core::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Portal CLI starting");

    let clock: Arc<dyn Clock> = match args.date {
        Some(date) => Arc::new(FixedClock::on(date)),
        None => Arc::new(SystemClock),
    };

    // Load catalog
    let catalog_path = args.catalog.clone().unwrap_or_else(|| config.catalog_path());
    let catalog = Catalog::from_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", catalog_path.display()))?;

    let session = open_session(&args, &config, clock.clone())?;

    match &args.command {
        Command::Schedule => run_schedule(&args, &config, &catalog, &session, clock)?,
        Command::Rewards {
            contributed,
            claimed,
            claim_all,
        } => run_rewards(&args, &catalog, &session, contributed, claimed, *claim_all)?,
        Command::Ledger { categories, insights } => {
            run_ledger(&args, &session, categories, *insights)?
        }
    }

    info!("Portal CLI finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_for(argv: &[&str]) -> Result<SessionHandle> {
        let args = Args::try_parse_from(argv)?;
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(
            NaiveDate::from_ymd_opt(2025, 3, 17).unwrap(),
        ));
        open_session(&args, &Config::default(), clock)
    }

    #[test]
    fn test_consumer_cannot_move_cycle_month() {
        let result = session_for(&[
            "portal",
            "--role",
            "consumer",
            "--cycle-start-month",
            "2",
            "schedule",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_publisher_moves_cycle_month() -> Result<()> {
        let session = session_for(&[
            "portal",
            "--role",
            "publisher",
            "--cycle-start-month",
            "2",
            "schedule",
        ])?;
        assert_eq!(session.snapshot().cycle_start_month, 2);
        Ok(())
    }

    #[test]
    fn test_default_month_needs_no_permission() -> Result<()> {
        let session = session_for(&["portal", "schedule"])?;
        assert_eq!(session.snapshot().cycle_start_month, 0);
        Ok(())
    }
}
