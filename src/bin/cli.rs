use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cpm_schedule::logging::{self, LogLevel};
use cpm_schedule::persistence::file::{write_snapshot_csv, write_snapshot_json};
use cpm_schedule::report::{DateProjection, render_report};
use cpm_schedule::{
    ScheduleConfig, ScheduleSnapshot, TaskNetwork, UnresolvedPredecessorPolicy, WorkCalendar,
    load_network_from_csv, load_network_from_json,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Critical Path Method scheduling for task-dependency networks.
#[derive(Debug, Parser)]
#[command(name = "cpm", version, about, long_about = None)]
struct Cli {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CPM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute early/late dates, float and the critical set.
    Schedule(ScheduleArgs),
    /// Validate a network and check it for dependency cycles.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ScheduleArgs {
    /// Network file (`.json`, or `.csv` with id,name,duration,predecessors).
    network: PathBuf,

    /// JSON file with a schedule configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Tasks with float up to this value are reported as near-critical.
    #[arg(long, value_name = "N")]
    near_critical: Option<i64>,

    /// Fail on predecessor ids that match no task instead of skipping them.
    #[arg(long)]
    strict: bool,

    /// Minimum dependency-level width evaluated in parallel (0 disables).
    #[arg(long, value_name = "N")]
    parallel_threshold: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Project start date; adds calendar dates to the table output.
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    epoch: Option<NaiveDate>,

    /// Work calendar JSON (working_days, holidays). Requires --epoch.
    #[arg(long, value_name = "PATH", requires = "epoch")]
    calendar: Option<PathBuf>,

    /// Write to this file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    network: PathBuf,

    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{input}': {err}"))
}

fn load_network(path: &Path) -> Result<TaskNetwork> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let network = if is_csv {
        load_network_from_csv(path)
    } else {
        load_network_from_json(path)
    }
    .with_context(|| format!("failed to load network from {}", path.display()))?;
    info!(tasks = network.len(), path = %path.display(), "network loaded");
    Ok(network)
}

fn policy(strict: bool) -> UnresolvedPredecessorPolicy {
    if strict {
        UnresolvedPredecessorPolicy::Reject
    } else {
        UnresolvedPredecessorPolicy::Ignore
    }
}

fn build_config(args: &ScheduleArgs) -> Result<ScheduleConfig> {
    let mut config = match &args.config {
        Some(path) => ScheduleConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ScheduleConfig::default(),
    };
    if let Some(threshold) = args.near_critical {
        config.near_critical_threshold = threshold;
    }
    if args.strict {
        config.unresolved_predecessors = policy(true);
    }
    if let Some(threshold) = args.parallel_threshold {
        config.parallel_threshold = threshold;
    }
    Ok(config)
}

fn write_output(
    args: &ScheduleArgs,
    snapshot: &ScheduleSnapshot,
    calendar: Option<&WorkCalendar>,
    out: &mut dyn Write,
) -> Result<()> {
    match args.format {
        OutputFormat::Table => {
            let projection = match (args.epoch, calendar) {
                (Some(epoch), Some(calendar)) => Some(DateProjection { calendar, epoch }),
                _ => None,
            };
            let report = render_report(snapshot, projection)
                .context("failed to project schedule onto calendar dates")?;
            out.write_all(report.as_bytes())?;
        }
        OutputFormat::Json => {
            write_snapshot_json(snapshot, &mut *out)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_snapshot_csv(snapshot, &mut *out)?,
    }
    out.flush()?;
    Ok(())
}

fn run_schedule(args: ScheduleArgs) -> Result<()> {
    let network = load_network(&args.network)?;
    let config = build_config(&args)?;
    let calendar = match (&args.calendar, args.epoch) {
        (Some(path), _) => Some(
            WorkCalendar::from_json_file(path)
                .with_context(|| format!("failed to load calendar from {}", path.display()))?,
        ),
        (None, Some(_)) => Some(WorkCalendar::default()),
        (None, None) => None,
    };
    if args.epoch.is_some() && args.format != OutputFormat::Table {
        warn!("--epoch only affects table output");
    }

    let snapshot = network.schedule(&config)?;
    info!(
        project_duration = snapshot.project_duration(),
        critical = snapshot.critical_task_ids().len(),
        "schedule computed"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_output(&args, &snapshot, calendar.as_ref(), &mut writer)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_output(&args, &snapshot, calendar.as_ref(), &mut handle)
        }
    }
}

fn run_check(args: CheckArgs) -> Result<()> {
    let network = load_network(&args.network)?;
    let config = ScheduleConfig::default().with_unresolved_predecessors(policy(args.strict));
    let snapshot = network.schedule(&config)?;
    for reference in snapshot.ignored_references() {
        println!(
            "warning: task {} references unknown predecessor {}",
            reference.task_id, reference.predecessor_id
        );
    }
    println!(
        "ok: {} tasks, acyclic, project duration {}",
        snapshot.len(),
        snapshot.project_duration()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Schedule(args) => run_schedule(args),
        Command::Check(args) => run_check(args),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.log_level) {
        eprintln!("cpm error: {err:#}");
        std::process::exit(2);
    }
    if let Err(err) = run(cli) {
        eprintln!("cpm error: {err:#}");
        std::process::exit(1);
    }
}
