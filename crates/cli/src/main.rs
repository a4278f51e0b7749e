use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tias_cli::{classify, perf, refresh_store, run_evaluation, windows, Overrides, Settings};
use tias_snapshot::GameDate;
use tias_tiers::{read_current_tier, Tier};

#[derive(Parser)]
#[command(name = "tias")]
#[command(about = "Terra Invicta Advisory System: snapshot ingestion and tier evaluation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root (overrides TIAS_PROJECT_ROOT, defaults to the current directory)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Config file (defaults to <project root>/tias.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Savegame directory (overrides TIAS_SAVES_DIR and tias.toml)
    #[arg(long, global = true)]
    saves_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the snapshot store if needed and evaluate the current tier
    Evaluate(EvaluateArgs),

    /// Rebuild the snapshot store from the savegame when it is stale
    Parse(ParseArgs),

    /// Print the tier recorded for a date (1 when no verdict exists)
    Tier(DateArgs),

    /// Show upcoming transfer windows
    Windows(WindowsArgs),

    /// Summarise command timings from the performance log
    Perf(PerfArgs),
}

#[derive(Args)]
struct EvaluateArgs {
    /// In-game date (YYYY-M-D, YYYY-MM-DD, DD/MM/YYYY or D/M/YYYY)
    #[arg(long, value_parser = parse_date)]
    date: GameDate,

    /// Rebuild the store even when it is up to date
    #[arg(long)]
    force: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ParseArgs {
    #[arg(long, value_parser = parse_date)]
    date: GameDate,

    #[arg(long)]
    force: bool,

    /// Print the refresh outcome as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DateArgs {
    #[arg(long, value_parser = parse_date)]
    date: GameDate,
}

#[derive(Args)]
struct WindowsArgs {
    #[arg(long, value_parser = parse_date)]
    date: GameDate,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PerfArgs {
    #[arg(long)]
    json: bool,
}

fn parse_date(raw: &str) -> std::result::Result<GameDate, String> {
    GameDate::parse(raw).map_err(|err| err.to_string())
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Evaluate(_) => "evaluate",
            Self::Parse(_) => "parse",
            Self::Tier(_) => "tier",
            Self::Windows(_) => "windows",
            Self::Perf(_) => "perf",
        }
    }

    const fn date(&self) -> Option<&GameDate> {
        match self {
            Self::Evaluate(args) => Some(&args.date),
            Self::Parse(args) => Some(&args.date),
            Self::Tier(args) => Some(&args.date),
            Self::Windows(args) => Some(&args.date),
            Self::Perf(_) => None,
        }
    }

    const fn json_output(&self) -> bool {
        match self {
            Self::Evaluate(args) => args.json,
            Self::Windows(args) => args.json,
            Self::Parse(args) => args.json,
            Self::Perf(args) => args.json,
            Self::Tier(_) => false,
        }
    }
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    if cli.command.json_output() {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let overrides = Overrides {
        project_root: cli.project_root.clone(),
        config: cli.config.clone(),
        saves_dir: cli.saves_dir.clone(),
    };

    let result = Settings::load(&overrides)
        .context("Failed to load settings")
        .and_then(|settings| {
            perf::timed(&settings.logs_dir, cli.command.name(), || {
                run(&cli.command, &settings)
            })
        });

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        if let Some(remediation) = classify(&err, cli.command.date()) {
            eprintln!("hint: {}", remediation.hint);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(command: &Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Evaluate(args) => run_evaluate(args, settings),
        Commands::Parse(args) => run_parse(args, settings),
        Commands::Tier(args) => {
            let tier = read_current_tier(&settings.generated_dir, &args.date);
            print_stdout(&tier.to_string())
        }
        Commands::Windows(args) => run_windows(args, settings),
        Commands::Perf(args) => run_perf(args, settings),
    }
}

fn run_evaluate(args: &EvaluateArgs, settings: &Settings) -> Result<()> {
    let outcome = run_evaluation(settings, &args.date, args.force)?;
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&outcome.verdict)?);
    }

    let verdict = &outcome.verdict;
    let mut out = format!(
        "Tier {} for {} (readiness {:.2})\n",
        verdict.current_tier, verdict.date, verdict.readiness
    );
    for tier in [Tier::Two, Tier::Three] {
        let Some(report) = verdict.report(tier) else {
            continue;
        };
        out.push_str(&format!(
            "\n{}: {}/{} met{}\n",
            tier.key(),
            report.met,
            report.required,
            if report.unlocked { " (unlocked)" } else { "" }
        ));
        for (name, met) in &report.conditions {
            let mark = if verdict.stubs.contains(name) {
                "stub"
            } else if *met {
                "yes"
            } else {
                "no"
            };
            out.push_str(&format!("  [{mark:>4}] {name}\n"));
        }
    }
    out.push_str(&format!("\nVerdict: {}", outcome.verdict_path.display()));
    print_stdout(&out)
}

fn run_parse(args: &ParseArgs, settings: &Settings) -> Result<()> {
    let outcome = refresh_store(settings, &args.date, args.force)?;
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&outcome)?);
    }
    let status = if outcome.rebuilt { "rebuilt" } else { "up to date" };
    print_stdout(&format!("{} ({status})", outcome.store_path.display()))
}

fn run_windows(args: &WindowsArgs, settings: &Settings) -> Result<()> {
    let windows = windows::launch_windows(&args.date, &settings.templates_file);
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&windows)?);
    }
    if windows.is_empty() {
        return print_stdout("No launch windows available.");
    }

    let mut out = String::from("Launch windows:");
    for window in &windows {
        out.push_str(&format!(
            "\n  {:<12} {}  ({} days)",
            window.target, window.next_window, window.days_away
        ));
        if let Some(penalty) = window.current_penalty {
            out.push_str(&format!("  penalty now: {penalty}%"));
        }
    }
    print_stdout(&out)
}

fn run_perf(args: &PerfArgs, settings: &Settings) -> Result<()> {
    let records = perf::read_records(&settings.logs_dir)?;
    let stats = perf::summarize(&records);
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&stats)?);
    }
    if stats.is_empty() {
        return print_stdout("No performance data available.");
    }

    let mut out = format!(
        "{:<12} {:<8} {:<10} {:<10} {:<10} {:<10} Failures",
        "Command", "Count", "Min", "Avg", "Max", "P95"
    );
    for (command, s) in &stats {
        let slow = if s.avg > 1.0 { "!" } else { " " };
        out.push_str(&format!(
            "\n{slow}{command:<11} {:<8} {:<10.3} {:<10.3} {:<10.3} {:<10.3} {}",
            s.count, s.min, s.avg, s.max, s.p95, s.failures
        ));
    }
    print_stdout(&out)
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
