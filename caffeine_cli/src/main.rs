use caffeine_core::export::{write_events_csv, write_series_csv};
use caffeine_core::*;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "caffeine")]
#[command(about = "Caffeine intake tracker with half-life level curves", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a drink
    Log {
        /// Caffeine in milligrams
        #[arg(long)]
        amount: f64,

        /// What was consumed
        #[arg(long)]
        description: String,

        /// Price in cents
        #[arg(long, default_value_t = 0)]
        cost: i64,

        /// When it was consumed (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a predefined drink by number
    Preset {
        id: u32,

        /// When it was consumed (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Classify a bank transaction (JSON file, or - for stdin) and record it
    /// if it is a drink
    Ingest {
        file: PathBuf,

        /// Show the classification without logging
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the caffeine level curve for a window (default: last 24 hours)
    Levels {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// List recorded drinks in a window (default: last 24 hours)
    Events {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Total intake and spend (default: everything)
    Summary {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
    Table,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    caffeine_core::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let mut log = JsonlEventLog::new(Config::events_path(&data_dir));
    tracing::debug!("Using event log {:?}", log.path());
    let now = Utc::now();

    match cli.command {
        Commands::Log {
            amount,
            description,
            cost,
            at,
        } => {
            if !(amount.is_finite() && amount >= 0.0) {
                return Err(Error::Parse(format!(
                    "amount must be non-negative, got {}",
                    amount
                )));
            }
            let at = parse_optional_time(at.as_deref())?.unwrap_or(now);
            let event = ConsumptionEvent::new(at, description, amount, cost.abs());
            record(&mut log, &event)
        }
        Commands::Preset { id, at } => {
            let presets = config.presets();
            let preset = find_preset(&presets, id)
                .ok_or_else(|| Error::Parse(format!("unknown preset {}", id)))?;
            let at = parse_optional_time(at.as_deref())?.unwrap_or(now);
            record(&mut log, &preset.to_event(at))
        }
        Commands::Ingest { file, dry_run } => cmd_ingest(&mut log, &config, &file, dry_run),
        Commands::Levels { start, end, format } => {
            let (start, end) = window(start.as_deref(), end.as_deref(), now)?;
            let series = levels_between(&log, start, end, &config.series_params())?;
            print_series(&series, format)
        }
        Commands::Events { start, end, format } => {
            let (start, end) = window(start.as_deref(), end.as_deref(), now)?;
            if end <= start {
                return Err(Error::InvalidRange { start, end });
            }
            let events = log.fetch_events(start, end)?;
            print_events(&events, format)
        }
        Commands::Summary { start, end } => {
            let start = parse_optional_time(start.as_deref())?;
            let end = parse_optional_time(end.as_deref())?;
            let summary = summary_between(&log, start, end, now)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

fn record(log: &mut JsonlEventLog, event: &ConsumptionEvent) -> Result<()> {
    log.append(event)?;
    println!(
        "✓ Logged {} mg ({}) at {}",
        event.amount,
        event.description,
        event.timestamp.to_rfc3339()
    );
    Ok(())
}

fn cmd_ingest(
    log: &mut JsonlEventLog,
    config: &Config,
    file: &Path,
    dry_run: bool,
) -> Result<()> {
    let contents = if file == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };

    let doc: TransactionDocument = serde_json::from_str(&contents)?;
    let txn = Transaction::from(doc);

    match config.classifier().classify(&txn) {
        Some(event) if dry_run => {
            println!(
                "Would log {} mg ({}) at {}",
                event.amount,
                event.description,
                event.timestamp.to_rfc3339()
            );
            println!("\n[Dry run - not logging event]");
            Ok(())
        }
        Some(event) => record(log, &event),
        None => {
            println!("Not a caffeine purchase - nothing logged.");
            Ok(())
        }
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("invalid time '{}': {}", s, e)))
}

fn parse_optional_time(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    s.map(parse_time).transpose()
}

/// Resolve a query window, defaulting to the 24 hours before `end`.
fn window(
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let end = parse_optional_time(end)?.unwrap_or(now);
    let start = parse_optional_time(start)?.unwrap_or(end - Duration::hours(24));
    Ok((start, end))
}

fn print_series(series: &[TimeSample], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(series)?),
        Format::Csv => write_series_csv(io::stdout().lock(), series)?,
        Format::Table => {
            for sample in series {
                println!(
                    "{}  {:>8.1} mg",
                    sample.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    sample.level
                );
            }
        }
    }
    Ok(())
}

fn print_events(events: &[ConsumptionEvent], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(events)?),
        Format::Csv => write_events_csv(io::stdout().lock(), events)?,
        Format::Table => {
            if events.is_empty() {
                println!("No drinks recorded in this window.");
            }
            for event in events {
                println!(
                    "{}  {:>6.0} mg  {:>7}  {}",
                    event.timestamp.format("%Y-%m-%d %H:%M"),
                    event.amount,
                    format!("${}.{:02}", event.cost / 100, event.cost % 100),
                    event.description
                );
            }
        }
    }
    Ok(())
}
