//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_feed_adapter::FileFeedAdapter;
use crate::domain::config_validation::{
    configured_mode, replay_date, url_key, validate_feed_config, validate_replay_config,
};
use crate::domain::error::FeedError;
use crate::domain::feed::{self, FeedMode, DATE_FORMAT};
use crate::domain::replay::{run_replay, ReplayConfig, ReplayReport};
use crate::domain::selection::{PortfolioAction, DEFAULT_SELECTION_SIZE};
use crate::domain::universe::{FeedUrls, UniverseResolver, UniverseResult};
use crate::ports::config_port::ConfigPort;
use crate::ports::feed_port::FeedPort;
use crate::ports::price_port::PricePort;

#[derive(Parser, Debug)]
#[command(name = "symfeed", about = "Date-indexed trading universe resolver")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the universe for one date
    Resolve {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Override the configured mode with live
        #[arg(long, conflicts_with = "historical")]
        live: bool,
        /// Override the configured mode with historical
        #[arg(long)]
        historical: bool,
    },
    /// Replay the historical feed day by day
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        /// Directory of `{code}.csv` price files
        #[arg(short, long)]
        prices: Option<PathBuf>,
        #[arg(short = 'k', long)]
        selection_size: Option<usize>,
    },
    /// Parse a local feed file and summarise it
    Inspect {
        #[arg(short, long)]
        file: PathBuf,
        /// Treat the file as a live payload
        #[arg(long)]
        live: bool,
        /// Date stamped on a live payload (defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    feed::parse_date(s).ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Resolve {
            config,
            date,
            live,
            historical,
        } => {
            let mode_override = match (live, historical) {
                (true, _) => Some(FeedMode::Live),
                (_, true) => Some(FeedMode::Historical),
                _ => None,
            };
            run_resolve(&config, date, mode_override)
        }
        Command::Replay {
            config,
            start,
            end,
            prices,
            selection_size,
        } => run_replay_command(&config, start, end, prices.as_deref(), selection_size),
        Command::Inspect { file, live, date } => run_inspect(&file, live, date),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_feed_failure() {
                eprintln!("no universe was resolved; check the [feed] URLs and the feed contents");
            }
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FeedError> {
    FileConfigAdapter::from_file(path)
}

/// Feed URLs from `[feed]`. The URL for the inactive mode may be absent.
pub fn build_feed_urls(config: &dyn ConfigPort) -> FeedUrls {
    FeedUrls {
        live: config.get_string("feed", "live_url").unwrap_or_default(),
        historical: config
            .get_string("feed", "historical_url")
            .unwrap_or_default(),
    }
}

/// Pick the adapter for the active mode's URL: local files are read
/// directly (relative to `base_dir`), anything else goes over HTTP.
pub fn build_feed_port(
    config: &dyn ConfigPort,
    url: &str,
    base_dir: Option<&Path>,
) -> Result<Box<dyn FeedPort>, FeedError> {
    if FileFeedAdapter::handles(url) {
        let adapter = match base_dir {
            Some(dir) => FileFeedAdapter::with_base_dir(dir.to_path_buf()),
            None => FileFeedAdapter::new(),
        };
        return Ok(Box::new(adapter));
    }

    #[cfg(feature = "http")]
    {
        use crate::adapters::http_feed_adapter::HttpFeedAdapter;
        Ok(Box::new(HttpFeedAdapter::from_config(config)?))
    }

    #[cfg(not(feature = "http"))]
    {
        let _ = config;
        Err(FeedError::ConfigInvalid {
            section: "feed".into(),
            key: "url".into(),
            reason: format!("http feature is required to fetch {url}"),
        })
    }
}

pub fn build_resolver(
    config: &dyn ConfigPort,
    mode: FeedMode,
    base_dir: Option<&Path>,
) -> Result<UniverseResolver<Box<dyn FeedPort>>, FeedError> {
    let urls = build_feed_urls(config);
    let url = urls.for_mode(mode);
    if url.trim().is_empty() {
        return Err(FeedError::ConfigMissing {
            section: "feed".into(),
            key: url_key(mode).into(),
        });
    }
    let port = build_feed_port(config, url, base_dir)?;
    Ok(UniverseResolver::new(port, mode, urls))
}

/// `[replay]` settings with command-line overrides applied.
pub fn build_replay_config(
    config: &dyn ConfigPort,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    selection_size: Option<usize>,
) -> Result<ReplayConfig, FeedError> {
    let start_date = match start {
        Some(d) => d,
        None => replay_date(config, "start_date")?,
    };
    let end_date = match end {
        Some(d) => d,
        None => replay_date(config, "end_date")?,
    };
    if start_date > end_date {
        return Err(FeedError::ConfigInvalid {
            section: "replay".into(),
            key: "start_date".into(),
            reason: "start_date must be on or before end_date".into(),
        });
    }

    let selection_size = match selection_size {
        Some(k) => k,
        None => {
            let k = config.get_int("replay", "selection_size", DEFAULT_SELECTION_SIZE as i64);
            usize::try_from(k).unwrap_or(0)
        }
    };
    if selection_size == 0 {
        return Err(FeedError::ConfigInvalid {
            section: "replay".into(),
            key: "selection_size".into(),
            reason: "selection_size must be at least 1".into(),
        });
    }

    Ok(ReplayConfig {
        start_date,
        end_date,
        selection_size,
    })
}

pub fn format_result(result: &UniverseResult) -> String {
    match result.symbols() {
        Some([]) => "(empty)".to_string(),
        Some(symbols) => symbols.join(","),
        None => "UNCHANGED".to_string(),
    }
}

pub fn format_action(action: &PortfolioAction) -> String {
    match action {
        PortfolioAction::SetHoldings { symbol, weight } => format!("set {symbol} {weight:.4}"),
        PortfolioAction::Liquidate { symbol } => format!("liquidate {symbol}"),
    }
}

pub fn format_report(report: &ReplayReport) -> String {
    let mut out = String::new();
    for day in &report.days {
        let mut line = day.date.format(DATE_FORMAT).to_string();
        for symbol in &day.changes.added {
            line.push_str(&format!(" +{symbol}"));
        }
        for symbol in &day.changes.removed {
            line.push_str(&format!(" -{symbol}"));
        }
        out.push_str(&line);
        out.push('\n');
        for action in &day.actions {
            out.push_str("    ");
            out.push_str(&format_action(action));
            out.push('\n');
        }
    }
    out
}

fn config_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

pub fn run_resolve(
    config_path: &Path,
    date: NaiveDate,
    mode_override: Option<FeedMode>,
) -> Result<(), FeedError> {
    let config = load_config(config_path)?;
    let mode = match mode_override {
        Some(m) => m,
        None => configured_mode(&config)?,
    };

    let mut resolver = build_resolver(&config, mode, config_dir(config_path))?;
    eprintln!("Resolving {} universe for {}", resolver.mode(), date);
    let result = resolver.resolve_for_date(date)?;
    println!("{}", format_result(&result));
    Ok(())
}

pub fn run_replay_command(
    config_path: &Path,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    prices_dir: Option<&Path>,
    selection_size: Option<usize>,
) -> Result<(), FeedError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let replay_config = build_replay_config(&config, start, end, selection_size)?;

    let mut resolver = build_resolver(&config, FeedMode::Historical, config_dir(config_path))?;

    let prices_dir = prices_dir
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("replay", "prices_dir").map(PathBuf::from));
    let price_adapter = prices_dir.map(CsvPriceAdapter::new);
    let prices = price_adapter.as_ref().map(|a| a as &dyn PricePort);

    eprintln!(
        "Replaying {} to {} (top {})",
        replay_config.start_date, replay_config.end_date, replay_config.selection_size
    );
    let report = run_replay(&mut resolver, prices, &replay_config)?;

    print!("{}", format_report(&report));
    eprintln!(
        "{} days resolved, {} unchanged, {} with changes; final universe: {}",
        report.resolved_days,
        report.unchanged_days,
        report.days.len(),
        format_result(&UniverseResult::Symbols(report.universe.clone()))
    );
    Ok(())
}

pub fn run_inspect(path: &Path, live: bool, date: Option<NaiveDate>) -> Result<(), FeedError> {
    let raw = feed::decode_payload(fs::read(path)?)?;
    let mode = if live { FeedMode::Live } else { FeedMode::Historical };
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let records = feed::parse(&raw, mode, date)?;
    if records.is_empty() {
        println!("no records");
        return Ok(());
    }

    let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    dates.sort();
    dates.dedup();
    for record in &records {
        println!(
            "{} {}",
            record.date.format(DATE_FORMAT),
            format_result(&UniverseResult::Symbols(record.symbols.clone()))
        );
    }
    eprintln!(
        "{} records, {} distinct dates, {} duplicates",
        records.len(),
        dates.len(),
        records.len() - dates.len()
    );
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), FeedError> {
    let config = load_config(config_path)?;

    validate_feed_config(&config)?;
    let mode = configured_mode(&config)?;
    eprintln!("Feed: {} ({})", mode, build_feed_urls(&config).for_mode(mode));

    if config.get_string("replay", "start_date").is_some()
        || config.get_string("replay", "end_date").is_some()
    {
        validate_replay_config(&config)?;
        eprintln!("Replay section is valid.");
    }

    eprintln!("Configuration is valid.");
    Ok(())
}
