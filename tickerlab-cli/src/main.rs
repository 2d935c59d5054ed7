//! TickerLab CLI: load, query and fetch daily OHLCV records.
//!
//! Commands:
//! - `load`: load a CSV file and report what was kept and skipped
//! - `company`: company block with analytics, optional date window and export
//! - `fetch`: fetch bars from Yahoo Finance and summarize them
//! - `compare`: two companies side by side, from the CSV file or live
//! - `config`: print the effective configuration as TOML

mod config;
mod report;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tickerlab_core::analytics::{CompanyReport, Comparison};
use tickerlab_core::data::{
    export_csv, fetch_records, load_csv, CircuitBreaker, FetchError, FetchRange,
    MarketDataProvider, RowPolicy, YahooProvider,
};
use tickerlab_core::domain::{normalize_ticker, Record, DATE_FORMAT};
use tickerlab_core::indicators::moving_averages;
use tickerlab_core::search::filter_date_range;
use tickerlab_core::Snapshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "tickerlab",
    about = "TickerLab CLI: daily OHLCV record store and company analytics"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./tickerlab.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV file and report records, skipped rows and companies.
    Load {
        /// CSV file. Defaults to `data_path` from the config.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Abort on the first invalid row instead of skipping it.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Show one company's records and analytics.
    Company {
        /// Ticker symbol (case-insensitive).
        ticker: String,

        /// CSV file. Defaults to `data_path` from the config.
        #[arg(long)]
        data: Option<PathBuf>,

        /// First date to include (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Last date to include (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Number of records to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,

        /// Export the block as CSV. Without a value, writes {output_dir}/{TICKER}_data.csv.
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,

        /// Print the report as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Include moving averages.
        #[arg(long, default_value_t = false)]
        ma: bool,

        /// Abort on the first invalid row instead of skipping it.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Fetch daily bars from Yahoo Finance and summarize them.
    Fetch {
        /// Ticker symbol (e.g., AAPL, TCS.NS).
        ticker: String,

        /// Range to fetch (e.g., 1mo, 6mo, 1y). Defaults to the config.
        #[arg(long)]
        period: Option<String>,

        /// Bar interval (e.g., 1d). Defaults to the config.
        #[arg(long)]
        interval: Option<String>,

        /// Write the fetched bars as CSV to this path.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Print the report as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare two companies: record counts, open/close and percent change.
    Compare {
        /// First ticker.
        t1: String,

        /// Second ticker.
        t2: String,

        /// Where the records come from.
        #[arg(long, value_enum, default_value_t = Source::Csv)]
        source: Source,

        /// CSV file for `--source csv`. Defaults to `data_path` from the config.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Range to fetch for `--source live`. Defaults to the config.
        #[arg(long)]
        period: Option<String>,

        /// Bar interval for `--source live`. Defaults to the config.
        #[arg(long)]
        interval: Option<String>,

        /// Print the comparison as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// The configured CSV file.
    Csv,
    /// Yahoo Finance.
    Live,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Load { data, strict } => run_load(&config, data, strict),
        Commands::Company {
            ticker,
            data,
            start,
            end,
            rows,
            export,
            json,
            ma,
            strict,
        } => {
            let opts = CompanyOptions {
                start: parse_date(start.as_deref())?,
                end: parse_date(end.as_deref())?,
                rows,
                export,
                json,
                ma,
            };
            run_company(&config, &ticker, data, strict, &opts)
        }
        Commands::Fetch {
            ticker,
            period,
            interval,
            export,
            json,
        } => run_fetch(&config, &ticker, period, interval, export, json),
        Commands::Compare {
            t1,
            t2,
            source,
            data,
            period,
            interval,
            json,
        } => {
            let range = fetch_range(&config, period, interval);
            run_compare(&config, &t1, &t2, source, data, &range, json)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays clean for `--json`.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
    })
    .transpose()
}

fn row_policy(config: &AppConfig, strict: bool) -> RowPolicy {
    if strict {
        RowPolicy::Abort
    } else {
        config.row_policy
    }
}

fn load_snapshot(path: &Path, policy: RowPolicy) -> Result<Snapshot> {
    let report =
        load_csv(path, policy).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(Snapshot::from_report(report))
}

fn run_load(config: &AppConfig, data: Option<PathBuf>, strict: bool) -> Result<()> {
    let path = data.unwrap_or_else(|| config.data_path.clone());
    let snapshot = load_snapshot(&path, row_policy(config, strict))?;

    println!("Data file:  {}", path.display());
    println!("Records:    {}", snapshot.len());
    println!("Skipped:    {}", snapshot.skipped());
    match snapshot.date_range() {
        Some((first, last)) => println!("Date range: {first} to {last}"),
        None => println!("Date range: (empty)"),
    }
    println!("Hash:       {}", snapshot.dataset_hash());

    let companies = snapshot.companies();
    if companies.is_empty() {
        return Ok(());
    }
    println!();
    println!("{:<12} {:>8} {:>14}", "Company", "Records", "Avg Volume");
    println!("{}", "-".repeat(36));
    for company in companies {
        let block = snapshot.company_block(company);
        println!(
            "{:<12} {:>8} {:>14.2}",
            company,
            block.len(),
            tickerlab_core::average_volume(block)
        );
    }
    Ok(())
}

struct CompanyOptions {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    rows: usize,
    export: Option<Option<PathBuf>>,
    json: bool,
    ma: bool,
}

fn run_company(
    config: &AppConfig,
    ticker: &str,
    data: Option<PathBuf>,
    strict: bool,
    opts: &CompanyOptions,
) -> Result<()> {
    let company = normalize_ticker(ticker);
    if company.is_empty() {
        bail!("ticker must not be empty");
    }

    let path = data.unwrap_or_else(|| config.data_path.clone());
    let snapshot = load_snapshot(&path, row_policy(config, strict))?;

    let block = snapshot.company_block(&company);
    if block.is_empty() {
        bail!("no records found for {company} in {}", path.display());
    }
    let block = filter_date_range(block, opts.start, opts.end);
    if block.is_empty() {
        bail!("no records for {company} in the selected date range");
    }

    let export_path = opts
        .export
        .as_ref()
        .map(|explicit| explicit.clone().unwrap_or_else(|| config.export_path(&company)));
    present(config, &company, block, opts.rows, opts.json, opts.ma)?;
    if let Some(path) = export_path {
        export_block(block, &path)?;
    }
    Ok(())
}

fn fetch_range(config: &AppConfig, period: Option<String>, interval: Option<String>) -> FetchRange {
    let mut range = config.fetch.clone();
    if let Some(period) = period {
        range.period = period;
    }
    if let Some(interval) = interval {
        range.interval = interval;
    }
    range
}

/// Yahoo provider whose breaker state is restored from and saved to disk,
/// so a cooldown carries over between runs.
struct LiveSource {
    breaker: Arc<CircuitBreaker>,
    provider: YahooProvider,
    state_path: PathBuf,
}

impl LiveSource {
    fn new(config: &AppConfig) -> Result<Self> {
        let state_path = config.breaker_state_path();
        let breaker = Arc::new(CircuitBreaker::load_or_default(&state_path));
        let provider = YahooProvider::new(Arc::clone(&breaker))?;
        Ok(Self {
            breaker,
            provider,
            state_path,
        })
    }

    fn fetch(&self, ticker: &str, range: &FetchRange, policy: RowPolicy) -> Result<Snapshot, FetchError> {
        if !self.provider.is_available() {
            return Err(FetchError::CircuitBreakerTripped);
        }
        let result = fetch_records(&self.provider, ticker, range, policy);
        if let Err(e) = self.breaker.save(&self.state_path) {
            warn!(path = %self.state_path.display(), error = %e, "failed to save breaker state");
        }
        result.map(Snapshot::from_report)
    }
}

fn run_fetch(
    config: &AppConfig,
    ticker: &str,
    period: Option<String>,
    interval: Option<String>,
    export: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let range = fetch_range(config, period, interval);
    let source = LiveSource::new(config)?;
    let snapshot = source
        .fetch(ticker, &range, config.row_policy)
        .with_context(|| format!("failed to fetch {}", ticker.trim()))?;

    let company = normalize_ticker(ticker);
    let block = snapshot.company_block(&company);
    if block.is_empty() {
        bail!("provider returned no valid bars for {company}");
    }
    info!(
        symbol = %company,
        period = %range.period,
        interval = %range.interval,
        skipped = snapshot.skipped(),
        "fetch complete"
    );

    present(config, &company, block, 5, json, true)?;
    if let Some(path) = export {
        export_block(block, &path)?;
    }
    Ok(())
}

fn run_compare(
    config: &AppConfig,
    t1: &str,
    t2: &str,
    source: Source,
    data: Option<PathBuf>,
    range: &FetchRange,
    json: bool,
) -> Result<()> {
    let comparison = match source {
        Source::Csv => {
            let path = data.unwrap_or_else(|| config.data_path.clone());
            compare_csv(config, t1, t2, &path)?
        }
        Source::Live => compare_live(config, t1, t2, range)?,
    };

    if json {
        println!("{}", report::comparison_to_json(&comparison)?);
    } else {
        report::print_comparison(&comparison);
    }
    Ok(())
}

fn compare_csv(config: &AppConfig, t1: &str, t2: &str, path: &Path) -> Result<Comparison> {
    let (c1, c2) = compare_tickers(t1, t2)?;
    let snapshot = load_snapshot(path, config.row_policy)?;
    checked_comparison(Comparison::new(
        &c1,
        snapshot.company_block(&c1),
        &c2,
        snapshot.company_block(&c2),
    ))
}

fn compare_live(config: &AppConfig, t1: &str, t2: &str, range: &FetchRange) -> Result<Comparison> {
    let (c1, c2) = compare_tickers(t1, t2)?;
    let source = LiveSource::new(config)?;

    // An unknown symbol leaves its side empty; any other failure aborts.
    let fetch_side = |company: &str| -> Result<Option<Snapshot>> {
        match source.fetch(company, range, config.row_policy) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(FetchError::SymbolNotFound { symbol }) => {
                warn!(symbol = %symbol, "symbol not found");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context(format!("failed to fetch {company}"))),
        }
    };
    let left = fetch_side(&c1)?;
    let right = fetch_side(&c2)?;

    let none: Vec<Arc<Record>> = Vec::new();
    let left_block = left.as_ref().map_or(&none[..], |s| s.company_block(&c1));
    let right_block = right.as_ref().map_or(&none[..], |s| s.company_block(&c2));
    checked_comparison(Comparison::new(&c1, left_block, &c2, right_block))
}

fn compare_tickers(t1: &str, t2: &str) -> Result<(String, String)> {
    let (c1, c2) = (normalize_ticker(t1), normalize_ticker(t2));
    if c1.is_empty() || c2.is_empty() {
        bail!("both tickers must be non-empty");
    }
    Ok((c1, c2))
}

/// One empty side is reported and tolerated; two are an error.
fn checked_comparison(comparison: Comparison) -> Result<Comparison> {
    if comparison.left.is_empty() && comparison.right.is_empty() {
        bail!("no records found for {} or {}", comparison.t1, comparison.t2);
    }
    for side in [&comparison.left, &comparison.right] {
        if side.is_empty() {
            warn!(company = %side.report.company, "no records; showing the other side only");
        }
    }
    Ok(comparison)
}

fn present(
    config: &AppConfig,
    company: &str,
    block: &[Arc<Record>],
    rows: usize,
    json: bool,
    with_ma: bool,
) -> Result<()> {
    let company_report = CompanyReport::new(company, block);
    let mas = with_ma.then(|| moving_averages(block, &config.ma_windows));

    if json {
        println!("{}", report::to_json(&company_report, mas.as_ref())?);
    } else {
        report::print_report(&company_report, rows);
        if let Some(mas) = &mas {
            report::print_moving_averages(mas);
        }
    }
    Ok(())
}

fn export_block(block: &[Arc<Record>], path: &Path) -> Result<()> {
    let written =
        export_csv(block, path).with_context(|| format!("failed to export {}", path.display()))?;
    // stderr keeps --json output parseable
    eprintln!("Exported {} records to {}", block.len(), written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_flag_without_value() {
        let cli = Cli::try_parse_from(["tickerlab", "company", "aaa", "--export"]).unwrap();
        match cli.command {
            Commands::Company { ticker, export, .. } => {
                assert_eq!(ticker, "aaa");
                assert_eq!(export, Some(None));
            }
            _ => panic!("expected company command"),
        }
    }

    #[test]
    fn export_flag_with_value_and_global_config() {
        let cli = Cli::try_parse_from([
            "tickerlab",
            "company",
            "AAA",
            "--export",
            "x.csv",
            "--config",
            "other.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        match cli.command {
            Commands::Company { export, .. } => {
                assert_eq!(export, Some(Some(PathBuf::from("x.csv"))));
            }
            _ => panic!("expected company command"),
        }
    }

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        assert_eq!(
            parse_date(Some(" 2024-01-02 ")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(parse_date(None).unwrap(), None);
        assert!(parse_date(Some("2024-13-40")).is_err());
    }

    #[test]
    fn strict_flag_overrides_config_policy() {
        let config = AppConfig::default();
        assert_eq!(row_policy(&config, false), RowPolicy::Skip);
        assert_eq!(row_policy(&config, true), RowPolicy::Abort);
    }

    #[test]
    fn company_command_exports_to_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        std::fs::write(
            &data,
            "date,company,open,high,low,close,volume\n\
             2024-01-02,AAA,11,12,10,11.5,200\n\
             2024-01-01,aaa,10,11,9,10.5,100\n\
             2024-01-01,BBB,50,51,49,50.5,900\n",
        )
        .unwrap();
        let config = AppConfig {
            output_dir: dir.path().join("out"),
            ..AppConfig::default()
        };
        let opts = CompanyOptions {
            start: None,
            end: None,
            rows: 5,
            export: Some(None),
            json: true,
            ma: false,
        };
        run_company(&config, " aaa ", Some(data), false, &opts).unwrap();

        let exported = std::fs::read_to_string(dir.path().join("out/AAA_data.csv")).unwrap();
        let lines: Vec<&str> = exported.lines().collect();
        assert_eq!(lines[0], "date,company,open,high,low,close,volume");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01-01,AAA"));
    }

    #[test]
    fn company_command_rejects_empty_window() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        std::fs::write(
            &data,
            "date,company,open,high,low,close,volume\n2024-01-01,AAA,10,11,9,10.5,100\n",
        )
        .unwrap();
        let opts = CompanyOptions {
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            end: None,
            rows: 5,
            export: None,
            json: false,
            ma: false,
        };
        assert!(run_company(&AppConfig::default(), "AAA", Some(data), false, &opts).is_err());
    }

    fn write_data(dir: &Path) -> PathBuf {
        let data = dir.join("data.csv");
        std::fs::write(
            &data,
            "date,company,open,high,low,close,volume\n\
             2024-01-01,AAA,10,11,9,10.5,100\n\
             2024-01-02,AAA,10.5,12.5,10,12,200\n\
             2024-01-02,BBB,50,51,45,47.5,900\n\
             2024-01-03,BBB,47.5,48,44,45,900\n",
        )
        .unwrap();
        data
    }

    #[test]
    fn compare_csv_reports_percent_change_per_side() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_data(dir.path());
        let cmp = compare_csv(&AppConfig::default(), "aaa", "bbb", &data).unwrap();

        // AAA: 10 -> 12 is +20%, BBB: 50 -> 45 is -10%
        assert!((cmp.left.percent_change.unwrap() - 20.0).abs() < 1e-9);
        assert!((cmp.right.percent_change.unwrap() + 10.0).abs() < 1e-9);
        let shared = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(cmp.common_range, Some((shared, shared)));
    }

    #[test]
    fn compare_csv_tolerates_one_missing_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_data(dir.path());
        let cmp = compare_csv(&AppConfig::default(), "AAA", "ZZZ", &data).unwrap();
        assert_eq!(cmp.left.report.records.len(), 2);
        assert!(cmp.right.is_empty());
        assert_eq!(cmp.right.percent_change, None);
        assert_eq!(cmp.common_range, None);
    }

    #[test]
    fn compare_csv_fails_when_both_missing() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_data(dir.path());
        assert!(compare_csv(&AppConfig::default(), "YYY", "ZZZ", &data).is_err());
        assert!(compare_csv(&AppConfig::default(), " ", "AAA", &data).is_err());
    }

    #[test]
    fn compare_source_flag_parses() {
        let cli = Cli::try_parse_from([
            "tickerlab", "compare", "tcs.ns", "infy.ns", "--source", "live", "--period", "1y",
        ])
        .unwrap();
        match cli.command {
            Commands::Compare { t1, source, period, .. } => {
                assert_eq!(t1, "tcs.ns");
                assert_eq!(source, Source::Live);
                assert_eq!(period.as_deref(), Some("1y"));
            }
            _ => panic!("expected compare command"),
        }
    }

    #[test]
    fn fetch_range_flags_override_config() {
        let config = AppConfig::default();
        let range = fetch_range(&config, Some("1y".into()), None);
        assert_eq!(range.period, "1y");
        assert_eq!(range.interval, "1d");
    }

    #[test]
    fn open_breaker_on_disk_blocks_live_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            output_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let tripped = CircuitBreaker::default_provider();
        tripped.trip();
        tripped.save(&config.breaker_state_path()).unwrap();

        let source = LiveSource::new(&config).unwrap();
        let err = source
            .fetch("AAPL", &FetchRange::default(), RowPolicy::Skip)
            .unwrap_err();
        assert!(matches!(err, FetchError::CircuitBreakerTripped));
    }
}
