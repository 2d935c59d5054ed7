//! Terminal and JSON rendering of company reports and comparisons.

use anyhow::{Context, Result};
use serde::Serialize;
use tickerlab_core::analytics::{CompanyReport, CompareSide, Comparison};
use tickerlab_core::indicators::MovingAverages;

/// Decimal places for moving-average output, text and JSON alike.
pub const MA_DECIMALS: i32 = 4;

/// `--json` payload: the company report with optional moving averages.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    #[serde(flatten)]
    pub report: &'a CompanyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_averages: Option<MovingAverages>,
}

pub fn to_json(report: &CompanyReport, mas: Option<&MovingAverages>) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        report,
        moving_averages: mas.map(|m| m.rounded(MA_DECIMALS)),
    })
    .context("failed to serialize report")
}

pub fn comparison_to_json(comparison: &Comparison) -> Result<String> {
    serde_json::to_string_pretty(comparison).context("failed to serialize comparison")
}

/// Header, the first `rows` records and the analytics block.
pub fn print_report(report: &CompanyReport, rows: usize) {
    let Some((first, last)) = report.date_range() else {
        println!("No records found for {}", report.company);
        return;
    };

    println!(
        "Found {} records for {} ({first} to {last})",
        report.records.len(),
        report.company
    );
    println!();
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(79));
    for r in report.records.iter().take(rows) {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14}",
            r.date.to_string(),
            r.open,
            r.high,
            r.low,
            r.close,
            r.volume
        );
    }
    if report.records.len() > rows {
        println!("... {} more", report.records.len() - rows);
    }

    println!();
    println!("Average volume: {:.2}", report.analytics.avg_volume);
    if let Some(s) = &report.analytics.summary {
        println!("Highest:        {:.2}", s.highest);
        println!("Lowest:         {:.2}", s.lowest);
        println!("First open:     {:.2}", s.first_open);
        println!("Last close:     {:.2}", s.last_close);
    }
}

/// Latest value of each moving average.
pub fn print_moving_averages(mas: &MovingAverages) {
    if mas.is_empty() {
        return;
    }
    println!();
    println!("{:<10} {:>14}", "Indicator", "Latest");
    println!("{}", "-".repeat(25));
    for (label, value) in mas.rounded(MA_DECIMALS).latest() {
        println!("{label:<10} {value:>14.4}");
    }
}

/// Side-by-side table of two companies.
pub fn print_comparison(comparison: &Comparison) {
    let sides = [&comparison.left, &comparison.right];
    println!(
        "{:<12} {:>8} {:>12} {:>12} {:>10} {:>14}",
        "Company", "Records", "First Open", "Last Close", "Change", "Avg Volume"
    );
    println!("{}", "-".repeat(73));
    for side in sides {
        println!("{}", comparison_row(side));
    }
    println!();
    match comparison.common_range {
        Some((first, last)) => println!("Common range: {first} to {last}"),
        None => println!("Common range: (none)"),
    }
}

fn comparison_row(side: &CompareSide) -> String {
    let report = &side.report;
    let (first_open, last_close) = match &report.analytics.summary {
        Some(s) => (format!("{:.2}", s.first_open), format!("{:.2}", s.last_close)),
        None => ("-".to_string(), "-".to_string()),
    };
    let change = side
        .percent_change
        .map(|p| format!("{p:+.2}%"))
        .unwrap_or_else(|| "-".to_string());
    let avg_volume = if side.is_empty() {
        "-".to_string()
    } else {
        format!("{:.2}", report.analytics.avg_volume)
    };
    format!(
        "{:<12} {:>8} {:>12} {:>12} {:>10} {:>14}",
        report.company,
        report.records.len(),
        first_open,
        last_close,
        change,
        avg_volume
    )
}
