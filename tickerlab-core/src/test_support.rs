//! Shared fixtures for unit tests.

use chrono::NaiveDate;

use crate::domain::Record;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Flat-ish bar: open 10, high 12, low 9, close 11.
pub fn rec(d: &str, company: &str, volume: u64) -> Record {
    Record::new(date(d), company, 10.0, 12.0, 9.0, 11.0, volume).unwrap()
}

pub fn bar(d: &str, company: &str, open: f64, high: f64, low: f64, close: f64) -> Record {
    Record::new(date(d), company, open, high, low, close, 1_000).unwrap()
}

/// Records for `company` on consecutive days with the given closes.
///
/// open = previous close (or close for the first bar), high/low pad by 1.0.
pub fn closes(company: &str, closes: &[f64]) -> Vec<Record> {
    let base = date("2024-01-01");
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Record::new(
                base + chrono::Duration::days(i as i64),
                company,
                open,
                open.max(close) + 1.0,
                (open.min(close) - 1.0).max(0.0),
                close,
                1_000,
            )
            .unwrap()
        })
        .collect()
}
