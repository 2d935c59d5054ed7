//! Analytics over a record subset: average volume, price summary and
//! two-company comparison.
//!
//! Nothing here sorts. `first_open` and `last_close` are positional, so they
//! mean "earliest open" / "latest close" only for date-ascending input such
//! as a block from [`crate::search::find_company_block`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Record;

/// Price summary of a non-empty record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Max `high` across all records.
    pub highest: f64,
    /// Min `low` across all records.
    pub lowest: f64,
    /// `open` of the first record as given.
    pub first_open: f64,
    /// `close` of the last record as given.
    pub last_close: f64,
}

/// Arithmetic mean of `volume`; `0.0` for an empty slice.
pub fn average_volume<R: AsRef<Record>>(records: &[R]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: u128 = records.iter().map(|r| u128::from(r.as_ref().volume())).sum();
    total as f64 / records.len() as f64
}

/// Summarize `records`, or `None` when there is nothing to summarize.
pub fn summarize<R: AsRef<Record>>(records: &[R]) -> Option<Summary> {
    let first = records.first()?.as_ref();
    let last = records.last()?.as_ref();

    let (highest, lowest) = records.iter().fold(
        (f64::NEG_INFINITY, f64::INFINITY),
        |(hi, lo), r| {
            let r = r.as_ref();
            (hi.max(r.high()), lo.min(r.low()))
        },
    );

    Some(Summary {
        highest,
        lowest,
        first_open: first.open(),
        last_close: last.close(),
    })
}

/// One row of a [`CompanyReport`]; the ticker lives on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&Record> for ReportRow {
    fn from(r: &Record) -> Self {
        Self {
            date: r.date(),
            open: r.open(),
            high: r.high(),
            low: r.low(),
            close: r.close(),
            volume: r.volume(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalytics {
    pub avg_volume: f64,
    pub summary: Option<Summary>,
}

/// Serializable company query result: the block plus its analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyReport {
    pub company: String,
    pub records: Vec<ReportRow>,
    pub analytics: ReportAnalytics,
}

impl CompanyReport {
    /// Build a report for a date-ascending block.
    pub fn new<R: AsRef<Record>>(company: &str, block: &[R]) -> Self {
        Self {
            company: crate::domain::normalize_ticker(company),
            records: block.iter().map(|r| ReportRow::from(r.as_ref())).collect(),
            analytics: ReportAnalytics {
                avg_volume: average_volume(block),
                summary: summarize(block),
            },
        }
    }

    /// First and last date of the block.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.records.first()?.date, self.records.last()?.date))
    }
}

/// Percent move from the first open to the last close.
///
/// `None` with fewer than two records or a zero first open.
pub fn percent_change<R: AsRef<Record>>(records: &[R]) -> Option<f64> {
    if records.len() < 2 {
        return None;
    }
    let first_open = records.first()?.as_ref().open();
    let last_close = records.last()?.as_ref().close();
    if first_open == 0.0 {
        return None;
    }
    Some((last_close - first_open) / first_open * 100.0)
}

/// First and last date present in both date-ascending blocks.
pub fn common_date_range<A, B>(left: &[A], right: &[B]) -> Option<(NaiveDate, NaiveDate)>
where
    A: AsRef<Record>,
    B: AsRef<Record>,
{
    let (mut i, mut j) = (0, 0);
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    while i < left.len() && j < right.len() {
        let (a, b) = (left[i].as_ref().date(), right[j].as_ref().date());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                range = Some(range.map_or((a, a), |(first, _)| (first, a)));
                i += 1;
                j += 1;
            }
        }
    }
    range
}

/// One side of a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSide {
    #[serde(flatten)]
    pub report: CompanyReport,
    pub percent_change: Option<f64>,
}

impl CompareSide {
    pub fn new<R: AsRef<Record>>(company: &str, block: &[R]) -> Self {
        Self {
            report: CompanyReport::new(company, block),
            percent_change: percent_change(block),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.report.records.is_empty()
    }
}

/// Two company blocks side by side. Either side may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub t1: String,
    pub t2: String,
    pub left: CompareSide,
    pub right: CompareSide,
    pub common_range: Option<(NaiveDate, NaiveDate)>,
}

impl Comparison {
    pub fn new<A, B>(t1: &str, left: &[A], t2: &str, right: &[B]) -> Self
    where
        A: AsRef<Record>,
        B: AsRef<Record>,
    {
        let left_side = CompareSide::new(t1, left);
        let right_side = CompareSide::new(t2, right);
        Self {
            t1: left_side.report.company.clone(),
            t2: right_side.report.company.clone(),
            common_range: common_date_range(left, right),
            left: left_side,
            right: right_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bar, closes, date, rec};

    #[test]
    fn average_volume_of_empty_is_zero() {
        let empty: Vec<Record> = Vec::new();
        assert_eq!(average_volume(&empty), 0.0);
    }

    #[test]
    fn average_volume_is_mean() {
        let rs = vec![
            rec("2024-01-01", "A", 100),
            rec("2024-01-02", "A", 200),
            rec("2024-01-03", "A", 600),
        ];
        assert_eq!(average_volume(&rs), 300.0);
    }

    #[test]
    fn average_volume_does_not_overflow() {
        let rs = vec![rec("2024-01-01", "A", u64::MAX), rec("2024-01-02", "A", u64::MAX)];
        assert_eq!(average_volume(&rs), u64::MAX as f64);
    }

    #[test]
    fn summarize_empty_is_none() {
        let empty: Vec<Record> = Vec::new();
        assert_eq!(summarize(&empty), None);
    }

    #[test]
    fn summarize_uses_extremes_and_positions() {
        let rs = vec![
            bar("2024-01-01", "A", 10.0, 15.0, 8.0, 12.0),
            bar("2024-01-02", "A", 12.0, 20.0, 11.0, 19.0),
            bar("2024-01-03", "A", 19.0, 19.5, 5.0, 6.0),
        ];
        let s = summarize(&rs).unwrap();
        assert_eq!(s.highest, 20.0);
        assert_eq!(s.lowest, 5.0);
        assert_eq!(s.first_open, 10.0);
        assert_eq!(s.last_close, 6.0);
    }

    #[test]
    fn summarize_is_positional_not_chronological() {
        // Reverse-dated input: first_open comes from the first element anyway.
        let rs = vec![
            bar("2024-01-03", "A", 30.0, 31.0, 29.0, 30.5),
            bar("2024-01-01", "A", 10.0, 11.0, 9.0, 10.5),
        ];
        let s = summarize(&rs).unwrap();
        assert_eq!(s.first_open, 30.0);
        assert_eq!(s.last_close, 10.5);
    }

    #[test]
    fn report_json_shape() {
        let rs = vec![
            bar("2024-01-01", "AAA", 10.0, 15.0, 8.0, 12.0),
            bar("2024-01-02", "AAA", 12.0, 20.0, 11.0, 19.0),
        ];
        let report = CompanyReport::new(" aaa", &rs);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["company"], "AAA");
        assert_eq!(json["records"].as_array().unwrap().len(), 2);
        assert_eq!(json["records"][0]["date"], "2024-01-01");
        assert_eq!(json["analytics"]["avg_volume"], 1000.0);
        assert_eq!(json["analytics"]["summary"]["highest"], 20.0);
        assert_eq!(json["analytics"]["summary"]["last_close"], 19.0);
    }

    #[test]
    fn empty_report_has_no_summary() {
        let empty: Vec<Record> = Vec::new();
        let report = CompanyReport::new("X", &empty);
        assert!(report.analytics.summary.is_none());
        assert_eq!(report.date_range(), None);
    }

    #[test]
    fn percent_change_first_open_to_last_close() {
        let rs = vec![
            bar("2024-01-01", "A", 100.0, 101.0, 99.0, 100.5),
            bar("2024-01-02", "A", 100.5, 111.0, 100.0, 110.0),
        ];
        let pct = percent_change(&rs).unwrap();
        assert!((pct - 10.0).abs() < 1e-12);
    }

    #[test]
    fn percent_change_needs_two_records() {
        let one = vec![bar("2024-01-01", "A", 100.0, 101.0, 99.0, 100.5)];
        assert_eq!(percent_change(&one), None);
        let empty: Vec<Record> = Vec::new();
        assert_eq!(percent_change(&empty), None);
    }

    #[test]
    fn percent_change_with_zero_open_is_none() {
        let rs = vec![
            bar("2024-01-01", "A", 0.0, 1.0, 0.0, 1.0),
            bar("2024-01-02", "A", 1.0, 2.0, 1.0, 2.0),
        ];
        assert_eq!(percent_change(&rs), None);
    }

    #[test]
    fn common_range_spans_shared_dates() {
        let left = closes("AAA", &[10.0, 11.0, 12.0, 13.0]); // 01-01..01-04
        let right: Vec<Record> = closes("BBB", &[5.0, 6.0, 7.0, 8.0, 9.0])
            .into_iter()
            .skip(2) // 01-03..01-05
            .collect();
        assert_eq!(
            common_date_range(&left, &right),
            Some((date("2024-01-03"), date("2024-01-04")))
        );
    }

    #[test]
    fn comparison_with_one_missing_side() {
        let left = closes("AAA", &[10.0, 12.0]);
        let empty: Vec<Record> = Vec::new();
        let cmp = Comparison::new("aaa", &left, " zzz ", &empty);

        assert_eq!(cmp.t1, "AAA");
        assert_eq!(cmp.t2, "ZZZ");
        assert!(!cmp.left.is_empty());
        assert!(cmp.right.is_empty());
        assert!((cmp.left.percent_change.unwrap() - 20.0).abs() < 1e-12);
        assert_eq!(cmp.right.percent_change, None);
        assert_eq!(cmp.common_range, None);

        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["left"]["company"], "AAA");
        assert!(json["right"]["percent_change"].is_null());
        assert_eq!(json["right"]["records"].as_array().unwrap().len(), 0);
    }
}
