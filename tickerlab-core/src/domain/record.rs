//! Validated daily OHLCV records and the validator that builds them.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use super::error::RowError;
use super::row::RawRow;

/// Date format accepted for the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily OHLCV observation for one company.
///
/// Fields are private: a `Record` only exists once the invariants below hold,
/// and it is never mutated afterwards.
///
/// - every price is finite and `>= 0`
/// - `low <= open <= high`
/// - `low <= close <= high`
///
/// The ticker is kept as `Arc<str>` so cloning a record into several ordered
/// views shares the text instead of copying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    date: NaiveDate,
    company: Arc<str>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl Record {
    /// Build a record, normalizing the ticker and checking the OHLC invariants.
    pub fn new(
        date: NaiveDate,
        company: &str,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, RowError> {
        let company = normalize_ticker(company);
        if company.is_empty() {
            return Err(RowError::validation("company must not be empty"));
        }
        check_prices(open, high, low, close)?;
        Ok(Self {
            date,
            company: company.into(),
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

/// Trim and uppercase a ticker. Used for stored records and for queries.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn check_prices(open: f64, high: f64, low: f64, close: f64) -> Result<(), RowError> {
    let prices = [open, high, low, close];
    if prices.iter().any(|p| !p.is_finite()) {
        return Err(RowError::validation("non-finite price not allowed"));
    }
    if prices.iter().any(|&p| p < 0.0) {
        return Err(RowError::validation("negative price/volume not allowed"));
    }
    if low > high || !(low <= open && open <= high) || !(low <= close && close <= high) {
        return Err(RowError::validation("OHLC consistency failed"));
    }
    Ok(())
}

fn field<'a>(row: &'a RawRow, name: &'static str) -> Result<&'a str, RowError> {
    row.get(name)
        .ok_or_else(|| RowError::parse(name, "", "missing field"))
}

fn parse_price(row: &RawRow, name: &'static str) -> Result<f64, RowError> {
    let raw = field(row, name)?;
    raw.parse::<f64>()
        .map_err(|e| RowError::parse(name, raw, e))
}

/// Turn one raw row into a [`Record`].
///
/// Malformed dates and non-numeric cells are [`RowError::Parse`]; values that
/// parse but break an invariant (including a negative volume) are
/// [`RowError::Validation`].
pub fn validate(row: &RawRow) -> Result<Record, RowError> {
    let raw_date = field(row, "date")?;
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .map_err(|e| RowError::parse("date", raw_date, e))?;
    let company = field(row, "company")?;

    let open = parse_price(row, "open")?;
    let high = parse_price(row, "high")?;
    let low = parse_price(row, "low")?;
    let close = parse_price(row, "close")?;

    let raw_volume = field(row, "volume")?;
    // Wide enough for the whole u64 range plus a sign.
    let volume = raw_volume
        .parse::<i128>()
        .map_err(|e| RowError::parse("volume", raw_volume, e))?;
    if volume < 0 {
        return Err(RowError::validation("negative price/volume not allowed"));
    }
    let volume = u64::try_from(volume).map_err(|e| RowError::parse("volume", raw_volume, e))?;

    Record::new(date, company, open, high, low, close, volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowErrorKind;

    fn row(date: &str, open: &str, high: &str, low: &str, close: &str, volume: &str) -> RawRow {
        RawRow::new()
            .with("date", date)
            .with("company", " abc ")
            .with("open", open)
            .with("high", high)
            .with("low", low)
            .with("close", close)
            .with("volume", volume)
    }

    #[test]
    fn valid_row_builds_record() {
        let rec = validate(&row("2024-01-02", "10", "12", "9", "11", "1500")).unwrap();
        assert_eq!(rec.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(rec.company(), "ABC");
        assert_eq!(rec.open(), 10.0);
        assert_eq!(rec.high(), 12.0);
        assert_eq!(rec.low(), 9.0);
        assert_eq!(rec.close(), 11.0);
        assert_eq!(rec.volume(), 1500);
    }

    #[test]
    fn flat_bar_is_valid() {
        assert!(validate(&row("2024-01-02", "5", "5", "5", "5", "0")).is_ok());
    }

    #[test]
    fn low_above_high_is_validation_error() {
        let err = validate(&row("2024-01-02", "7", "5", "10", "7", "100")).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Validation);
        assert_eq!(err.to_string(), "OHLC consistency failed");
    }

    #[test]
    fn negative_open_is_validation_error() {
        let err = validate(&row("2024-01-02", "-1", "5", "1", "2", "100")).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Validation);
    }

    #[test]
    fn negative_volume_is_validation_error() {
        let err = validate(&row("2024-01-02", "2", "5", "1", "2", "-100")).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Validation);
    }

    #[test]
    fn open_outside_range_is_validation_error() {
        let err = validate(&row("2024-01-02", "6", "5", "1", "2", "100")).unwrap_err();
        assert_eq!(err, RowError::validation("OHLC consistency failed"));
        let err = validate(&row("2024-01-02", "2", "5", "1", "0.5", "100")).unwrap_err();
        assert_eq!(err, RowError::validation("OHLC consistency failed"));
    }

    #[test]
    fn impossible_date_is_parse_error() {
        let err = validate(&row("2024-13-40", "2", "5", "1", "2", "100")).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Parse);
        assert!(matches!(err, RowError::Parse { field: "date", .. }));
    }

    #[test]
    fn non_numeric_price_is_parse_error() {
        let err = validate(&row("2024-01-02", "abc", "5", "1", "2", "100")).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "open", .. }));
    }

    #[test]
    fn fractional_volume_is_parse_error() {
        let err = validate(&row("2024-01-02", "2", "5", "1", "2", "10.5")).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "volume", .. }));
    }

    #[test]
    fn nan_price_is_rejected() {
        let err = validate(&row("2024-01-02", "NaN", "5", "1", "2", "10")).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Validation);
    }

    #[test]
    fn missing_field_is_parse_error() {
        let incomplete = RawRow::new().with("date", "2024-01-02").with("company", "X");
        let err = validate(&incomplete).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "open", .. }));
    }

    #[test]
    fn blank_company_is_rejected() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = Record::new(d, "   ", 1.0, 1.0, 1.0, 1.0, 1).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Validation);
    }

    #[test]
    fn record_serializes_date_as_iso() {
        let rec = validate(&row("2024-01-02", "10", "12", "9", "11", "1500")).unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["company"], "ABC");
        assert_eq!(json["volume"], 1500);
    }

    #[test]
    fn volume_above_i64_max_is_accepted() {
        let rec = validate(&row("2024-01-02", "10", "12", "9", "11", "9223372036854775808")).unwrap();
        assert_eq!(rec.volume(), 1u64 << 63);

        let max = u64::MAX.to_string();
        let rec = validate(&row("2024-01-02", "10", "12", "9", "11", &max)).unwrap();
        assert_eq!(rec.volume(), u64::MAX);
    }

    #[test]
    fn volume_above_u64_max_is_parse_error() {
        let err = validate(&row("2024-01-02", "10", "12", "9", "11", "18446744073709551616")).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "volume", .. }));
    }

    #[test]
    fn huge_negative_volume_is_still_validation_error() {
        let err = validate(&row("2024-01-02", "10", "12", "9", "11", "-9223372036854775809")).unwrap_err();
        assert_eq!(err.kind(), RowErrorKind::Validation);
    }
}
