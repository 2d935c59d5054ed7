//! CSV loader for `date,company,open,high,low,close,volume` files.
//!
//! Every data row is validated on its own. Under [`RowPolicy::Skip`] a bad
//! row is logged and recorded as a [`RowFailure`] with its 1-based source
//! line; under [`RowPolicy::Abort`] the first bad row ends the load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{validate, RawRow, Record, RowError};

/// Columns a source must carry, in export order.
pub const COLUMNS: [&str; 7] = ["date", "company", "open", "high", "low", "close", "volume"];

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Log it, record it, keep going.
    #[default]
    Skip,
    /// Stop the whole load.
    Abort,
}

/// A rejected row and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based source line (the header is line 1).
    pub line: u64,
    pub error: RowError,
}

/// Outcome of a batch load: accepted records plus rejected rows.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub failures: Vec<RowFailure>,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }

    /// Validate one row and file it under records or failures per `policy`.
    pub(crate) fn push_row(
        &mut self,
        line: u64,
        row: Result<RawRow, RowError>,
        policy: RowPolicy,
    ) -> Result<(), LoadError> {
        match row.and_then(|r| validate(&r)) {
            Ok(record) => {
                self.records.push(record);
                Ok(())
            }
            Err(error) => match policy {
                RowPolicy::Abort => Err(LoadError::Row {
                    line,
                    source: error,
                }),
                RowPolicy::Skip => {
                    warn!(line, kind = %error.kind(), reason = %error, "skipping row");
                    self.failures.push(RowFailure { line, error });
                    Ok(())
                }
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV header must be exactly {expected:?} (any case, any order), got {found:?}")]
    Header {
        expected: Vec<&'static str>,
        found: Vec<String>,
    },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: RowError,
    },
}

/// Load and validate a CSV file.
pub fn load_csv(path: impl AsRef<Path>, policy: RowPolicy) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let report = load_csv_from_reader(file, policy)?;
    info!(
        path = %path.display(),
        records = report.records.len(),
        skipped = report.skipped(),
        "loaded CSV"
    );
    Ok(report)
}

/// Load and validate CSV text from any reader.
pub fn load_csv_from_reader<Rd: Read>(reader: Rd, policy: RowPolicy) -> Result<LoadReport, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    check_header(&headers)?;

    let mut report = LoadReport::default();
    for (index, result) in rdr.records().enumerate() {
        // Fallback when the reader cannot report a position.
        let counted = index as u64 + 2;
        let (line, row) = match result {
            Ok(record) => {
                let line = record.position().map_or(counted, |p| p.line());
                let row = if record.len() == headers.len() {
                    Ok(headers.iter().zip(record.iter()).collect::<RawRow>())
                } else {
                    Err(RowError::parse(
                        "row",
                        &record.iter().collect::<Vec<_>>().join(","),
                        format!("expected {} fields, found {}", headers.len(), record.len()),
                    ))
                };
                (line, row)
            }
            Err(e) => {
                let line = e.position().map_or(counted, |p| p.line());
                (line, Err(RowError::parse("row", "", e)))
            }
        };
        report.push_row(line, row, policy)?;
    }
    Ok(report)
}

fn check_header(headers: &[String]) -> Result<(), LoadError> {
    let found: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let expected: BTreeSet<&str> = COLUMNS.iter().copied().collect();
    if headers.len() != COLUMNS.len() || found != expected {
        return Err(LoadError::Header {
            expected: COLUMNS.to_vec(),
            found: headers.to_vec(),
        });
    }
    Ok(())
}
