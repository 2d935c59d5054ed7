//! CSV export of record sequences.
//!
//! Output uses the loader's column order, so an exported file loads back
//! into equal records.

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::loader::COLUMNS;
use crate::domain::{Record, DATE_FORMAT};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write `records` as CSV (header included) to `writer`.
pub fn write_csv<W: Write, R: AsRef<Record>>(records: &[R], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for r in records {
        let r = r.as_ref();
        wtr.write_record([
            r.date().format(DATE_FORMAT).to_string(),
            r.company().to_string(),
            r.open().to_string(),
            r.high().to_string(),
            r.low().to_string(),
            r.close().to_string(),
            r.volume().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `records` as a CSV string.
pub fn export_csv_string<R: AsRef<Record>>(records: &[R]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Write `records` to `path`, creating parent directories as needed.
pub fn export_csv<R: AsRef<Record>>(records: &[R], path: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Create {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(records, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), records = records.len(), "exported CSV");
    Ok(path.to_path_buf())
}
