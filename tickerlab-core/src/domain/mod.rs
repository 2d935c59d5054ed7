//! Domain types: records, raw rows, and row errors.

pub mod error;
pub mod record;
pub mod row;

pub use error::{RowError, RowErrorKind};
pub use record::{normalize_ticker, validate, Record, DATE_FORMAT};
pub use row::RawRow;
