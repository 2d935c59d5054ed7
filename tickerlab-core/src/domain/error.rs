//! Per-row ingestion errors.

use thiserror::Error;

/// Why a raw row could not become a [`Record`](super::Record).
///
/// Row errors are local to one row. The loader decides whether they end a
/// batch or get collected alongside the accepted records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// A field was missing, or its text was not a date / number.
    #[error("cannot parse {field} from '{value}': {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The values parsed but break an OHLCV invariant.
    #[error("{reason}")]
    Validation { reason: String },
}

/// Tag for [`RowError`] without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowErrorKind {
    Parse,
    Validation,
}

impl RowError {
    pub(crate) fn parse(field: &'static str, value: &str, reason: impl ToString) -> Self {
        RowError::Parse {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        RowError::Validation {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> RowErrorKind {
        match self {
            RowError::Parse { .. } => RowErrorKind::Parse,
            RowError::Validation { .. } => RowErrorKind::Validation,
        }
    }
}

impl std::fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowErrorKind::Parse => f.write_str("parse"),
            RowErrorKind::Validation => f.write_str("validation"),
        }
    }
}
