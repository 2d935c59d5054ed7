//! TickerLab core: an in-memory ordered store for daily OHLCV records.
//!
//! - Domain types: validated [`Record`](domain::Record), raw rows, row errors
//! - Stable merge sort by (date, company) or (company, date)
//! - Binary-search block lookup on the company-ordered view
//! - Average volume, price summary, two-company comparison and moving averages
//! - Immutable dataset snapshots
//! - Data collaborators: CSV load/export, Yahoo Finance provider
//!
//! The core functions are pure and never mutate their inputs. They accept any
//! `R: AsRef<Record>`, so the same code runs over owned records, borrowed
//! records and the `Arc<Record>` views held by a [`Snapshot`](snapshot::Snapshot).

pub mod analytics;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod order;
pub mod search;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;

pub use analytics::{average_volume, percent_change, summarize, CompanyReport, Comparison, Summary};
pub use domain::{validate, RawRow, Record, RowError, RowErrorKind};
pub use order::{sort_by, SortKey};
pub use search::{filter_date_range, find_company_block};
pub use snapshot::Snapshot;
