//! An immutable loaded dataset with both ordered views.
//!
//! Refreshing data means building a new snapshot; readers holding an
//! `Arc<Snapshot>` never see a half-updated store.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::data::LoadReport;
use crate::domain::Record;
use crate::order::{sort_by, SortKey};
use crate::search::find_company_block;

#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<Arc<Record>>,
    by_date: Vec<Arc<Record>>,
    by_company: Vec<Arc<Record>>,
    dataset_hash: String,
    skipped: usize,
}

impl Snapshot {
    /// Index `records` (in load order). `skipped` is how many source rows
    /// were rejected on the way in.
    pub fn build(records: Vec<Record>, skipped: usize) -> Self {
        let records: Vec<Arc<Record>> = records.into_iter().map(Arc::new).collect();
        let by_date = sort_by(&records, SortKey::DateThenCompany);
        let by_company = sort_by(&records, SortKey::CompanyThenDate);
        let dataset_hash = compute_dataset_hash(&by_date);
        debug!(records = records.len(), skipped, %dataset_hash, "built snapshot");
        Self {
            records,
            by_date,
            by_company,
            dataset_hash,
            skipped,
        }
    }

    pub fn from_report(report: LoadReport) -> Self {
        let skipped = report.skipped();
        Self::build(report.records, skipped)
    }

    /// Records in load order.
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    /// Ordered by (date, company).
    pub fn by_date(&self) -> &[Arc<Record>] {
        &self.by_date
    }

    /// Ordered by (company, date).
    pub fn by_company(&self) -> &[Arc<Record>] {
        &self.by_company
    }

    /// Date-ascending block for `company` (trimmed, case-insensitive).
    pub fn company_block(&self, company: &str) -> &[Arc<Record>] {
        find_company_block(&self.by_company, company)
    }

    /// Distinct tickers, ascending.
    pub fn companies(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.by_company {
            if out.last() != Some(&r.company()) {
                out.push(r.company());
            }
        }
        out
    }

    /// Earliest and latest date in the dataset.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.by_date.first()?.date(), self.by_date.last()?.date()))
    }

    /// BLAKE3 hex digest of the date-ordered records.
    pub fn dataset_hash(&self) -> &str {
        &self.dataset_hash
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Deterministic hash over every field of the date-ordered view, so two
/// snapshots of the same rows hash equal regardless of load order.
fn compute_dataset_hash(by_date: &[Arc<Record>]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in by_date {
        hasher.update(r.date().to_string().as_bytes());
        hasher.update(r.company().as_bytes());
        hasher.update(&r.open().to_le_bytes());
        hasher.update(&r.high().to_le_bytes());
        hasher.update(&r.low().to_le_bytes());
        hasher.update(&r.close().to_le_bytes());
        hasher.update(&r.volume().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
