//! Ordering engine: stable merge sort over records by a composite key.
//!
//! The block lookup in [`crate::search`] relies on the company-ordered view
//! produced here, and on ties keeping their input order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::Record;

/// Composite ordering applied by [`sort_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Date ascending, then company ascending.
    DateThenCompany,
    /// Company ascending, then date ascending.
    CompanyThenDate,
}

impl SortKey {
    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::DateThenCompany => a
                .date()
                .cmp(&b.date())
                .then_with(|| a.company().cmp(b.company())),
            SortKey::CompanyThenDate => a
                .company()
                .cmp(b.company())
                .then_with(|| a.date().cmp(&b.date())),
        }
    }
}

/// Return a new vector holding `records` ordered by `key`.
///
/// Stable: records that compare equal keep their relative input order.
/// O(n log n) comparisons, one scratch buffer of at most n/2 elements.
/// The input slice is left untouched.
pub fn sort_by<R: AsRef<Record> + Clone>(records: &[R], key: SortKey) -> Vec<R> {
    let mut out = records.to_vec();
    if out.len() <= 1 {
        return out;
    }
    let mut scratch = Vec::with_capacity(out.len() / 2 + 1);
    merge_sort(&mut out, &mut scratch, key);
    out
}

/// True when every adjacent pair is in `key` order.
pub fn is_sorted_by<R: AsRef<Record>>(records: &[R], key: SortKey) -> bool {
    records
        .windows(2)
        .all(|w| key.compare(w[0].as_ref(), w[1].as_ref()) != Ordering::Greater)
}

fn merge_sort<R: AsRef<Record> + Clone>(items: &mut [R], scratch: &mut Vec<R>, key: SortKey) {
    let n = items.len();
    if n <= 1 {
        return;
    }
    let mid = n / 2;
    merge_sort(&mut items[..mid], scratch, key);
    merge_sort(&mut items[mid..], scratch, key);

    // Runs already in order across the seam.
    if key.compare(items[mid - 1].as_ref(), items[mid].as_ref()) != Ordering::Greater {
        return;
    }
    merge(items, mid, scratch, key);
}

/// Merge the sorted runs `items[..mid]` and `items[mid..]` in place.
///
/// The left run is copied out to `scratch`; the write cursor never passes the
/// right-run read cursor, so unread right elements are never overwritten.
fn merge<R: AsRef<Record> + Clone>(items: &mut [R], mid: usize, scratch: &mut Vec<R>, key: SortKey) {
    scratch.clear();
    scratch.extend_from_slice(&items[..mid]);

    let (mut i, mut j, mut k) = (0, mid, 0);
    while i < scratch.len() && j < items.len() {
        // Ties go to the left run.
        if key.compare(scratch[i].as_ref(), items[j].as_ref()) != Ordering::Greater {
            items[k] = scratch[i].clone();
            i += 1;
        } else {
            items[k] = items[j].clone();
            j += 1;
        }
        k += 1;
    }
    while i < scratch.len() {
        items[k] = scratch[i].clone();
        i += 1;
        k += 1;
    }
}
