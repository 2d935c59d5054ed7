//! Range locator: binary-search lookups over ordered record views.
//!
//! Every function here assumes the ordering it documents and does not check
//! it. Results are borrowed subslices of the input; nothing is copied.

use chrono::NaiveDate;

use crate::domain::{normalize_ticker, Record};

/// First index whose company is `>= company`.
///
/// `company_sorted` must be ordered by [`SortKey::CompanyThenDate`](crate::order::SortKey).
pub fn lower_bound_company<R: AsRef<Record>>(company_sorted: &[R], company: &str) -> usize {
    company_sorted.partition_point(|r| r.as_ref().company() < company)
}

/// First index whose company is `> company`.
pub fn upper_bound_company<R: AsRef<Record>>(company_sorted: &[R], company: &str) -> usize {
    company_sorted.partition_point(|r| r.as_ref().company() <= company)
}

/// All records for `company` as one contiguous, date-ascending block.
///
/// The query is trimmed and uppercased before comparing. An empty input or an
/// unknown company gives an empty slice. Cost is O(log n) for the two bounds.
pub fn find_company_block<'a, R: AsRef<Record>>(company_sorted: &'a [R], company: &str) -> &'a [R] {
    if company_sorted.is_empty() {
        return &[];
    }
    let company = normalize_ticker(company);
    let start = lower_bound_company(company_sorted, &company);
    let end = start + upper_bound_company(&company_sorted[start..], &company);
    &company_sorted[start..end]
}

/// Narrow a date-ascending block to the inclusive window `[start, end]`.
///
/// A `None` bound is open on that side. An inverted window gives an empty
/// slice.
pub fn filter_date_range<R: AsRef<Record>>(
    block: &[R],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> &[R] {
    let lo = start.map_or(0, |s| block.partition_point(|r| r.as_ref().date() < s));
    let hi = end.map_or(block.len(), |e| {
        block.partition_point(|r| r.as_ref().date() <= e)
    });
    if hi <= lo {
        return &[];
    }
    &block[lo..hi]
}
