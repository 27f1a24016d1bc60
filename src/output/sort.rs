//! Consumer-side ordering and filtering
//!
//! The presentation layer sorts and filters the finalized records; these
//! helpers define the exact semantics so every consumer agrees on them.

use std::collections::HashSet;

use crate::catalog::ComponentRecord;

/// Sort orders offered to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Stars,
    Downloads,
    Newest,
}

/// Sorts records descending by the chosen metric
///
/// Missing metrics sort as lowest/oldest (`None` ranks below `Some(0)`),
/// and ties break toward records that have a preview image. The sort is
/// stable, so otherwise-equal records keep their catalog order.
pub fn sort_records(records: &mut [ComponentRecord], key: SortKey) {
    match key {
        SortKey::Stars => records.sort_by(|a, b| {
            (b.star_count, b.preview_image_url.is_some())
                .cmp(&(a.star_count, a.preview_image_url.is_some()))
        }),
        SortKey::Downloads => records.sort_by(|a, b| {
            (b.download_count, b.preview_image_url.is_some())
                .cmp(&(a.download_count, a.preview_image_url.is_some()))
        }),
        SortKey::Newest => records.sort_by(|a, b| {
            (b.created_at, b.preview_image_url.is_some())
                .cmp(&(a.created_at, a.preview_image_url.is_some()))
        }),
    }
}

/// Case-insensitive substring search against the derived search index
///
/// An empty query matches everything; a record without a search index
/// (never finalized) matches nothing.
pub fn matches_search(record: &ComponentRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    record
        .search_index
        .as_deref()
        .map(|index| index.contains(&query.to_lowercase()))
        .unwrap_or(false)
}

/// Returns true if the record carries the given category tag
pub fn matches_category(record: &ComponentRecord, category: &str) -> bool {
    record.categories.iter().any(|c| c == category)
}

/// Drops records whose identity is on the exclusion list
pub fn filter_excluded(
    records: Vec<ComponentRecord>,
    exclude: &HashSet<String>,
) -> Vec<ComponentRecord> {
    records
        .into_iter()
        .filter(|record| !exclude.contains(&record.identity))
        .collect()
}
