// ── Snapshot filtering ──
//
// Pure view over a snapshot. Never mutates it and never touches the
// network, so it can be re-run on every keystroke.

use crate::model::Record;
use crate::panel::Snapshot;

/// Records whose searchable fields contain `query`, ignoring case.
///
/// An empty query yields every record. The iterator is lazy and the
/// snapshot is untouched, so calling this twice gives the same rows.
pub fn filter<'a, R: Record>(
    snapshot: &'a Snapshot<R>,
    query: &str,
) -> impl Iterator<Item = &'a R> + use<'a, R> {
    let needle = query.to_lowercase();
    snapshot
        .iter()
        .filter(move |record| matches(*record, &needle))
}

/// `needle` must already be lowercase.
pub fn matches<R: Record>(record: &R, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}
