//! Live text filtering over the log collection.
//!
//! The filter is re-evaluated on every query change and every store
//! change; nothing is incrementally maintained.

use crate::core::LogEntry;

/// Apply a text predicate to an ordered collection.
///
/// An empty or whitespace-only query returns the collection unchanged.
/// Otherwise the result is the ordered subsequence whose domain
/// (falling back to the raw URL when no domain was extracted) contains
/// the query as a case-insensitive substring. Relative order is
/// preserved, which also makes the filter idempotent.
pub fn apply(entries: &[LogEntry], query: &str) -> Vec<LogEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|entry| entry.filter_key().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
