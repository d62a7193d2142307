//! Stable recency ordering of resolved entries.

use std::cmp::Ordering;

use crate::resolver::UNKNOWN_TIMESTAMP;

/// Order entries by resolved timestamp.
///
/// `descending` puts the newest first. Entries with equal timestamps keep
/// their input order in both directions, so re-sorting an already sorted
/// list is a no-op. Unknown entries ([`UNKNOWN_TIMESTAMP`]) are the oldest
/// of all, including dates before 1970: last when descending, first when
/// ascending.
#[must_use]
pub fn sort_entries<E>(mut items: Vec<(E, i64)>, descending: bool) -> Vec<E> {
    // slice::sort_by is stable; the comparator is flipped, never the output
    items.sort_by(|(_, a), (_, b)| compare_timestamps(*a, *b, descending));
    items.into_iter().map(|(entry, _)| entry).collect()
}

/// Comparator used by [`sort_entries`].
#[must_use]
pub fn compare_timestamps(a: i64, b: i64, descending: bool) -> Ordering {
    let ascending = recency_key(a).cmp(&recency_key(b));
    if descending {
        ascending.reverse()
    } else {
        ascending
    }
}

/// Unknown sorts below every real instant, negative ones included.
fn recency_key(timestamp: i64) -> (bool, i64) {
    (timestamp != UNKNOWN_TIMESTAMP, timestamp)
}
