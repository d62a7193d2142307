//! One full ordering pass: extract labels, resolve timestamps, sort.

use crate::label::LabelExtractor;
use crate::metadata::MetadataLookup;
use crate::resolver::Resolver;
use crate::sort::sort_entries;

/// Reorder `entries` by recency.
///
/// Labels are extracted once per entry and resolved against `lookup`;
/// the entries themselves are moved through untouched.
pub fn order_entries<E, X, L>(
    entries: Vec<E>,
    extractor: &X,
    lookup: &L,
    resolver: &Resolver,
    descending: bool,
) -> Vec<E>
where
    X: LabelExtractor<E> + ?Sized,
    L: MetadataLookup + ?Sized,
{
    let resolved = entries
        .into_iter()
        .map(|entry| {
            let label = extractor.extract(&entry);
            let timestamp = resolver.resolve(&label, lookup);
            (entry, timestamp)
        })
        .collect();
    sort_entries(resolved, descending)
}

/// Reorder plain labels by recency.
pub fn order_labels<L>(
    labels: &[String],
    lookup: &L,
    resolver: &Resolver,
    descending: bool,
) -> Vec<String>
where
    L: MetadataLookup + ?Sized,
{
    order_entries(
        labels.to_vec(),
        &|label: &String| label.clone(),
        lookup,
        resolver,
        descending,
    )
}
