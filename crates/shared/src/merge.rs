use std::collections::HashSet;

use crate::models::Item;

/// Combine cached items with freshly fetched ones, dropping repeated ids.
///
/// Cached items are visited first, so an item that was already enriched
/// always wins over its bare copy from the feed. There is no field-level
/// merge between the two. Result order: cached items, then new items in the
/// order their sources were given.
pub fn merge<I>(cached: Vec<Item>, fresh_by_source: I) -> Vec<Item>
where
    I: IntoIterator<Item = Vec<Item>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(cached.len());

    let fresh = fresh_by_source.into_iter().flatten();
    for item in cached.into_iter().chain(fresh) {
        if seen.insert(item.id.clone()) {
            merged.push(item);
        }
    }

    merged
}
