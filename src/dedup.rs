use std::collections::HashSet;

use crate::data_models::SearchItem;

/// Keep the first item for each URL, preserving order.
pub fn dedupe(items: Vec<SearchItem>) -> Vec<SearchItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.url.clone()))
        .collect()
}
