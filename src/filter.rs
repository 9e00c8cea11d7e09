use crate::data_models::SearchItem;

/// An item is relevant when its title mentions the query and it carries a usable
/// link, image and numeric price.
pub fn accept(item: &SearchItem, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    let title_ok = item.title.to_lowercase().contains(&query);
    let image_ok = item.image.as_deref().is_some_and(|img| img.starts_with("http"));
    let url_ok = item.url.starts_with("http");
    let price_ok = item
        .price
        .as_deref()
        .is_some_and(|p| p.chars().any(|c| c.is_ascii_digit()));

    title_ok && image_ok && url_ok && price_ok
}

pub fn filter_by_relevance(items: Vec<SearchItem>, query: &str) -> Vec<SearchItem> {
    items.into_iter().filter(|item| accept(item, query)).collect()
}
