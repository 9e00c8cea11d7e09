use url::Url;

/// Image attributes tried in order; lazy-loading themes park the real URL in a data attribute.
pub const IMAGE_ATTRIBUTES: [&str; 5] = ["src", "data-src", "data-original", "data-lazy-src", "data-image"];

/// Resolve a link found in markup against the site's `base`.
///
/// Protocol-relative links get `https:`, absolute http(s) links pass through, and
/// root-relative links are joined onto the base origin. Other values (plain relative
/// paths, `javascript:`, fragments) are returned as they are, for host checks to reject.
/// Returns `None` for empty input or anything that fails to resolve.
pub fn to_absolute(url: &str, base: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if url.starts_with("//") {
        let resolved = format!("https:{url}");
        return Url::parse(&resolved).ok().map(|_| resolved);
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        return Url::parse(url).ok().map(|_| url.to_string());
    }

    if url.starts_with('/') {
        let base = Url::parse(base).ok()?;
        return base.join(url).ok().map(String::from);
    }

    Some(url.to_string())
}

pub fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// First of [`IMAGE_ATTRIBUTES`] whose value resolves to an absolute http(s) URL.
pub fn pick_image<'a, F>(attr: F, base: &str) -> Option<String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    IMAGE_ATTRIBUTES
        .iter()
        .filter_map(|name| attr(*name))
        .filter_map(|value| to_absolute(value, base))
        .find(|resolved| is_http(resolved))
}

/// Host of an absolute URL, if it has one.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}
