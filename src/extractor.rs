use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::data_models::{SearchItem, Source};
use crate::dedup::dedupe;
use crate::document::{Css, HtmlDocument, MarkupDocument, MarkupNode};
use crate::errors::ExtractionError;
use crate::sites::SiteProfile;
use crate::urls::{host_of, pick_image, to_absolute};

pub const MAX_TITLE_CHARS: usize = 200;

/// `12,000원`, `3.480 円`: a number of three or more characters followed by a currency sign.
static PRICE_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9][0-9,.]{2,})\s*(원|円)").unwrap_or_else(|e| panic!("price pattern: {e}"))
});

type Compiled = Lazy<Result<Extractor, ExtractionError>>;

static JAPAN24: Compiled = Lazy::new(|| Extractor::new(Source::Japan24.profile()));
static JAPANGIFT: Compiled = Lazy::new(|| Extractor::new(Source::Japangift.profile()));
static HEYPRICE: Compiled = Lazy::new(|| Extractor::new(Source::Heyprice.profile()));
static BBTS: Compiled = Lazy::new(|| Extractor::new(Source::Bbts.profile()));

/// A site profile with its selectors and patterns compiled.
pub struct Extractor {
    profile: &'static SiteProfile,
    host: &'static str,
    result_anchors: Css,
    card: Css,
    image: Css,
    price: Css,
    any_anchor: Css,
    product_path: Option<Regex>,
}

impl Extractor {
    pub fn new(profile: &'static SiteProfile) -> Result<Self, ExtractionError> {
        let product_path = if profile.product_keywords.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = profile
                .product_keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect();
            Some(
                RegexBuilder::new(&alternatives.join("|"))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            profile,
            host: profile.host(),
            result_anchors: Css::parse(profile.result_anchors)?,
            card: Css::parse(profile.card)?,
            image: Css::parse(profile.image)?,
            price: Css::parse(profile.price)?,
            any_anchor: Css::parse("a[href]")?,
            product_path,
        })
    }

    /// The shared extractor for `source`, compiled on first use.
    pub fn for_source(source: Source) -> Result<&'static Self, ExtractionError> {
        let compiled = match source {
            Source::Japan24 => &JAPAN24,
            Source::Japangift => &JAPANGIFT,
            Source::Heyprice => &HEYPRICE,
            Source::Bbts => &BBTS,
        };
        Lazy::force(compiled).as_ref().map_err(Clone::clone)
    }

    pub fn profile(&self) -> &'static SiteProfile {
        self.profile
    }

    pub fn result_anchors(&self) -> &Css {
        &self.result_anchors
    }

    pub fn card(&self) -> &Css {
        &self.card
    }

    pub fn price(&self) -> &Css {
        &self.price
    }

    /// Parse `markup` and return the site's product candidates, deduplicated by URL.
    pub fn extract(&self, markup: &str) -> Vec<SearchItem> {
        let doc = HtmlDocument::parse(markup);
        self.extract_from(&doc)
    }

    pub fn extract_from<D: MarkupDocument>(&self, doc: &D) -> Vec<SearchItem> {
        let mut items: Vec<SearchItem> = doc
            .select(&self.result_anchors)
            .into_iter()
            .filter_map(|anchor| self.from_result_anchor(anchor))
            .collect();

        if items.is_empty() {
            if let Some(marker) = self.profile.fallback_href_marker {
                items = self.scan_all_anchors(doc, marker);
            }
        }

        dedupe(items)
    }

    fn from_result_anchor<'a, N: MarkupNode<'a>>(&self, anchor: N) -> Option<SearchItem> {
        let href = anchor.attribute("href")?;
        let title = anchor_title(anchor)?;
        if !self.title_ok(&title) {
            return None;
        }

        let url = to_absolute(href, self.profile.base_url)?;
        if !self.is_product_link(&url) {
            return None;
        }

        let card = anchor.closest(&self.card);
        let image = card
            .and_then(|card| card.find_first(&self.image))
            .and_then(|img| pick_image(|name| img.attribute(name), self.profile.base_url));
        let price = card.and_then(|card| self.card_price(card));

        Some(SearchItem::new(title, url, price, image, self.profile.source))
    }

    fn scan_all_anchors<D: MarkupDocument>(&self, doc: &D, marker: &str) -> Vec<SearchItem> {
        doc.select(&self.any_anchor)
            .into_iter()
            .filter_map(|anchor| {
                let href = anchor.attribute("href")?;
                if !href.contains(marker) {
                    return None;
                }
                let title = anchor_title(anchor)?;
                let url = to_absolute(href, self.profile.base_url)?;
                Some(SearchItem::new(title, url, None, None, self.profile.source))
            })
            .collect()
    }

    fn title_ok(&self, title: &str) -> bool {
        title.chars().count() >= self.profile.min_title_chars
            && !self.profile.stopwords.iter().any(|w| title.contains(w))
    }

    fn is_product_link(&self, url: &str) -> bool {
        if url.ends_with('#') || host_of(url).as_deref() != Some(self.host) {
            return false;
        }
        let Some(pattern) = &self.product_path else {
            return true;
        };
        // Match on what follows the host so the keywords never hit the domain name.
        let after_host = url
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|i| &rest[i..]))
            .unwrap_or_default();
        pattern.is_match(after_host)
    }

    fn card_price<'a, N: MarkupNode<'a>>(&self, card: N) -> Option<String> {
        if let Some(price) = card
            .find_first(&self.price)
            .map(|el| collapse_whitespace(&el.text_content()))
            .filter(|p| !p.is_empty())
        {
            return Some(price);
        }
        price_from_text(&card.text_content())
    }
}

/// Title attribute when present, visible text otherwise; whitespace collapsed and capped.
fn anchor_title<'a, N: MarkupNode<'a>>(anchor: N) -> Option<String> {
    let from_attr = anchor
        .attribute("title")
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty());
    let title = from_attr.unwrap_or_else(|| collapse_whitespace(&anchor.text_content()));
    if title.is_empty() {
        return None;
    }
    Some(title.chars().take(MAX_TITLE_CHARS).collect())
}

/// Synthesize `"<number> <symbol>"` from the first price-looking run in `text`.
pub fn price_from_text(text: &str) -> Option<String> {
    PRICE_IN_TEXT
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
