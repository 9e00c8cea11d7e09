//! Inspection helpers behind the `/api/debug*` routes, for tuning site rules
//! against live markup. They reuse the URL builders and fetch/retry path but skip
//! filtering and merging.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::data_models::{SearchItem, Source};
use crate::document::{HtmlDocument, MarkupDocument, MarkupNode};
use crate::extractor::Extractor;
use crate::urls::host_of;

const SAMPLE_ITEMS: usize = 5;
const RAW_HEAD_CHARS: usize = 400;
const DOM_MAX_ROWS: usize = 60;

#[derive(Debug, Serialize)]
pub struct SiteReport {
    pub source: Source,
    pub ok: bool,
    pub parsed_count: usize,
    pub sample: Vec<SearchItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub q: String,
    pub results: Vec<SiteReport>,
}

/// Run the full per-site pipelines and summarize each one.
pub async fn inspect(aggregator: &Aggregator, q: &str, token: &CancellationToken) -> InspectReport {
    let results = aggregator
        .dispatch(q, token)
        .await
        .into_iter()
        .map(|run| match run.result {
            Ok(items) => SiteReport {
                source: run.source,
                ok: true,
                parsed_count: items.len(),
                domain: items
                    .first()
                    .and_then(|item| host_of(&item.url))
                    .map(|host| format!("https://{host}")),
                sample: items.into_iter().take(SAMPLE_ITEMS).collect(),
                error: None,
            },
            Err(e) => SiteReport {
                source: run.source,
                ok: false,
                parsed_count: 0,
                sample: Vec::new(),
                domain: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    InspectReport {
        q: q.to_string(),
        results,
    }
}

#[derive(Debug, Serialize)]
pub struct RawSiteResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RawReport {
    pub q: String,
    pub urls: BTreeMap<Source, String>,
    pub results: BTreeMap<Source, RawSiteResult>,
}

/// Fetch each site's search page, one after another, and report its size and opening markup.
pub async fn raw(aggregator: &Aggregator, q: &str, token: &CancellationToken) -> RawReport {
    let mut report = RawReport {
        q: q.to_string(),
        urls: BTreeMap::new(),
        results: BTreeMap::new(),
    };

    for &source in aggregator.sites() {
        let url = source.profile().search_url(q);
        let result = match aggregator.fetch_with_retry(&url, token).await {
            Ok(markup) => RawSiteResult {
                ok: true,
                length: Some(markup.len()),
                head: Some(markup.chars().take(RAW_HEAD_CHARS).collect()),
                error: None,
            },
            Err(e) => RawSiteResult {
                ok: false,
                length: None,
                head: None,
                error: Some(e.to_string()),
            },
        };
        report.urls.insert(source, url);
        report.results.insert(source, result);
    }

    report
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DomRow {
    pub href: String,
    pub text: String,
    pub price: String,
    pub cls: String,
}

#[derive(Debug, Serialize)]
pub struct DomSiteResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<DomRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DomReport {
    pub q: String,
    pub results: BTreeMap<Source, DomSiteResult>,
}

/// Fetch each site and list what the result-anchor selector hits, without any of the
/// acceptance rules, so selectors can be tuned against the live page.
pub async fn scan_dom(aggregator: &Aggregator, q: &str, token: &CancellationToken) -> DomReport {
    let mut results = BTreeMap::new();

    for &source in aggregator.sites() {
        let url = source.profile().search_url(q);
        let fetched = aggregator.fetch_with_retry(&url, token).await;
        let result = match fetched {
            Ok(markup) => match Extractor::for_source(source) {
                Ok(extractor) => {
                    let rows = scan_rows(extractor, &markup);
                    DomSiteResult {
                        ok: true,
                        count: Some(rows.len()),
                        samples: Some(rows),
                        error: None,
                    }
                }
                Err(e) => dom_failure(e.to_string()),
            },
            Err(e) => dom_failure(e.to_string()),
        };
        results.insert(source, result);
    }

    DomReport {
        q: q.to_string(),
        results,
    }
}

/// Lax listing of result anchors: anything with visible text, clipped for display.
pub fn scan_rows(extractor: &Extractor, markup: &str) -> Vec<DomRow> {
    let doc = HtmlDocument::parse(markup);
    doc.select(extractor.result_anchors())
        .into_iter()
        .filter_map(|anchor| {
            let text = clip(anchor.text_content().trim(), 80);
            if text.is_empty() {
                return None;
            }
            let card = anchor.closest(extractor.card());
            let price = card
                .and_then(|card| card.find_first(extractor.price()))
                .map(|el| clip(el.text_content().trim(), 40))
                .unwrap_or_default();
            let cls = card
                .and_then(|card| card.attribute("class"))
                .or_else(|| anchor.attribute("class"))
                .unwrap_or_default();
            Some(DomRow {
                href: clip(anchor.attribute("href").unwrap_or_default(), 120),
                text,
                price,
                cls: clip(cls, 120),
            })
        })
        .take(DOM_MAX_ROWS)
        .collect()
}

fn dom_failure(error: String) -> DomSiteResult {
    DomSiteResult {
        ok: false,
        count: None,
        samples: None,
        error: Some(error),
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
