mod common;

use std::sync::Arc;
use std::time::Duration;

use bazaar::aggregator::{Aggregator, AggregatorConfig};
use bazaar::data_models::Source;
use bazaar::errors::{FetchError, PipelineError};
use bazaar::query::SearchQuery;
use bazaar::retry::RetryPolicy;
use tokio_util::sync::CancellationToken;

use common::{FakeFetcher, FakePage, JAPAN24_FIGURES, aggregator, shop_page};

fn query(q: &str) -> SearchQuery {
    SearchQuery::parse(q).unwrap()
}

fn healthy_fetcher() -> FakeFetcher {
    FakeFetcher::new()
        .page(Source::Japan24, FakePage::Markup(JAPAN24_FIGURES.to_string()))
        .page(
            Source::Japangift,
            FakePage::Markup(shop_page(&[("g1", "Figure gift", "3,000円")])),
        )
        .page(
            Source::Heyprice,
            FakePage::Markup(shop_page(&[
                ("h1", "Figure hey", "7,000원"),
                ("h2", "Figure hey 2", "8,000원"),
            ])),
        )
}

#[tokio::test]
async fn merges_sites_in_registration_order() {
    let fetcher = Arc::new(healthy_fetcher());
    let aggregator = aggregator(fetcher.clone(), &Source::REGISTERED);

    let result = aggregator.search(&query("figure"), &CancellationToken::new()).await;

    assert_eq!(result.query, "figure");
    let sources: Vec<Source> = result.items.iter().map(|i| i.source).collect();
    assert_eq!(
        sources,
        vec![
            Source::Japan24,
            Source::Japan24,
            Source::Japangift,
            Source::Heyprice,
            Source::Heyprice,
        ]
    );
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn failing_site_is_dropped_silently() {
    let fetcher = Arc::new(healthy_fetcher().page(Source::Japangift, FakePage::Status(503)));
    let aggregator = aggregator(fetcher.clone(), &Source::REGISTERED);

    let result = aggregator.search(&query("figure"), &CancellationToken::new()).await;

    assert_eq!(result.items.len(), 4);
    assert!(result.items.iter().all(|i| i.source != Source::Japangift));
    assert!(result.items.iter().any(|i| i.source == Source::Japan24));
    assert!(result.items.iter().any(|i| i.source == Source::Heyprice));
    // default policy: one attempt plus two retries
    assert_eq!(fetcher.calls_to(Source::Japangift), 3);
    assert_eq!(fetcher.calls_to(Source::Japan24), 1);
}

#[tokio::test(start_paused = true)]
async fn dispatch_reports_the_failure_per_site() {
    let fetcher = Arc::new(healthy_fetcher().page(Source::Japangift, FakePage::Status(403)));
    let aggregator = aggregator(fetcher, &Source::REGISTERED);

    let runs = aggregator.dispatch("figure", &CancellationToken::new()).await;

    assert_eq!(runs.len(), 3);
    assert!(runs[0].result.is_ok());
    match &runs[1].result {
        Err(PipelineError::Fetch(FetchError::Status { status, .. })) => assert_eq!(*status, 403),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(runs[1].source, Source::Japangift);
    assert!(runs[2].result.is_ok());
}

#[tokio::test(start_paused = true)]
async fn at_most_two_sites_fetch_at_once() {
    let mut fetcher = healthy_fetcher().page(Source::Bbts, FakePage::Markup(String::new()));
    for source in Source::ALL {
        fetcher = fetcher.delay(source, Duration::from_millis(100));
    }
    let fetcher = Arc::new(fetcher);
    let aggregator = aggregator(fetcher.clone(), &Source::ALL);

    aggregator.search(&query("figure"), &CancellationToken::new()).await;

    assert_eq!(fetcher.calls(), 4);
    assert_eq!(fetcher.max_in_flight(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_first_site_still_comes_first() {
    let fetcher = Arc::new(
        healthy_fetcher()
            .delay(Source::Japan24, Duration::from_millis(500))
            .delay(Source::Heyprice, Duration::from_millis(10)),
    );
    let aggregator = aggregator(fetcher, &Source::REGISTERED);

    let result = aggregator.search(&query("figure"), &CancellationToken::new()).await;

    assert_eq!(result.items.first().map(|i| i.source), Some(Source::Japan24));
    assert_eq!(result.items.last().map(|i| i.source), Some(Source::Heyprice));
}

#[tokio::test]
async fn cancelled_query_is_not_retried_and_returns_empty() {
    let fetcher = Arc::new(healthy_fetcher());
    let aggregator = aggregator(fetcher.clone(), &Source::REGISTERED);
    let token = CancellationToken::new();
    token.cancel();

    let result = aggregator.search(&query("figure"), &token).await;

    assert!(result.items.is_empty());
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn results_are_filtered_and_capped_per_site() {
    let products: Vec<(String, String)> = (0..40)
        .map(|i| (i.to_string(), format!("Figure {i}")))
        .collect();
    let rows: Vec<(&str, &str, &str)> = products
        .iter()
        .map(|(id, title)| (id.as_str(), title.as_str(), "1,000원"))
        .collect();
    let fetcher = Arc::new(
        FakeFetcher::new().page(Source::Heyprice, FakePage::Markup(shop_page(&rows))),
    );
    let aggregator = aggregator(fetcher, &[Source::Heyprice]);

    let result = aggregator.search(&query("figure"), &CancellationToken::new()).await;

    assert_eq!(result.items.len(), 30);
    assert_eq!(result.items[0].title, "Figure 0");
    assert_eq!(result.items[29].title, "Figure 29");
}

#[tokio::test]
async fn unfiltered_site_keeps_items_without_price() {
    let markup = r#"<a href="/Product/VariationDetails/1">Unrelated statue</a>"#;
    let fetcher = Arc::new(
        FakeFetcher::new().page(Source::Bbts, FakePage::Markup(markup.to_string())),
    );
    let aggregator = Aggregator::new(
        fetcher,
        AggregatorConfig {
            sites: vec![Source::Bbts],
            max_concurrent_sites: 2,
            retry: RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(1),
            },
        },
    );

    let result = aggregator.search(&query("figure"), &CancellationToken::new()).await;

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].title, "Unrelated statue");
    assert!(result.items[0].price.is_none());
}

#[tokio::test(start_paused = true)]
async fn concurrent_queries_each_get_their_own_site_cap() {
    let mut fetcher = healthy_fetcher();
    for source in Source::REGISTERED {
        fetcher = fetcher.delay(source, Duration::from_secs(1));
    }
    let fetcher = Arc::new(fetcher);
    let aggregator = aggregator(fetcher.clone(), &Source::REGISTERED);
    let token = CancellationToken::new();
    let (figure, gundam) = (query("figure"), query("gundam"));

    let started = tokio::time::Instant::now();
    let (first, second) = tokio::join!(
        aggregator.search(&figure, &token),
        aggregator.search(&gundam, &token),
    );

    // Two waves of one second each per query; a shared cap would need three.
    assert!(started.elapsed() < Duration::from_millis(2500));
    assert_eq!(first.items.len(), 5);
    assert_eq!(second.query, "gundam");
    assert_eq!(fetcher.calls(), 6);
    assert_eq!(fetcher.max_in_flight(), 4);
}
