use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::data_models::{SearchItem, SearchResult, Source};
use crate::dedup::dedupe;
use crate::errors::{FetchError, PipelineError};
use crate::extractor::Extractor;
use crate::fetcher::Fetcher;
use crate::filter::filter_by_relevance;
use crate::query::SearchQuery;
use crate::retry::{RetryPolicy, with_retry};

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Sites searched, in merge order.
    pub sites: Vec<Source>,
    pub max_concurrent_sites: usize,
    pub retry: RetryPolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sites: Source::REGISTERED.to_vec(),
            max_concurrent_sites: 2,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&Config> for AggregatorConfig {
    fn from(config: &Config) -> Self {
        Self {
            sites: config.sites.clone(),
            max_concurrent_sites: config.max_concurrent_sites,
            retry: RetryPolicy {
                max_attempts: config.retry_attempts,
                base_delay: Duration::from_millis(config.retry_base_delay_ms),
            },
        }
    }
}

/// How one site's pipeline ended for a query.
#[derive(Debug)]
pub struct SiteRun {
    pub source: Source,
    pub result: Result<Vec<SearchItem>, PipelineError>,
}

/// Fans a query out to every configured site, at most `max_concurrent_sites` at a
/// time per query, and concatenates what comes back in site order. Concurrent
/// queries do not share the cap.
pub struct Aggregator {
    fetcher: Arc<dyn Fetcher>,
    sites: Vec<Source>,
    max_concurrent_sites: usize,
    retry: RetryPolicy,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: AggregatorConfig) -> Self {
        Self {
            fetcher,
            sites: config.sites,
            max_concurrent_sites: config.max_concurrent_sites.max(1),
            retry: config.retry,
        }
    }

    pub fn sites(&self) -> &[Source] {
        &self.sites
    }

    /// Run every site and merge. Site failures are logged and contribute nothing.
    pub async fn search(&self, query: &SearchQuery, token: &CancellationToken) -> SearchResult {
        let items = self
            .dispatch(query.as_str(), token)
            .await
            .into_iter()
            .flat_map(|run| match run.result {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("{} search failed: {e}", run.source);
                    Vec::new()
                }
            })
            .collect();

        SearchResult {
            query: query.as_str().to_string(),
            items,
        }
    }

    /// Run every site's pipeline under a limiter scoped to this call and report each
    /// outcome, in site order.
    pub async fn dispatch(&self, query: &str, token: &CancellationToken) -> Vec<SiteRun> {
        let limiter = Semaphore::new(self.max_concurrent_sites);
        let limiter = &limiter;
        let runs = self.sites.iter().map(|&source| async move {
            let result = self.run_limited(limiter, source, query, token).await;
            SiteRun { source, result }
        });
        join_all(runs).await
    }

    async fn run_limited(
        &self,
        limiter: &Semaphore,
        source: Source,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<SearchItem>, PipelineError> {
        // Held until the pipeline returns, whichever way it returns.
        let _permit = limiter.acquire().await?;
        self.run_pipeline(source, query, token).await
    }

    /// fetch (with retry) -> extract -> filter -> dedupe -> truncate, for one site.
    pub async fn run_pipeline(
        &self,
        source: Source,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<SearchItem>, PipelineError> {
        let extractor = Extractor::for_source(source)?;
        let profile = extractor.profile();
        let url = profile.search_url(query);

        let markup = self.fetch_with_retry(&url, token).await?;

        let mut items = extractor.extract(&markup);
        if profile.relevance_filter {
            items = filter_by_relevance(items, query);
        }
        let mut items = dedupe(items);
        items.truncate(profile.max_items);

        log::info!("{source}: {} items from {url}", items.len());
        Ok(items)
    }

    pub async fn fetch_with_retry(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<String, FetchError> {
        with_retry(self.retry, token, || self.fetcher.fetch(url, None, token))
            .await
            .map_err(|e| match e {
                FetchError::Cancelled { url: u } if u.is_empty() => FetchError::Cancelled {
                    url: url.to_string(),
                },
                other => other,
            })
    }
}
