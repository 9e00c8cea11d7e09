use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tokio_util::sync::CancellationToken;

use crate::errors::FetchError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "ko,en;q=0.9";

/// Something that turns a URL into page markup.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body as text. `headers` extend or override the
    /// fetcher's defaults. Resolves to [`FetchError::Cancelled`] as soon as `token` fires.
    async fn fetch(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        token: &CancellationToken,
    ) -> Result<String, FetchError>;
}

/// The header profile every request starts from, close enough to a desktop browser
/// that the mobile shop sites serve their normal result pages.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
    headers
}

pub struct HttpFetcher {
    client: reqwest::Client,
    default_headers: HeaderMap,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            default_headers: default_headers(),
        })
    }

    fn headers_for(&self, extra: Option<&HeaderMap>) -> HeaderMap {
        let mut headers = self.default_headers.clone();
        if let Some(extra) = extra {
            for (name, value) in extra {
                headers.insert(name.clone(), value.clone());
            }
        }
        headers
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        token: &CancellationToken,
    ) -> Result<String, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::Cancelled { url: url.to_string() });
        }

        let request = async {
            let res = self
                .client
                .get(url)
                .headers(self.headers_for(headers))
                .send()
                .await
                .map_err(|e| transport_error(url, e))?;

            let status = res.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            res.text().await.map_err(|e| transport_error(url, e))
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(FetchError::Cancelled { url: url.to_string() }),
            res = request => res,
        }
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}
