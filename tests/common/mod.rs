#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bazaar::aggregator::{Aggregator, AggregatorConfig};
use bazaar::data_models::Source;
use bazaar::errors::FetchError;
use bazaar::fetcher::Fetcher;
use bazaar::urls::host_of;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;

/// A shop result page in the layout the Korean shop fronts use. Links are relative,
/// so the same markup works for any of them.
pub fn shop_page(products: &[(&str, &str, &str)]) -> String {
    let mut cards = String::new();
    for (id, title, price) in products {
        cards.push_str(&format!(
            r#"<li class="prd_item">
                 <a href="/goods/view?no={id}" title="{title}"><img src="/img/{id}.jpg"></a>
                 <span class="price">{price}</span>
               </li>"#
        ));
    }
    format!(
        r#"<html><body>
             <div class="top"><a href="/member/login">로그인</a></div>
             <div class="stype_list"><ul>{cards}</ul></div>
           </body></html>"#
    )
}

/// The three-anchor fixture: two products and a notice link.
pub const JAPAN24_FIGURES: &str = r#"
<html><body>
  <div class="stype_list">
    <ul>
      <li class="prd_item">
        <a href="/goods/view?no=101" title="Nendoroid Figure Miku">
          <img src="" data-src="//img.japan24.co.kr/101.jpg">
        </a>
        <span class="price">12,000원</span>
      </li>
      <li class="prd_item">
        <a href="https://m.japan24.co.kr/item/detail/202">Gundam figure RX-78</a>
        <img src="/images/202.jpg">
        <p>판매가 34,500 원</p>
      </li>
      <li class="prd_item">
        <a href="/board/notice">공지 figure 안내</a>
      </li>
    </ul>
  </div>
</body></html>"#;

#[derive(Clone)]
pub enum FakePage {
    Markup(String),
    Status(u16),
}

/// Serves canned pages keyed by host, counting calls and tracking how many
/// fetches are in flight at once.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FakePage>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    calls_by_host: std::sync::Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, source: Source, page: FakePage) -> Self {
        self.pages.insert(source.profile().host().to_string(), page);
        self
    }

    pub fn delay(mut self, source: Source, delay: Duration) -> Self {
        self.delays.insert(source.profile().host().to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, source: Source) -> usize {
        self.calls_by_host
            .lock()
            .unwrap()
            .get(source.profile().host())
            .copied()
            .unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        _headers: Option<&HeaderMap>,
        token: &CancellationToken,
    ) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let host = host_of(url).unwrap_or_default();
        *self
            .calls_by_host
            .lock()
            .unwrap()
            .entry(host.clone())
            .or_default() += 1;

        if token.is_cancelled() {
            return Err(FetchError::Cancelled { url: url.into() });
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&host) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(&host) {
            Some(FakePage::Markup(markup)) => Ok(markup.clone()),
            Some(FakePage::Status(status)) => Err(FetchError::Status {
                url: url.into(),
                status: *status,
                reason: "forced".into(),
            }),
            None => Err(FetchError::Status {
                url: url.into(),
                status: 404,
                reason: "Not Found".into(),
            }),
        }
    }
}

pub fn aggregator(fetcher: Arc<FakeFetcher>, sites: &[Source]) -> Aggregator {
    Aggregator::new(
        fetcher,
        AggregatorConfig {
            sites: sites.to_vec(),
            ..AggregatorConfig::default()
        },
    )
}
