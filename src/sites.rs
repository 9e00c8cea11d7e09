//! Per-site search URLs and extraction tunables. Adding a site means a new
//! [`Source`] variant plus one profile here.

use crate::data_models::Source;

/// Substituted with the form-encoded query in [`SiteProfile::search_template`].
const QUERY_PLACEHOLDER: &str = "{query}";

/// Class names of the element wrapping a single product on the Korean shop fronts.
const SHOP_CARDS: &str = "li, .card, .item, .goods, .prd, .prd_item, .prdList li";
const SHOP_STOPWORDS: &[&str] = &["로그인", "회원가입", "이용안내", "공지"];
const SHOP_PRODUCT_KEYWORDS: &[&str] = &["auction", "buy", "item", "detail", "goods"];

#[derive(Debug)]
pub struct SiteProfile {
    pub source: Source,
    pub base_url: &'static str,
    pub search_template: &'static str,
    pub result_anchors: &'static str,
    pub card: &'static str,
    pub image: &'static str,
    pub price: &'static str,
    pub stopwords: &'static [&'static str],
    /// A product link's path must contain one of these. Empty accepts any path.
    pub product_keywords: &'static [&'static str],
    pub min_title_chars: usize,
    /// Generic link scan used when the result list yields nothing.
    pub fallback_href_marker: Option<&'static str>,
    pub relevance_filter: bool,
    pub max_items: usize,
}

static JAPAN24: SiteProfile = SiteProfile {
    source: Source::Japan24,
    base_url: "https://m.japan24.co.kr",
    search_template: "/hey/search?keyword={query}&type=buy",
    result_anchors: ".stype_list a[href]",
    card: SHOP_CARDS,
    image: "img",
    price: ".price, .goods-price, .sale_price, .won, .Price",
    stopwords: SHOP_STOPWORDS,
    product_keywords: SHOP_PRODUCT_KEYWORDS,
    min_title_chars: 2,
    fallback_href_marker: None,
    relevance_filter: true,
    max_items: 30,
};

static JAPANGIFT: SiteProfile = SiteProfile {
    source: Source::Japangift,
    base_url: "https://m.japangift.co.kr",
    search_template: "/hey/search?keyword={query}&type=buy&type2=jp",
    result_anchors: ".stype_list a[href]",
    card: SHOP_CARDS,
    image: "img",
    price: ".price, .sale_price, .amount, .won, .Price",
    stopwords: SHOP_STOPWORDS,
    product_keywords: SHOP_PRODUCT_KEYWORDS,
    min_title_chars: 2,
    fallback_href_marker: None,
    relevance_filter: true,
    max_items: 30,
};

static HEYPRICE: SiteProfile = SiteProfile {
    source: Source::Heyprice,
    base_url: "https://m.heyprice.co.kr",
    search_template: "/auction/buy?level1=&shop_id=yhauc&keyword={query}&type4=",
    result_anchors: ".stype_list a[href]",
    card: SHOP_CARDS,
    image: "img",
    price: ".price, .sale_price, .amount, .won, .Price",
    stopwords: SHOP_STOPWORDS,
    product_keywords: SHOP_PRODUCT_KEYWORDS,
    min_title_chars: 2,
    fallback_href_marker: None,
    relevance_filter: true,
    max_items: 30,
};

// Answers 403 to plain HTTP clients, so it is only searched when configured explicitly.
static BBTS: SiteProfile = SiteProfile {
    source: Source::Bbts,
    base_url: "https://www.bigbadtoystore.com",
    search_template: "/Search?SearchText={query}&o=4",
    result_anchors: ".ProductListing .Product a",
    card: ".Product",
    image: "img",
    price: ".price, .Price",
    stopwords: &[],
    product_keywords: &[],
    min_title_chars: 1,
    fallback_href_marker: Some("/Product/"),
    relevance_filter: false,
    max_items: 30,
};

impl Source {
    pub fn profile(&self) -> &'static SiteProfile {
        match self {
            Source::Japan24 => &JAPAN24,
            Source::Japangift => &JAPANGIFT,
            Source::Heyprice => &HEYPRICE,
            Source::Bbts => &BBTS,
        }
    }
}

impl SiteProfile {
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!(
            "{}{}",
            self.base_url,
            self.search_template.replace(QUERY_PLACEHOLDER, &encoded)
        )
    }

    /// Host every accepted product link must live on.
    pub fn host(&self) -> &'static str {
        self.base_url
            .split_once("://")
            .map_or(self.base_url, |(_, rest)| rest)
            .trim_end_matches('/')
    }
}
