use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::UnknownSource;

/// Sites the aggregator knows how to search.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Japan24,
    Japangift,
    Heyprice,
    Bbts,
}

impl Source {
    /// Every known site, in declaration order.
    pub const ALL: [Source; 4] = [
        Source::Japan24,
        Source::Japangift,
        Source::Heyprice,
        Source::Bbts,
    ];

    /// Sites searched by default, in merge order.
    pub const REGISTERED: [Source; 3] = [Source::Japan24, Source::Japangift, Source::Heyprice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Japan24 => "japan24",
            Source::Japangift => "japangift",
            Source::Heyprice => "heyprice",
            Source::Bbts => "bbts",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    /// Same as `url`; the dedup key.
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub source: Source,
}

impl SearchItem {
    pub fn new(
        title: String,
        url: String,
        price: Option<String>,
        image: Option<String>,
        source: Source,
    ) -> SearchItem {
        SearchItem {
            id: url.clone(),
            title,
            url,
            price,
            image,
            source,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub query: String,
    pub items: Vec<SearchItem>,
}
