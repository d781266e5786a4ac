use async_trait::async_trait;
use nai_common::PodcastSummary;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;

pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com/";
/// Media filter sent with every search; the directory also indexes music,
/// movies and books.
const MEDIA: &str = "podcast";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search endpoint returned status {status}")]
    Http { status: u16 },
    #[error("unexpected response format: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Parsed search results, in the order the directory returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<PodcastSummary>,
}

/// Anything that can turn a search term into podcast results.
#[async_trait]
pub trait PodcastSearch: Send + Sync {
    async fn search(&self, term: &str) -> Result<SearchResponse, SearchError>;
}

// -- Wire types --

#[derive(Debug, Deserialize)]
struct ITunesResponse {
    results: Vec<ITunesPodcast>,
}

#[derive(Debug, Deserialize)]
struct ITunesPodcast {
    #[serde(rename = "collectionId")]
    collection_id: i64,
    #[serde(rename = "collectionName")]
    collection_name: String,
    #[serde(rename = "artistName")]
    artist_name: String,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: String,
    #[serde(rename = "collectionViewUrl", default)]
    collection_view_url: Option<String>,
}

impl From<ITunesPodcast> for PodcastSummary {
    fn from(p: ITunesPodcast) -> Self {
        PodcastSummary {
            collection_id: p.collection_id,
            collection_name: p.collection_name,
            artist_name: p.artist_name,
            artwork_url: p.artwork_url_100,
            page_url: p.collection_view_url,
        }
    }
}

/// Decode a search response body.
///
/// All or nothing: a single result missing its id, title, artist or artwork
/// fails the whole response with [`SearchError::Parse`]. Only the page URL
/// may be absent.
pub fn parse_response(body: &[u8]) -> Result<SearchResponse, SearchError> {
    let response: ITunesResponse = serde_json::from_slice(body)?;
    Ok(SearchResponse {
        results: response.results.into_iter().map(Into::into).collect(),
    })
}

/// Client for the iTunes Search API, restricted to podcasts.
#[derive(Clone)]
pub struct ITunesClient {
    http: reqwest::Client,
    search_endpoint: Url,
}

impl ITunesClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, SearchError> {
        let base = parse_base_url(base_url)?;
        let search_endpoint = base
            .join("search")
            .map_err(|e| SearchError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            search_endpoint,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        Self::new(&config.base_url, &config.user_agent)
    }

    /// The exact URL a search for `term` requests.
    pub fn search_url(&self, term: &str) -> Url {
        let mut url = self.search_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("media", MEDIA)
            .append_pair("term", term);
        url
    }
}

#[async_trait]
impl PodcastSearch for ITunesClient {
    async fn search(&self, term: &str) -> Result<SearchResponse, SearchError> {
        let url = self.search_url(term);
        info!("📡 iTunes search: {:?}", term);
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);
        if !status.is_success() {
            warn!("✗ iTunes search error: {}", status);
            return Err(SearchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed = parse_response(&body)?;
        info!("✓ iTunes search returned {} result(s)", parsed.results.len());
        Ok(parsed)
    }
}

/// Parse a base URL, treating it as a directory even without a trailing slash.
fn parse_base_url(base_url: &str) -> Result<Url, SearchError> {
    let invalid = |reason: String| SearchError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(url)
}
