use super::wire::{RawArticle, RawFullArticle};
use crate::models::{StateFilter, Tag};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Articles per listing page. A page with exactly this many items is taken
/// to mean more pages are likely available.
pub const PAGE_SIZE: usize = 16;

/// Articles requested when resolving an author's slug.
pub const USER_ARTICLES_PAGE_SIZE: usize = 30;

/// Tags requested for the popular-tag list.
pub const POPULAR_TAGS_PAGE_SIZE: usize = 50;

/// Articles requested for the discussion side listing.
pub const DISCUSSIONS_PAGE_SIZE: usize = 5;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

pub const DEFAULT_BASE_URL: &str = "https://dev.to/api";

/// Errors returned by [`ApiClient`] requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    /// Response with a non-2xx status code
    #[error("API Error: {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Body was not the JSON shape we expected
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

/// Which listing collection a page request targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// `/articles`, the default published listing
    #[default]
    Articles,
    /// `/articles/latest`, newest first
    Latest,
    /// Any other path relative to the API base, e.g. `articles/rising`
    Path(String),
}

impl Endpoint {
    pub fn as_path(&self) -> &str {
        match self {
            Endpoint::Articles => "articles",
            Endpoint::Latest => "articles/latest",
            Endpoint::Path(p) => p.trim_matches('/'),
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches('/') {
            "" => Err("endpoint must not be empty".to_string()),
            "articles" => Ok(Endpoint::Articles),
            "latest" | "articles/latest" => Ok(Endpoint::Latest),
            other => Ok(Endpoint::Path(other.to_string())),
        }
    }
}

/// Parameters of one listing page request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageQuery {
    pub page: usize,
    pub tags: Vec<String>,
    pub state: Option<StateFilter>,
}

/// HTTP client for the Forem content API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Build a client against `base_url`.
    ///
    /// The base must be HTTPS unless it points at localhost, which is allowed
    /// for mock servers.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        if base_url != DEFAULT_BASE_URL {
            tracing::info!(base_url = %base, "Using custom API base URL");
        }
        Ok(Self { http, base })
    }

    /// Fetch one listing page from `endpoint`.
    pub async fn list_articles(
        &self,
        endpoint: &Endpoint,
        query: &PageQuery,
    ) -> Result<Vec<RawArticle>, ApiError> {
        let mut url = self.url_for(endpoint.as_path())?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("per_page", &PAGE_SIZE.to_string())
                .append_pair("page", &query.page.to_string());
            if !query.tags.is_empty() {
                pairs.append_pair("tag", &query.tags.join(","));
            }
            if let Some(state) = query.state {
                pairs.append_pair("state", state.as_str());
            }
        }
        self.get_json(url).await
    }

    /// Fetch a single article with its body.
    pub async fn get_article(&self, id: u64) -> Result<RawFullArticle, ApiError> {
        let url = self.url_for(&format!("articles/{id}"))?;
        self.get_json(url).await
    }

    /// Fetch the most recent articles written by `username`.
    pub async fn user_articles(&self, username: &str) -> Result<Vec<RawArticle>, ApiError> {
        let mut url = self.url_for("articles")?;
        url.query_pairs_mut()
            .append_pair("username", username)
            .append_pair("per_page", &USER_ARTICLES_PAGE_SIZE.to_string());
        self.get_json(url).await
    }

    /// Fetch the top "discuss" threads.
    pub async fn discussions(&self) -> Result<Vec<RawArticle>, ApiError> {
        let mut url = self.url_for("articles")?;
        url.query_pairs_mut()
            .append_pair("tag", "discuss")
            .append_pair("top", "1")
            .append_pair("per_page", &DISCUSSIONS_PAGE_SIZE.to_string());
        self.get_json(url).await
    }

    pub async fn popular_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let mut url = self.url_for("tags")?;
        url.query_pairs_mut()
            .append_pair("per_page", &POPULAR_TAGS_PAGE_SIZE.to_string());
        self.get_json(url).await
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        // Url::join would drop the last base segment ("api") without the slash
        let base = self.base.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GET");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Non-success status");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Build the shared `reqwest::Client` used by every store in a session.
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .user_agent(user_agent)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(timeout)
        .build()?)
}

/// Parse and vet an API base URL.
///
/// HTTP is accepted only for `localhost` / `127.0.0.1`.
pub fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url)?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1")) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS API base URL (localhost only)");
            Ok(url)
        }
        _ => {
            tracing::error!(base_url = %url, "Rejecting non-HTTPS base URL");
            Err(ApiError::InsecureBaseUrl)
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
