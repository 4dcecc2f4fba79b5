//! One browsing session: the HTTP client plus one instance of every store.
//!
//! Built once and passed by reference to whatever renders it.
use crate::api::{build_http_client, ApiClient, ApiError};
use crate::config::Config;
use crate::models::{Article, FullArticle};
use crate::state::{
    filter_articles, DetailCache, EventSink, FilterState, ListingStore, SearchStore, StoreEvent,
};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Session {
    pub listing: ListingStore,
    pub search: SearchStore,
    pub details: DetailCache,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::build(config, EventSink::default())
    }

    /// Like [`Session::new`], also publishing store changes on `tx`.
    pub fn with_events(config: &Config, tx: mpsc::Sender<StoreEvent>) -> Result<Self, ApiError> {
        Self::build(config, EventSink::new(tx))
    }

    fn build(config: &Config, events: EventSink) -> Result<Self, ApiError> {
        let http = build_http_client(&config.user_agent, config.request_timeout())?;
        let client = ApiClient::new(http, &config.api_base_url)?;

        let search = SearchStore::new(events.clone());
        let listing = ListingStore::new(
            client.clone(),
            search.clone(),
            config.retry_delay(),
            events.clone(),
        );
        let details = DetailCache::new(client, config.cache_capacity(), events);

        Ok(Self {
            listing,
            search,
            details,
        })
    }

    /// Articles that pass the current tag and text filters, recomputed on
    /// every call.
    pub fn filtered_articles(&self) -> Vec<Article> {
        let filters: FilterState = self.search.snapshot();
        self.listing.with_state(|state| {
            filter_articles(state.articles(), &filters)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Open an article addressed as `handle/slug`.
    ///
    /// Uses the slug index filled by listing fetches when it knows the pair,
    /// and otherwise asks the API for the author's articles.
    pub async fn open_article(&self, handle: &str, slug: &str) -> Option<Arc<FullArticle>> {
        if let Some(id) = self.listing.resolve_slug(handle, slug) {
            tracing::debug!(handle, slug, id, "Resolved slug from listing index");
            if let Some(article) = self.details.get_detail(id).await {
                return Some(article);
            }
        }
        self.details.get_detail_by_handle_and_slug(handle, slug).await
    }
}
