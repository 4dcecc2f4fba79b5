use super::events::{EventSink, StoreEvent};
use crate::api::ApiClient;
use crate::models::FullArticle;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache of full articles keyed by article id.
///
/// Unbounded unless built with a capacity, in which case the least recently
/// read entry is evicted first. Entries live as long as the session.
#[derive(Debug, Clone)]
pub struct DetailCache {
    client: ApiClient,
    cache: Arc<Mutex<LruCache<u64, Arc<FullArticle>>>>,
    events: EventSink,
}

impl DetailCache {
    pub fn new(client: ApiClient, capacity: Option<NonZeroUsize>, events: EventSink) -> Self {
        let cache = match capacity {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            client,
            cache: Arc::new(Mutex::new(cache)),
            events,
        }
    }

    /// Return the full article for `id`, fetching it on a cache miss.
    ///
    /// Any failure (non-2xx, network, malformed body) yields `None`, the same
    /// as "not found".
    pub async fn get_detail(&self, id: u64) -> Option<Arc<FullArticle>> {
        let hit = self.lock().get(&id).cloned();
        if let Some(hit) = hit {
            tracing::debug!(id, "Detail cache hit");
            return Some(hit);
        }

        match self.client.get_article(id).await {
            Ok(raw) => {
                let article = Arc::new(FullArticle::from(raw));
                self.lock().put(id, Arc::clone(&article));
                self.events.emit(StoreEvent::DetailCached { id });
                Some(article)
            }
            Err(e) => {
                tracing::debug!(id, error = %e, "Article detail unavailable");
                None
            }
        }
    }

    /// Resolve `handle/slug` by scanning the author's recent articles.
    ///
    /// Always asks the API for the author's list; the listing slug index is
    /// not consulted here. On no match the detail endpoint is never hit.
    pub async fn get_detail_by_handle_and_slug(
        &self,
        handle: &str,
        slug: &str,
    ) -> Option<Arc<FullArticle>> {
        let articles = match self.client.user_articles(handle).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::debug!(handle, error = %e, "Failed to fetch user articles");
                return None;
            }
        };

        let Some(found) = articles.iter().find(|a| a.slug.as_deref() == Some(slug)) else {
            tracing::debug!(handle, slug, scanned = articles.len(), "No article with slug");
            return None;
        };

        self.get_detail(found.id).await
    }

    /// Cached value without touching the network or recency order.
    pub fn cached(&self, id: u64) -> Option<Arc<FullArticle>> {
        self.lock().peek(&id).cloned()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<u64, Arc<FullArticle>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
