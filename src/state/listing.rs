use super::events::{EventSink, StoreEvent};
use super::search::SearchStore;
use crate::api::{ApiClient, Endpoint, PageQuery, PAGE_SIZE};
use crate::models::{Article, StateFilter, Tag};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay before the single automatic retry of a failed fresh fetch.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Composite key of the slug index: slugs are unique per author only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlugKey {
    pub username: String,
    pub slug: String,
}

impl SlugKey {
    pub fn new(username: &str, slug: &str) -> Self {
        Self {
            username: username.to_string(),
            slug: slug.to_string(),
        }
    }
}

/// Articles loaded so far plus the flags a renderer needs.
#[derive(Debug, Clone)]
pub struct ListingState {
    articles: Vec<Article>,
    loading: bool,
    error: Option<String>,
    has_more: bool,
    // Grows across fetches and is never pruned, so entries can outlive the
    // articles they point at after a fresh fetch.
    slug_index: HashMap<SlugKey, u64>,
    discussions: Vec<Article>,
    popular_tags: Vec<Tag>,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            loading: false,
            error: None,
            has_more: true,
            slug_index: HashMap::new(),
            discussions: Vec::new(),
            popular_tags: Vec::new(),
        }
    }
}

impl ListingState {
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when the last page came back full. A heuristic, not a server total.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn resolve_slug(&self, username: &str, slug: &str) -> Option<u64> {
        self.slug_index.get(&SlugKey::new(username, slug)).copied()
    }

    pub fn slug_index_len(&self) -> usize {
        self.slug_index.len()
    }

    pub fn discussions(&self) -> &[Article] {
        &self.discussions
    }

    pub fn popular_tags(&self) -> &[Tag] {
        &self.popular_tags
    }
}

/// One listing page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    /// Append to the loaded articles instead of replacing them.
    pub append: bool,
    pub endpoint: Endpoint,
    pub tags: Vec<String>,
    pub state: Option<StateFilter>,
}

impl PageRequest {
    /// First page of `endpoint`, replacing whatever is loaded.
    pub fn fresh(endpoint: Endpoint) -> Self {
        Self {
            page: 1,
            append: false,
            endpoint,
            tags: Vec::new(),
            state: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_state(mut self, state: Option<StateFilter>) -> Self {
        self.state = state;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// What a fetch did to the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded {
        fetched: usize,
        total: usize,
        has_more: bool,
    },
    Failed {
        message: String,
        retry_scheduled: bool,
    },
    /// `load_more` had nothing to do (no more pages, or a fetch in flight).
    Skipped,
}

/// Listing state manager: fetches pages, paginates, retries.
///
/// Clones share the same state. The lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct ListingStore {
    client: ApiClient,
    search: SearchStore,
    state: Arc<Mutex<ListingState>>,
    retry: Arc<Mutex<Option<JoinHandle<FetchOutcome>>>>,
    retry_delay: Duration,
    events: EventSink,
}

impl ListingStore {
    pub fn new(
        client: ApiClient,
        search: SearchStore,
        retry_delay: Duration,
        events: EventSink,
    ) -> Self {
        Self {
            client,
            search,
            state: Arc::default(),
            retry: Arc::default(),
            retry_delay,
            events,
        }
    }

    /// Fetch one page and merge it into the listing.
    ///
    /// A fresh (non-append) request clears the loaded articles and records its
    /// tags and state as the listing context before the request goes out. If
    /// it fails, one identical retry is scheduled after the retry delay.
    /// Append failures are left for the user to retry.
    pub async fn fetch_page(&self, request: PageRequest) -> FetchOutcome {
        self.run_fetch(request, true).await
    }

    /// Fetch the page after the loaded ones.
    ///
    /// No-op while a fetch is in flight or when the last page was short.
    /// Missing tags/state fall back to the current listing context; a missing
    /// endpoint means [`Endpoint::Articles`].
    ///
    /// Two calls racing before either sets the loading flag can both go out;
    /// nothing de-duplicates them.
    pub async fn load_more(
        &self,
        endpoint: Option<Endpoint>,
        tags: Option<Vec<String>>,
        state: Option<StateFilter>,
    ) -> FetchOutcome {
        let (context_tags, context_state) = self.search.context();
        let request = PageRequest {
            page: 0,
            append: true,
            endpoint: endpoint.unwrap_or_default(),
            tags: tags.unwrap_or(context_tags),
            state: state.or(context_state),
        };

        let next_page = {
            let mut listing = self.lock();
            if !listing.has_more || listing.loading {
                tracing::debug!(
                    has_more = listing.has_more,
                    loading = listing.loading,
                    "load_more skipped"
                );
                return FetchOutcome::Skipped;
            }
            listing.loading = true;
            listing.articles.len() / PAGE_SIZE + 1
        };

        self.run_fetch(request.with_page(next_page), false).await
    }

    /// Load the top "discuss" threads. Failures are logged and ignored.
    pub async fn fetch_discussions(&self) {
        match self.client.discussions().await {
            Ok(raw) => {
                let discussions: Vec<Article> = raw.into_iter().map(Article::from).collect();
                tracing::debug!(count = discussions.len(), "Loaded discussions");
                self.lock().discussions = discussions;
            }
            Err(e) => tracing::error!(error = %e, "Failed to fetch discuss articles"),
        }
    }

    /// Load the popular tag list. Failures are logged and ignored.
    pub async fn fetch_popular_tags(&self) {
        match self.client.popular_tags().await {
            Ok(tags) => {
                tracing::debug!(count = tags.len(), "Loaded popular tags");
                self.lock().popular_tags = tags;
            }
            Err(e) => tracing::error!(error = %e, "Failed to fetch popular tags"),
        }
    }

    /// Wait for a scheduled retry, if any, and return its outcome.
    pub async fn wait_for_retry(&self) -> Option<FetchOutcome> {
        let handle = self.retry.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "Retry task did not complete");
                None
            }
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&ListingState) -> R) -> R {
        f(&self.lock())
    }

    pub fn articles(&self) -> Vec<Article> {
        self.lock().articles.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn resolve_slug(&self, username: &str, slug: &str) -> Option<u64> {
        self.lock().resolve_slug(username, slug)
    }

    async fn run_fetch(&self, request: PageRequest, retry_on_failure: bool) -> FetchOutcome {
        let cleared_has_more = {
            let mut listing = self.lock();
            listing.error = None;
            if request.append {
                None
            } else {
                listing.loading = true;
                listing.articles.clear();
                Some(listing.has_more)
            }
        };
        if let Some(has_more) = cleared_has_more {
            self.search.set_current_tags(request.tags.clone());
            self.search.set_current_state(request.state);
            self.events
                .emit(StoreEvent::ListingUpdated { count: 0, has_more });
        }

        // Cleared on every exit path, including a dropped future
        let loading = LoadingReset(&self.state);

        let query = PageQuery {
            page: request.page,
            tags: request.tags.clone(),
            state: request.state,
        };
        tracing::debug!(
            endpoint = request.endpoint.as_path(),
            page = request.page,
            append = request.append,
            "Fetching listing page"
        );

        match self.client.list_articles(&request.endpoint, &query).await {
            Ok(raw) => {
                let fetched = raw.len();
                let articles: Vec<Article> = raw.into_iter().map(Article::from).collect();

                let (total, has_more) = {
                    let mut listing = self.lock();
                    for article in &articles {
                        listing
                            .slug_index
                            .insert(SlugKey::new(&article.username, &article.slug), article.id);
                    }
                    if request.append {
                        listing.articles.extend(articles);
                    } else {
                        listing.articles = articles;
                    }
                    listing.has_more = fetched == PAGE_SIZE;
                    (listing.articles.len(), listing.has_more)
                };
                drop(loading);

                self.events
                    .emit(StoreEvent::ListingUpdated { count: total, has_more });
                FetchOutcome::Loaded {
                    fetched,
                    total,
                    has_more,
                }
            }
            Err(e) => {
                let message = e.to_string();
                let retry_scheduled = retry_on_failure && !request.append;
                tracing::warn!(
                    error = %e,
                    page = request.page,
                    append = request.append,
                    retry_scheduled,
                    "Listing fetch failed"
                );
                self.lock().error = Some(message.clone());
                // Cleared before the retry can set its own
                drop(loading);
                if retry_scheduled {
                    self.schedule_retry(request);
                }
                self.events.emit(StoreEvent::ListingFailed {
                    message: message.clone(),
                    retry_scheduled,
                });
                FetchOutcome::Failed {
                    message,
                    retry_scheduled,
                }
            }
        }
    }

    fn schedule_retry(&self, request: PageRequest) {
        let store = self.clone();
        let delay = self.retry_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(page = request.page, "Retrying listing fetch");
            store.run_fetch(request, false).await
        });
        *self.retry.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn lock(&self) -> MutexGuard<'_, ListingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LoadingReset<'a>(&'a Mutex<ListingState>);

impl Drop for LoadingReset<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).loading = false;
    }
}
