use super::events::{EventSink, StoreEvent};
use crate::models::StateFilter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Client-side filters plus the context of the current server-side listing.
///
/// The two layers are independent: `selected_tags` / `query` narrow what has
/// already been loaded, while `current_tags` / `current_state` record what the
/// last fresh listing request asked the server for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub selected_tags: Vec<String>,
    pub query: String,
    pub current_tags: Vec<String>,
    pub current_state: Option<StateFilter>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.selected_tags.is_empty() || !self.query.is_empty()
    }
}

/// Shared handle over [`FilterState`]. Setters are synchronous and never
/// touch the network.
#[derive(Debug, Clone, Default)]
pub struct SearchStore {
    inner: Arc<Mutex<FilterState>>,
    events: EventSink,
}

impl SearchStore {
    pub fn new(events: EventSink) -> Self {
        Self {
            inner: Arc::default(),
            events,
        }
    }

    pub fn snapshot(&self) -> FilterState {
        self.lock().clone()
    }

    pub fn set_selected_tags(&self, tags: Vec<String>) {
        self.lock().selected_tags = tags;
        self.events.emit(StoreEvent::FiltersChanged);
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.lock().query = query.into();
        self.events.emit(StoreEvent::FiltersChanged);
    }

    pub fn set_current_tags(&self, tags: Vec<String>) {
        self.lock().current_tags = tags;
    }

    pub fn set_current_state(&self, state: Option<StateFilter>) {
        self.lock().current_state = state;
    }

    /// Reset both the client-side filters and the listing context.
    pub fn clear_filters(&self) {
        *self.lock() = FilterState::default();
        self.events.emit(StoreEvent::FiltersChanged);
    }

    /// Tags and state filter of the last fresh listing request.
    pub fn context(&self) -> (Vec<String>, Option<StateFilter>) {
        let state = self.lock();
        (state.current_tags.clone(), state.current_state)
    }

    fn lock(&self) -> MutexGuard<'_, FilterState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
