//! Client-side stores for one browsing session.
//!
//! - [`listing`] - article pages, pagination, retry, slug index
//! - [`detail`] - full-article cache consulted before the network
//! - [`search`] - selected tags, search query, listing context
//! - [`view`] - derived, filtered view of the listing
//! - [`events`] - change notifications for renderers

mod detail;
mod events;
mod listing;
mod search;
mod view;

pub use detail::DetailCache;
pub use events::{EventSink, StoreEvent};
pub use listing::{
    FetchOutcome, ListingState, ListingStore, PageRequest, SlugKey, DEFAULT_RETRY_DELAY,
};
pub use search::{FilterState, SearchStore};
pub use view::filter_articles;
