use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Change notifications published by the stores.
///
/// A renderer that holds the receiving end recomputes the derived view when
/// it sees `ListingUpdated` or `FiltersChanged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The article sequence changed. A fresh fetch publishes `count: 0` when
    /// it clears the listing and starts loading.
    ListingUpdated { count: usize, has_more: bool },
    /// A listing fetch failed; `retry_scheduled` is true for fresh fetches.
    ListingFailed {
        message: String,
        retry_scheduled: bool,
    },
    /// Selected tags or search query changed.
    FiltersChanged,
    /// A full article was stored in the detail cache.
    DetailCached { id: u64 },
}

/// Optional sending half shared by all stores of a session.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<StoreEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<StoreEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Publish without waiting; state setters are synchronous.
    pub fn emit(&self, event: StoreEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "Event channel full, dropping store event");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Event channel closed (receiver dropped)");
            }
        }
    }
}
