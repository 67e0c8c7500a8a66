use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::decoder;
use crate::error::FetchError;
use crate::models::{PhotoItem, SearchQuery};
use crate::transport::Transport;

const EVENT_CAPACITY: usize = 64;

/// Change notifications for the published search state.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Loading(bool),
    Items(Arc<Vec<PhotoItem>>),
}

/// What a single `search` call ended up doing. Failures are logged, never
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    CacheHit(usize),
    Fetched(usize),
    Failed,
}

#[derive(Debug, Default)]
struct Published {
    items: Arc<Vec<PhotoItem>>,
    loading: bool,
}

struct Inner {
    transport: Arc<dyn Transport>,
    cache: Mutex<QueryCache>,
    state: Mutex<Published>,
    events: broadcast::Sender<SearchEvent>,
}

/// Runs the check-cache, fetch, decode, store flow and publishes the
/// resulting items and loading flag.
///
/// Overlapping searches are not cancelled; whichever completes last decides
/// the published state.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

impl SearchCoordinator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                transport,
                cache: Mutex::new(QueryCache::new()),
                state: Mutex::new(Published::default()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.inner.events.subscribe()
    }

    pub async fn items(&self) -> Arc<Vec<PhotoItem>> {
        self.inner.state.lock().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.lock().await.loading
    }

    pub async fn cached(&self, query: &SearchQuery) -> Option<Arc<Vec<PhotoItem>>> {
        self.inner.cache.lock().await.lookup(query)
    }

    pub async fn search(&self, query: SearchQuery) -> SearchOutcome {
        let cached = self.inner.cache.lock().await.lookup(&query);
        if let Some(items) = cached {
            debug!(query = %query, count = items.len(), "cache hit");
            let count = items.len();
            self.publish_items(items).await;
            return SearchOutcome::CacheHit(count);
        }

        self.set_loading(true).await;
        info!(query = %query, "fetching photos");

        match self.fetch(&query).await {
            Ok(items) => {
                let count = items.len();
                self.inner.cache.lock().await.store(query.clone(), items.clone());
                self.finish(Some(items)).await;
                info!(query = %query, count, "search complete");
                SearchOutcome::Fetched(count)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "search failed");
                self.finish(None).await;
                SearchOutcome::Failed
            }
        }
    }

    /// Runs `search` on the runtime so the caller is not held up.
    pub fn spawn_search(&self, query: SearchQuery) -> JoinHandle<SearchOutcome> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.search(query).await })
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Arc<Vec<PhotoItem>>, FetchError> {
        let bytes = self.inner.transport.fetch_raw(query).await?;
        let feed = decoder::decode(&bytes)?;
        Ok(Arc::new(feed.items))
    }

    async fn publish_items(&self, items: Arc<Vec<PhotoItem>>) {
        let mut state = self.inner.state.lock().await;
        state.items = items.clone();
        self.emit(SearchEvent::Items(items));
    }

    async fn set_loading(&self, loading: bool) {
        let mut state = self.inner.state.lock().await;
        state.loading = loading;
        self.emit(SearchEvent::Loading(loading));
    }

    /// Publishes new items (if any) followed by loading=false as one step.
    async fn finish(&self, items: Option<Arc<Vec<PhotoItem>>>) {
        let mut state = self.inner.state.lock().await;
        if let Some(items) = items {
            state.items = items.clone();
            self.emit(SearchEvent::Items(items));
        }
        state.loading = false;
        self.emit(SearchEvent::Loading(false));
    }

    fn emit(&self, event: SearchEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }
}
