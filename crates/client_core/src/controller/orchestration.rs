//! Drives the list query reducer from caller actions, timers and fetch results.

use std::{
    marker::PhantomData,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use shared::error::FetchError;
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use super::{
    events::{Action, QueryKey},
    reducer::{self, QueryConfig, QuerySnapshot, QueryState},
};
use crate::transport::JsonTransport;

/// Pulls the record list and the total count out of a list response body.
pub trait PageExtractor: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    fn items(&self, body: &Value) -> Result<Vec<Self::Item>, serde_json::Error>;
    fn total_count(&self, body: &Value) -> Result<u64, serde_json::Error>;
}

/// Extractor for `{ "count": n, "results": [...] }` bodies, the shape of
/// [`shared::protocol::PagedResponse`].
pub struct SwapiPage<T> {
    _item: PhantomData<fn() -> T>,
}

impl<T> SwapiPage<T> {
    pub fn new() -> Self {
        Self { _item: PhantomData }
    }
}

impl<T> Default for SwapiPage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageExtractor for SwapiPage<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn items(&self, body: &Value) -> Result<Vec<T>, serde_json::Error> {
        Vec::<T>::deserialize(body.get("results").unwrap_or(&Value::Null))
    }

    fn total_count(&self, body: &Value) -> Result<u64, serde_json::Error> {
        u64::deserialize(body.get("count").unwrap_or(&Value::Null))
    }
}

/// Paginated, searchable list query.
///
/// Owns a [`QueryState`] and feeds it through [`reducer::reduce`]. Search input
/// is debounced by `config.debounce`; each fetch is tagged with the
/// [`QueryKey`] that produced it and a superseded fetch is aborted, and its
/// result ignored should it still arrive. Must be used inside a tokio runtime.
pub struct QueryController<E: PageExtractor> {
    inner: Arc<ControllerInner<E>>,
}

impl<E: PageExtractor> Clone for QueryController<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct ControllerInner<E: PageExtractor> {
    config: QueryConfig,
    extractor: E,
    transport: Arc<dyn JsonTransport>,
    state: Mutex<QueryState<E::Item>>,
    snapshots: watch::Sender<QuerySnapshot<E::Item>>,
    debounce_task: Mutex<Option<JoinHandle<()>>>,
    fetch_task: Mutex<Option<JoinHandle<()>>>,
}

impl<E: PageExtractor> QueryController<E> {
    /// Creates the controller and issues the fetch for page 1.
    pub fn start(config: QueryConfig, extractor: E, transport: Arc<dyn JsonTransport>) -> Self {
        let state = QueryState::new();
        let (snapshots, _) = watch::channel(state.snapshot());
        let inner = Arc::new(ControllerInner {
            config,
            extractor,
            transport,
            state: Mutex::new(state),
            snapshots,
            debounce_task: Mutex::new(None),
            fetch_task: Mutex::new(None),
        });

        ControllerInner::transition(&inner, |state| state.next_fetch(&inner.config));
        Self { inner }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    pub fn snapshot(&self) -> QuerySnapshot<E::Item> {
        lock(&self.inner.state).snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot<E::Item>> {
        self.inner.snapshots.subscribe()
    }

    pub fn updates(&self) -> WatchStream<QuerySnapshot<E::Item>> {
        WatchStream::new(self.subscribe())
    }

    /// Updates the visible term and resets to page 1 right away; the term
    /// reaches the query only after the debounce window passes quietly.
    pub fn set_search_term(&self, text: impl Into<String>) {
        let text = text.into();
        ControllerInner::dispatch(&self.inner, Action::SetSearchTerm(text.clone()));

        let weak: Weak<ControllerInner<E>> = Arc::downgrade(&self.inner);
        let window = self.inner.config.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(inner) = weak.upgrade() {
                ControllerInner::dispatch(&inner, Action::SearchSettled(text));
            }
        });
        if let Some(previous) = lock(&self.inner.debounce_task).replace(handle) {
            previous.abort();
        }
    }

    /// Moves to page `page`, clamped to `1..=total_pages`. Ignored while no
    /// page count is known.
    pub fn set_page(&self, page: i64) {
        ControllerInner::dispatch(&self.inner, Action::SetPage(page));
    }

    pub fn next_page(&self) {
        ControllerInner::dispatch(&self.inner, Action::NextPage);
    }

    pub fn previous_page(&self) {
        ControllerInner::dispatch(&self.inner, Action::PreviousPage);
    }
}

impl<E: PageExtractor> ControllerInner<E> {
    fn dispatch(inner: &Arc<Self>, action: Action<E::Item>) {
        Self::transition(inner, |state| reducer::reduce(state, &inner.config, action));
    }

    /// Applies `step` and, when it asks for a fetch, records the request and
    /// swaps in the new fetch task before any other transition can run.
    fn transition(
        inner: &Arc<Self>,
        step: impl FnOnce(&mut QueryState<E::Item>) -> Option<QueryKey>,
    ) {
        let mut fetch_task = lock(&inner.fetch_task);
        let mut state = lock(&inner.state);

        if let Some(key) = step(&mut state) {
            reducer::reduce(&mut state, &inner.config, Action::RequestSent(key.clone()));
            if let Some(previous) = fetch_task.replace(Self::spawn_fetch(inner, key)) {
                previous.abort();
            }
        }
        inner.snapshots.send_replace(state.snapshot());
    }

    fn spawn_fetch(inner: &Arc<Self>, key: QueryKey) -> JoinHandle<()> {
        let weak = Arc::downgrade(inner);
        let transport = inner.transport.clone();
        let url = reducer::request_url(&inner.config, &key);

        tokio::spawn(async move {
            let body = match url {
                Ok(url) => fetch_page(transport.as_ref(), url).await,
                Err(error) => Err(error),
            };
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let action = match body.and_then(|(url, body)| inner.extract(&url, &body)) {
                Ok((items, total_count)) => Action::ResponseOk {
                    key,
                    items,
                    total_count,
                },
                Err(error) => Action::ResponseErr { key, error },
            };
            Self::dispatch(&inner, action);
        })
    }

    fn extract(&self, url: &str, body: &Value) -> Result<(Vec<E::Item>, u64), FetchError> {
        let decoded = self
            .extractor
            .items(body)
            .and_then(|items| Ok((items, self.extractor.total_count(body)?)));

        match decoded {
            Ok((items, total_count)) => {
                debug!(%url, items = items.len(), total_count, "list page received");
                Ok((items, total_count))
            }
            Err(error) => Err(list_failure(url, &error)),
        }
    }
}

async fn fetch_page(
    transport: &dyn JsonTransport,
    url: String,
) -> Result<(String, Value), FetchError> {
    info!(%url, "fetching list page");
    match transport.get_json(&url).await {
        Ok(body) => Ok((url, body)),
        Err(error) => Err(list_failure(&url, &error)),
    }
}

fn list_failure(url: &str, error: &dyn std::fmt::Display) -> FetchError {
    warn!(%url, %error, "list fetch failed");
    FetchError::Page {
        url: url.to_string(),
    }
}

impl<E: PageExtractor> Drop for ControllerInner<E> {
    fn drop(&mut self) {
        for task in [&self.debounce_task, &self.fetch_task] {
            if let Some(handle) = lock(task).take() {
                handle.abort();
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
