//! Pure list query state machine.
//!
//! `reduce` applies one [`Action`] to a [`QueryState`] and returns the query
//! that now has to be fetched, if any. Nothing in here performs I/O or reads
//! a clock, which keeps the transitions testable without a runtime.

use std::time::Duration;

use shared::{error::FetchError, query::build_query};
use tracing::debug;

use super::events::{Action, QueryKey};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);
const PAGE_PARAM: &str = "page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub source_query: String,
    pub page_size: u32,
    pub search_param: Option<String>,
    pub debounce: Duration,
}

impl QueryConfig {
    pub fn new(source_query: impl Into<String>) -> Self {
        Self {
            source_query: source_query.into(),
            page_size: DEFAULT_PAGE_SIZE,
            search_param: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_search_param(mut self, name: impl Into<String>) -> Self {
        self.search_param = Some(name.into());
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Error,
    Ready,
}

#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub page: u32,
    pub search_term: String,
    pub settled_term: String,
    pub status: QueryStatus,
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
    pub error: Option<FetchError>,
    /// Latest query handed to the transport. Only its response is applied.
    pub requested: Option<QueryKey>,
    pub in_flight: bool,
    has_result: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            page: 1,
            search_term: String::new(),
            settled_term: String::new(),
            status: QueryStatus::Loading,
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            error: None,
            requested: None,
            in_flight: false,
            has_result: false,
        }
    }
}

impl<T> QueryState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The query the current page and settled term ask for.
    pub fn desired_key(&self, config: &QueryConfig) -> QueryKey {
        let term = if config.search_param.is_some() {
            self.settled_term.clone()
        } else {
            String::new()
        };
        QueryKey::new(self.page, term)
    }

    /// Returns the query to fetch when it differs from the one last requested.
    /// Nothing is fetched while a search edit is still waiting to settle.
    pub fn next_fetch(&self, config: &QueryConfig) -> Option<QueryKey> {
        if config.search_param.is_some() && self.search_term != self.settled_term {
            return None;
        }

        let key = self.desired_key(config);
        if self.requested.as_ref() == Some(&key) {
            return None;
        }
        Some(key)
    }

    pub fn is_current(&self, key: &QueryKey) -> bool {
        self.requested.as_ref() == Some(key)
    }

    pub fn snapshot(&self) -> QuerySnapshot<T>
    where
        T: Clone,
    {
        QuerySnapshot {
            status: self.status,
            items: self.items.clone(),
            current_page: self.page,
            total_pages: self.total_pages,
            total_count: self.total_count,
            search_term: self.search_term.clone(),
            refreshing: self.in_flight && self.has_result,
            search_pending: self.search_term != self.settled_term,
            error: self.error.clone(),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub search_term: String,
    /// A newer query is in flight while the previous result is still shown.
    pub refreshing: bool,
    /// The search term changed and is still inside the debounce window.
    pub search_pending: bool,
    pub error: Option<FetchError>,
}

impl<T> QuerySnapshot<T> {
    /// Ready with nothing to show, as opposed to loading or failed.
    pub fn is_empty(&self) -> bool {
        self.status == QueryStatus::Ready && self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.total_pages > 0 && self.current_page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// No fetch or debounce is outstanding, so the snapshot reflects the
    /// current page and search term.
    pub fn is_settled(&self) -> bool {
        self.status != QueryStatus::Loading && !self.refreshing && !self.search_pending
    }
}

pub fn reduce<T>(
    state: &mut QueryState<T>,
    config: &QueryConfig,
    action: Action<T>,
) -> Option<QueryKey> {
    match action {
        Action::SetSearchTerm(term) => {
            state.search_term = term;
            state.page = 1;
            state.next_fetch(config)
        }
        Action::SearchSettled(term) => {
            if term != state.search_term {
                return None;
            }
            state.settled_term = term;
            state.next_fetch(config)
        }
        Action::SetPage(requested) => move_to_page(state, config, requested),
        Action::NextPage => {
            let requested = i64::from(state.page) + 1;
            move_to_page(state, config, requested)
        }
        Action::PreviousPage => {
            let requested = i64::from(state.page) - 1;
            move_to_page(state, config, requested)
        }
        Action::RequestSent(key) => {
            state.requested = Some(key);
            state.in_flight = true;
            if !state.has_result {
                state.status = QueryStatus::Loading;
            }
            None
        }
        Action::ResponseOk {
            key,
            items,
            total_count,
        } => {
            if !state.is_current(&key) {
                debug!(page = key.page, term = %key.term, "dropping stale list response");
                return None;
            }
            state.in_flight = false;
            state.status = QueryStatus::Ready;
            state.items = items;
            state.total_count = total_count;
            state.total_pages = total_pages(total_count, config.page_size);
            state.error = None;
            state.has_result = true;
            None
        }
        Action::ResponseErr { key, error } => {
            if !state.is_current(&key) {
                debug!(page = key.page, term = %key.term, "dropping stale list failure");
                return None;
            }
            state.in_flight = false;
            state.status = QueryStatus::Error;
            state.items.clear();
            state.error = Some(error);
            state.has_result = false;
            None
        }
    }
}

fn move_to_page<T>(
    state: &mut QueryState<T>,
    config: &QueryConfig,
    requested: i64,
) -> Option<QueryKey> {
    if state.total_pages == 0 {
        return None;
    }
    state.page = clamp_page(requested, state.total_pages);
    state.next_fetch(config)
}

/// Builds the outbound URL for `key`: search term first (when configured and
/// non-empty), then the page number, appended after any existing parameters.
pub fn request_url(config: &QueryConfig, key: &QueryKey) -> Result<String, FetchError> {
    let search_param = config.search_param.as_deref().unwrap_or_default();
    let page = key.page.to_string();

    build_query(
        &config.source_query,
        [(search_param, key.term.as_str()), (PAGE_PARAM, page.as_str())],
    )
    .map_err(|_| FetchError::Page {
        url: config.source_query.clone(),
    })
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

fn clamp_page(requested: i64, total_pages: u32) -> u32 {
    let clamped = requested.clamp(1, i64::from(total_pages));
    u32::try_from(clamped).unwrap_or(1)
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
