//! Inputs consumed by the list query reducer.

use shared::error::FetchError;

/// The query a fetch was issued for. Responses carry it back so results for a
/// superseded query can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: u32,
    pub term: String,
}

impl QueryKey {
    pub fn new(page: u32, term: impl Into<String>) -> Self {
        Self {
            page,
            term: term.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action<T> {
    /// Raw search input. Shown immediately, queried once it settles.
    SetSearchTerm(String),
    /// The debounce window elapsed with this as the latest input.
    SearchSettled(String),
    SetPage(i64),
    /// One page forward or back from the page current when the action is applied.
    NextPage,
    PreviousPage,
    RequestSent(QueryKey),
    ResponseOk {
        key: QueryKey,
        items: Vec<T>,
        total_count: u64,
    },
    ResponseErr {
        key: QueryKey,
        error: FetchError,
    },
}
