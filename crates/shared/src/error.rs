use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{RecordId, ResourceKind};

/// The only error surfaced by the fetch layer. Network failures, non-2xx
/// statuses and malformed bodies all collapse into the variant naming the
/// resource that could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    #[error("primary record unreachable for id={id}")]
    Record { id: RecordId },
    #[error("homeworld unreachable at {url}")]
    Homeworld { url: String },
    #[error("film unreachable at {url}")]
    Film { url: String },
    #[error("starship unreachable at {url}")]
    Starship { url: String },
    #[error("page unreachable at {url}")]
    Page { url: String },
}

impl FetchError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Record { .. } => ResourceKind::Record,
            Self::Homeworld { .. } => ResourceKind::Homeworld,
            Self::Film { .. } => ResourceKind::Film,
            Self::Starship { .. } => ResourceKind::Starship,
            Self::Page { .. } => ResourceKind::Page,
        }
    }

    /// The URL that failed. Primary record failures are identified by id instead.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Record { .. } => None,
            Self::Homeworld { url }
            | Self::Film { url }
            | Self::Starship { url }
            | Self::Page { url } => Some(url),
        }
    }
}
