//! Controller layer: list query events, reducer-like state transitions, and fetch orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;

pub use events::{Action, QueryKey};
pub use orchestration::{PageExtractor, QueryController, SwapiPage};
pub use reducer::{QueryConfig, QuerySnapshot, QueryState, QueryStatus};
