//! Client side of the catalog: HTTP transport, detail aggregation and the
//! paginated list controller.

pub mod aggregate;
pub mod controller;
pub mod transport;

pub use aggregate::{AggregateFetcher, DEFAULT_API_BASE_URL};
pub use controller::{
    Action, PageExtractor, QueryConfig, QueryController, QueryKey, QuerySnapshot, QueryStatus,
    SwapiPage,
};
pub use transport::{HttpTransport, JsonTransport, TransportError};

#[cfg(test)]
mod test_support;
