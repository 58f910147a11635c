//! Resolves a person together with every resource it references.

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use shared::{
    domain::{AggregateRecord, RecordId},
    error::FetchError,
    protocol::{Film, Person, Planet, Starship},
    query::person_url,
};
use tracing::{info, warn};

use crate::transport::{JsonTransport, TransportError};

pub const DEFAULT_API_BASE_URL: &str = "https://swapi.dev/api";

pub struct AggregateFetcher<T: JsonTransport> {
    transport: T,
    base_url: String,
}

impl<T: JsonTransport> AggregateFetcher<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the person `id`, then its homeworld, films and starships.
    ///
    /// The three reference groups run concurrently, and every URL inside a
    /// group is fetched concurrently. Films and starships come back in the
    /// order the person lists them. The first failure aborts the remaining
    /// fetches and is returned as is; no partial record is ever produced.
    pub async fn fetch_aggregate(&self, id: &RecordId) -> Result<AggregateRecord, FetchError> {
        let person = self.fetch_record(id).await?;
        info!(
            %id,
            films = person.films.len(),
            starships = person.starships.len(),
            "resolving record references"
        );

        let (homeworld, films, starships) = futures::try_join!(
            self.fetch_homeworld(&person),
            self.fetch_films(&person.films),
            self.fetch_starships(&person.starships),
        )?;

        Ok(AggregateRecord::from_parts(person, homeworld, films, starships))
    }

    pub async fn fetch_record(&self, id: &RecordId) -> Result<Person, FetchError> {
        let url = person_url(&self.base_url, id);
        self.fetch_resource(&url, || FetchError::Record { id: id.clone() })
            .await
    }

    /// Fetches several people at once, keeping the order of `ids`.
    pub async fn fetch_records(&self, ids: &[RecordId]) -> Result<Vec<Person>, FetchError> {
        try_join_all(ids.iter().map(|id| self.fetch_record(id))).await
    }

    pub async fn fetch_homeworld(&self, person: &Person) -> Result<Planet, FetchError> {
        self.fetch_resource(&person.homeworld, || FetchError::Homeworld {
            url: person.homeworld.clone(),
        })
        .await
    }

    async fn fetch_films(&self, urls: &[String]) -> Result<Vec<Film>, FetchError> {
        try_join_all(urls.iter().map(|url| {
            self.fetch_resource(url, || FetchError::Film { url: url.clone() })
        }))
        .await
    }

    async fn fetch_starships(&self, urls: &[String]) -> Result<Vec<Starship>, FetchError> {
        try_join_all(urls.iter().map(|url| {
            self.fetch_resource(url, || FetchError::Starship { url: url.clone() })
        }))
        .await
    }

    async fn fetch_resource<R, F>(&self, url: &str, on_failure: F) -> Result<R, FetchError>
    where
        R: DeserializeOwned,
        F: FnOnce() -> FetchError,
    {
        let decoded = match self.transport.get_json(url).await {
            Ok(body) => serde_json::from_value(body).map_err(TransportError::from),
            Err(err) => Err(err),
        };

        decoded.map_err(|error| {
            let err = on_failure();
            warn!(%url, %error, kind = err.kind().label(), "resource fetch failed");
            err
        })
    }
}

#[cfg(test)]
#[path = "tests/aggregate_tests.rs"]
mod tests;
