use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::transport::{JsonTransport, TransportError};

pub(crate) const BASE: &str = "https://swapi.test/api";

#[derive(Clone)]
struct FakeRoute {
    body: Option<Value>,
    delay: Duration,
}

/// In-memory transport keyed by exact URL. Unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, FakeRoute>>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_json(self, url: impl Into<String>, body: Value) -> Self {
        self.with_delayed_json(url, body, Duration::ZERO)
    }

    pub(crate) fn with_delayed_json(
        self,
        url: impl Into<String>,
        body: Value,
        delay: Duration,
    ) -> Self {
        self.route(url.into(), Some(body), delay);
        self
    }

    pub(crate) fn with_failure(self, url: impl Into<String>, delay: Duration) -> Self {
        self.route(url.into(), None, delay);
        self
    }

    pub(crate) fn set_json(&self, url: impl Into<String>, body: Value) {
        self.route(url.into(), Some(body), Duration::ZERO);
    }

    fn route(&self, url: String, body: Option<Value>, delay: Duration) {
        self.routes
            .lock()
            .expect("routes")
            .insert(url, FakeRoute { body, delay });
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests").clone()
    }

    pub(crate) fn requests_matching(&self, needle: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|url| url.contains(needle))
            .collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonTransport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.requests.lock().expect("requests").push(url.to_string());
        let route = self.routes.lock().expect("routes").get(url).cloned();

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(route) = &route {
            tokio::time::sleep(route.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match route.and_then(|route| route.body) {
            Some(body) => Ok(body),
            None => Err(TransportError::Status { status: 404 }),
        }
    }
}

pub(crate) fn person_json(id: u32, films: &[u32], starships: &[u32]) -> Value {
    json!({
        "name": format!("Person {id}"),
        "height": "172",
        "mass": "77",
        "hair_color": "blond",
        "skin_color": "fair",
        "eye_color": "blue",
        "birth_year": "19BBY",
        "gender": "male",
        "homeworld": format!("{BASE}/planets/1/"),
        "films": films.iter().map(|n| film_url(*n)).collect::<Vec<_>>(),
        "species": [],
        "vehicles": [],
        "starships": starships.iter().map(|n| starship_url(*n)).collect::<Vec<_>>(),
        "url": person_url(id)
    })
}

pub(crate) fn planet_json() -> Value {
    json!({
        "name": "Tatooine",
        "climate": "arid",
        "population": "200000",
        "url": format!("{BASE}/planets/1/")
    })
}

pub(crate) fn film_json(n: u32) -> Value {
    json!({
        "title": format!("Film {n}"),
        "episode_id": n,
        "release_date": "1977-05-25",
        "url": film_url(n)
    })
}

pub(crate) fn starship_json(n: u32) -> Value {
    json!({
        "name": format!("Starship {n}"),
        "model": "T-65",
        "url": starship_url(n)
    })
}

pub(crate) fn person_url(id: u32) -> String {
    format!("{BASE}/people/{id}/")
}

pub(crate) fn film_url(n: u32) -> String {
    format!("{BASE}/films/{n}/")
}

pub(crate) fn starship_url(n: u32) -> String {
    format!("{BASE}/starships/{n}/")
}

pub(crate) fn planet_url() -> String {
    format!("{BASE}/planets/1/")
}
