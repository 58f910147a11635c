use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub eye_color: String,
    pub gender: String,
    #[serde(default)]
    pub skin_color: String,
    #[serde(default)]
    pub birth_year: String,
    pub homeworld: String,
    pub films: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    pub starships: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    #[serde(default)]
    pub rotation_period: String,
    #[serde(default)]
    pub orbital_period: String,
    #[serde(default)]
    pub diameter: String,
    #[serde(default)]
    pub climate: String,
    #[serde(default)]
    pub gravity: String,
    #[serde(default)]
    pub terrain: String,
    #[serde(default)]
    pub surface_water: String,
    #[serde(default)]
    pub population: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub episode_id: u32,
    #[serde(default)]
    pub opening_crawl: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub planets: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Starship {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub cost_in_credits: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub max_atmosphering_speed: String,
    #[serde(default)]
    pub crew: String,
    #[serde(default)]
    pub passengers: String,
    #[serde(default)]
    pub cargo_capacity: String,
    #[serde(default)]
    pub consumables: String,
    #[serde(default)]
    pub hyperdrive_rating: String,
    #[serde(default, rename = "MGLT")]
    pub mglt: String,
    #[serde(default)]
    pub starship_class: String,
    #[serde(default)]
    pub pilots: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

/// One page of a list endpoint, e.g. `GET /people/?page=2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}
