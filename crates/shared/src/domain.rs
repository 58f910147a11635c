use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::{Film, Person, Planet, Starship};

/// Identifier of a primary record, as it appears in the record's own URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Record,
    Homeworld,
    Film,
    Starship,
    Page,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Record => "primary record",
            Self::Homeworld => "homeworld",
            Self::Film => "film",
            Self::Starship => "starship",
            Self::Page => "page",
        }
    }
}

/// A person with every reference resolved. Only built when all fetches succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub eye_color: String,
    pub gender: String,
    pub homeworld: Planet,
    pub films: Vec<Film>,
    pub starships: Vec<Starship>,
}

impl AggregateRecord {
    pub fn from_parts(
        person: Person,
        homeworld: Planet,
        films: Vec<Film>,
        starships: Vec<Starship>,
    ) -> Self {
        Self {
            name: person.name,
            height: person.height,
            mass: person.mass,
            hair_color: person.hair_color,
            eye_color: person.eye_color,
            gender: person.gender,
            homeworld,
            films,
            starships,
        }
    }
}
