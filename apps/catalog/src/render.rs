//! Plain-text views printed by the subcommands.

use std::fmt::Write as _;

use client_core::{QuerySnapshot, QueryStatus};
use shared::{
    domain::{AggregateRecord, RecordId},
    error::FetchError,
    protocol::Person,
    query::extract_record_id,
};

pub const LIST_FAILED: &str = "Failed to fetch data";
pub const NO_ITEMS: &str = "No items found";
pub const NO_FAVOURITES: &str = "No favourites added";
pub const NO_STARSHIPS: &str = "No starships piloted";

/// Upper-cases the first character only: `"n/a"` becomes `"N/a"`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn record_id(person: &Person) -> String {
    extract_record_id(&person.url)
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".into())
}

/// One list card: favourite marker, id, name and, when known, homeworld.
pub fn person_line(person: &Person, favourite: bool, homeworld: Option<&str>) -> String {
    let marker = if favourite { '*' } else { ' ' };
    let mut line = format!("{marker} {:>4}  {}", record_id(person), person.name);
    if let Some(homeworld) = homeworld {
        let _ = write!(line, " ({homeworld})");
    }
    line
}

/// Renders the current list snapshot. `homeworlds` is aligned with the items
/// and may be empty.
pub fn list_page(
    snapshot: &QuerySnapshot<Person>,
    favourites: &[RecordId],
    homeworlds: &[String],
) -> String {
    match snapshot.status {
        QueryStatus::Loading => "Loading...".into(),
        QueryStatus::Error => LIST_FAILED.into(),
        QueryStatus::Ready if snapshot.items.is_empty() => NO_ITEMS.into(),
        QueryStatus::Ready => {
            let mut out = String::new();
            if !snapshot.search_term.is_empty() {
                let _ = writeln!(out, "Search: {}", snapshot.search_term);
            }
            for (index, person) in snapshot.items.iter().enumerate() {
                let favourite = extract_record_id(&person.url)
                    .is_some_and(|id| favourites.contains(&id));
                let homeworld = homeworlds.get(index).map(String::as_str);
                let _ = writeln!(out, "{}", person_line(person, favourite, homeworld));
            }
            let _ = write!(
                out,
                "Page {} of {} ({} results)",
                snapshot.current_page, snapshot.total_pages, snapshot.total_count
            );
            out
        }
    }
}

pub fn detail(id: &RecordId, record: &AggregateRecord, favourite: bool) -> String {
    let mut out = String::new();
    let star = if favourite { " *" } else { "" };
    let _ = writeln!(out, "{}{star}  (id {id})", record.name);
    let _ = writeln!(out, "  Height:     {}", record.height);
    let _ = writeln!(out, "  Mass:       {}", record.mass);
    let _ = writeln!(out, "  Hair color: {}", record.hair_color);
    let _ = writeln!(out, "  Eye color:  {}", record.eye_color);
    let _ = writeln!(out, "  Gender:     {}", capitalize(&record.gender));
    let _ = writeln!(out, "  Homeworld:  {}", record.homeworld.name);

    let _ = writeln!(out, "Films");
    for film in &record.films {
        let _ = writeln!(out, "  Episode {}: {}", film.episode_id, film.title);
    }

    let _ = write!(out, "Starships");
    if record.starships.is_empty() {
        let _ = write!(out, "\n  {NO_STARSHIPS}");
    }
    for starship in &record.starships {
        let _ = write!(out, "\n  {} ({})", starship.name, starship.model);
    }
    out
}

pub fn favourites(people: &[Person]) -> String {
    if people.is_empty() {
        return NO_FAVOURITES.into();
    }
    people
        .iter()
        .map(|person| person_line(person, true, None))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn failure(error: &FetchError) -> String {
    format!("Something went wrong: {error}")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
