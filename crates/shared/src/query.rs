//! Pure URL helpers shared by the list and detail fetchers.

use url::Url;

use crate::domain::RecordId;

/// Appends `params` to `base`, keeping any query string `base` already has.
///
/// Pairs with an empty key or value are skipped, so an unset search term never
/// shows up as `search=`. The remaining pairs keep the order they were given
/// in, which makes the result stable for equal inputs.
pub fn build_query<I, K, V>(base: &str, params: I) -> Result<String, url::ParseError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base)?;
    let pairs: Vec<(K, V)> = params
        .into_iter()
        .filter(|(key, value)| !key.as_ref().is_empty() && !value.as_ref().is_empty())
        .collect();

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url.into())
}

/// Returns the second-to-last `/`-separated segment of a record URL.
pub fn extract_record_id(url: &str) -> Option<RecordId> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return None;
    }

    let id = parts[parts.len() - 2];
    if id.is_empty() {
        return None;
    }

    Some(RecordId::new(id))
}

pub fn person_url(base_url: &str, id: &RecordId) -> String {
    format!("{}/people/{}/", base_url.trim_end_matches('/'), id)
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
