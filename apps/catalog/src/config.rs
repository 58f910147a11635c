use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{QueryConfig, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            page_size: 10,
            debounce_ms: 400,
            request_timeout_secs: 15,
            database_url: "sqlite://./data/catalog.db".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Searchable list of people under the configured API root.
    pub fn people_query(&self) -> QueryConfig {
        QueryConfig::new(format!(
            "{}/people/",
            self.api_base_url.trim_end_matches('/')
        ))
        .with_search_param("search")
        .with_page_size(self.page_size)
        .with_debounce(Duration::from_millis(self.debounce_ms))
    }
}

/// Keys accepted in `catalog.toml`. Anything absent keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    database_url: Option<String>,
}

/// Defaults, then the config file, then the environment.
///
/// An explicit `config_path` must exist; the implicit `catalog.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            debug!(path = %path.display(), "loaded config file");
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file.database_url {
        settings.database_url = v;
    }
    Ok(())
}

/// Overlays `CATALOG_*` variables, then their `APP__*` spellings.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| {
        lookup(&format!("APP__{name}")).or_else(|| lookup(&format!("CATALOG_{name}")))
    };

    if let Some(v) = var("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = parsed(var("PAGE_SIZE"), "PAGE_SIZE") {
        settings.page_size = v;
    }
    if let Some(v) = parsed(var("DEBOUNCE_MS"), "DEBOUNCE_MS") {
        settings.debounce_ms = v;
    }
    if let Some(v) = parsed(var("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v;
    }
}

fn parsed<T: std::str::FromStr>(raw: Option<String>, name: &str) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(%name, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
