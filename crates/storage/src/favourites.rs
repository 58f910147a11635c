use std::collections::BTreeSet;

use anyhow::{Context, Result};
use shared::domain::RecordId;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::KeyValueStore;

pub const FAVOURITES_KEY: &str = "favourites";

/// Favourite record ids persisted as one JSON array under [`FAVOURITES_KEY`].
///
/// Every mutation holds the set lock across read, modify and the store write,
/// so concurrent toggles cannot lose each other's updates. The in-memory set is
/// only replaced after the store accepted the new array.
pub struct Favourites<S: KeyValueStore> {
    store: S,
    ids: Mutex<BTreeSet<RecordId>>,
}

impl<S: KeyValueStore> Favourites<S> {
    pub async fn load(store: S) -> Result<Self> {
        let ids = match store.get(FAVOURITES_KEY).await? {
            Some(raw) => decode_ids(&raw)?,
            None => {
                store
                    .set(FAVOURITES_KEY, "[]")
                    .await
                    .context("failed to initialise favourites entry")?;
                BTreeSet::new()
            }
        };
        debug!(count = ids.len(), "loaded favourites");

        Ok(Self {
            store,
            ids: Mutex::new(ids),
        })
    }

    pub async fn contains(&self, id: &RecordId) -> bool {
        self.ids.lock().await.contains(id)
    }

    pub async fn ids(&self) -> Vec<RecordId> {
        self.ids.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }

    /// Flips membership of `id` and returns whether it is now a favourite.
    pub async fn toggle(&self, id: &RecordId) -> Result<bool> {
        let mut ids = self.ids.lock().await;
        let mut updated = ids.clone();
        let now_favourite = if updated.remove(id) {
            false
        } else {
            updated.insert(id.clone());
            true
        };

        self.persist(&updated).await?;
        *ids = updated;
        info!(id = %id, favourite = now_favourite, "toggled favourite");
        Ok(now_favourite)
    }

    /// Drops `id` from the set. Returns `false` when it was not a favourite.
    pub async fn remove(&self, id: &RecordId) -> Result<bool> {
        let mut ids = self.ids.lock().await;
        if !ids.contains(id) {
            return Ok(false);
        }

        let mut updated = ids.clone();
        updated.remove(id);
        self.persist(&updated).await?;
        *ids = updated;
        info!(id = %id, "removed favourite");
        Ok(true)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn persist(&self, ids: &BTreeSet<RecordId>) -> Result<()> {
        let encoded = serde_json::to_string(ids).context("failed to encode favourites")?;
        self.store
            .set(FAVOURITES_KEY, &encoded)
            .await
            .context("failed to persist favourites")
    }
}

fn decode_ids(raw: &str) -> Result<BTreeSet<RecordId>> {
    let ids: Vec<RecordId> = serde_json::from_str(raw)
        .with_context(|| format!("favourites entry is not a JSON array of ids: {raw}"))?;
    Ok(ids.into_iter().collect())
}

#[cfg(test)]
#[path = "tests/favourites_tests.rs"]
mod tests;
