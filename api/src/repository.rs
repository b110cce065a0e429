use crate::{
    cache::ListCache,
    models::{Category, NewPoster, Poster, PosterChanges},
    storage::{
        StoreResult,
        kv::{KvStore, put_json},
    },
};
use chrono::Utc;
use std::{collections::BTreeSet, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Every poster record lives under a key with this prefix; derived
/// documents use other prefixes.
pub const POSTER_KEY_PREFIX: &str = "poster_";

/// Poster metadata CRUD over the key-value store, fronted by the list cache.
pub struct PosterRepository {
    kv: Arc<dyn KvStore>,
    cache: ListCache,
}

impl PosterRepository {
    pub fn new(kv: Arc<dyn KvStore>, cache_ttl: Duration) -> Self {
        Self {
            kv,
            cache: ListCache::new(cache_ttl),
        }
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.kv.as_ref()
    }

    /// All posters, most recently updated first.
    pub async fn list_all(&self) -> StoreResult<Arc<Vec<Poster>>> {
        if let Some(cached) = self.cache.get().await {
            debug!("Serving {} posters from cache", cached.len());
            return Ok(cached);
        }

        let keys = self.kv.list(POSTER_KEY_PREFIX).await?;
        let mut posters = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(poster) = self.load(&key).await? {
                posters.push(poster);
            }
        }
        posters.sort_by(Poster::newest_first);

        let posters = Arc::new(posters);
        self.cache.set(Arc::clone(&posters)).await;
        Ok(posters)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Poster>> {
        if !id.starts_with(POSTER_KEY_PREFIX) {
            return Ok(None);
        }
        self.load(id).await
    }

    pub async fn create(&self, input: NewPoster) -> StoreResult<Poster> {
        let now = Utc::now().timestamp_millis();
        let poster = Poster::from_new(Poster::generate_id(now), input, now);

        put_json(self.kv(), &poster.id, &poster).await?;
        self.cache.invalidate().await;

        info!("Poster created: {} ({})", poster.id, poster.category);
        Ok(poster)
    }

    pub async fn update(&self, id: &str, changes: PosterChanges) -> StoreResult<Option<Poster>> {
        let Some(mut poster) = self.get(id).await? else {
            return Ok(None);
        };

        poster.apply(changes, Utc::now().timestamp_millis());
        put_json(self.kv(), &poster.id, &poster).await?;
        self.cache.invalidate().await;

        info!("Poster updated: {}", poster.id);
        Ok(Some(poster))
    }

    /// Stores a record as-is, without touching its timestamps.
    pub async fn replace(&self, poster: &Poster) -> StoreResult<()> {
        put_json(self.kv(), &poster.id, poster).await?;
        self.cache.invalidate().await;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }

        self.kv.delete(id).await?;
        self.cache.invalidate().await;

        info!("Poster deleted: {}", id);
        Ok(true)
    }

    /// Distinct categories in use, in their fixed order.
    pub async fn categories(&self) -> StoreResult<Vec<Category>> {
        let posters = self.list_all().await?;
        let used: BTreeSet<Category> = posters.iter().map(|poster| poster.category).collect();
        Ok(used.into_iter().collect())
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate().await;
    }

    async fn load(&self, key: &str) -> StoreResult<Option<Poster>> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(poster) => Ok(Some(poster)),
            Err(e) => {
                warn!("Skipping unreadable poster record {}: {}", key, e);
                Ok(None)
            }
        }
    }
}
