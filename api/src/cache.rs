use crate::models::Poster;
use std::{sync::Arc, time::Duration};
use tokio::{sync::RwLock, time::Instant};

struct Cached {
    stored_at: Instant,
    posters: Arc<Vec<Poster>>,
}

/// Time-bounded copy of the full poster list. A zero TTL disables caching.
pub struct ListCache {
    ttl: Duration,
    slot: RwLock<Option<Cached>>,
}

impl ListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Option<Arc<Vec<Poster>>> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.posters))
    }

    pub async fn set(&self, posters: Arc<Vec<Poster>>) {
        if self.ttl.is_zero() {
            return;
        }
        *self.slot.write().await = Some(Cached {
            stored_at: Instant::now(),
            posters,
        });
    }

    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ListCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());

        cache.set(Arc::new(Vec::new())).await;
        assert!(cache.get().await.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn invalidate_clears_entry() {
        let cache = ListCache::new(Duration::from_secs(60));
        cache.set(Arc::new(Vec::new())).await;
        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_never_caches() {
        let cache = ListCache::new(Duration::ZERO);
        cache.set(Arc::new(Vec::new())).await;
        assert!(cache.get().await.is_none());
    }
}
