use crate::{
    auth::admin_password_hash,
    config::Config,
    errors::StartupError,
    exports::IndexSettings,
    repository::PosterRepository,
    storage::{KvStore, ObjectStore},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::{num::NonZeroU32, sync::Arc};

/// Shared across all requests; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub posters: Arc<PosterRepository>,
    pub objects: Arc<dyn ObjectStore>,
    pub admin_password_hash: Arc<str>,
    pub jwt_secret: String,
    pub login_limiter: Arc<DefaultDirectRateLimiter>,
}

impl AppState {
    pub fn new(
        config: Config,
        kv: Arc<dyn KvStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Result<Self, StartupError> {
        let admin_password_hash = admin_password_hash(&config.admin_secret)?;
        let per_minute = NonZeroU32::new(config.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            posters: Arc::new(PosterRepository::new(kv, config.list_cache_ttl)),
            objects,
            admin_password_hash: admin_password_hash.into(),
            jwt_secret: config.jwt_secret.clone(),
            login_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            config: Arc::new(config),
        })
    }

    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            posters_per_page: self.config.posters_per_page,
            public_base_url: self.config.public_base_url.clone(),
        }
    }
}
