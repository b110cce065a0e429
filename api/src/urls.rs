use crate::{models::Poster, repository::PosterRepository, storage::StoreResult};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

pub const UPLOAD_PREFIX: &str = "posters/";
pub const OBJECT_ROUTE: &str = "/api/get-poster-url/";

/// Public URL under which an object is served by this API.
pub fn object_url(base_url: &str, key: &str) -> String {
    format!("{}{}{}", base_url.trim_end_matches('/'), OBJECT_ROUTE, key)
}

/// `posters/{millis}-{name}` with whitespace runs collapsed to `-` and any
/// client-side directories dropped.
pub fn unique_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original)
        .trim();
    let cleaned = base.split_whitespace().collect::<Vec<_>>().join("-");
    let cleaned = match cleaned.as_str() {
        "" | "." | ".." => "upload".to_string(),
        _ => cleaned,
    };
    format!("{}{}-{}", UPLOAD_PREFIX, Utc::now().timestamp_millis(), cleaned)
}

/// Recomputes `image_url` from `image_key` against the current base URL.
pub fn fix_poster_url(poster: &Poster, base_url: &str) -> Poster {
    let mut fixed = poster.clone();
    if !poster.image_key.is_empty() {
        fixed.image_url = object_url(base_url, &poster.image_key);
    }
    fixed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub scanned: usize,
    pub updated: usize,
}

/// Rewrites stored image URLs that no longer point at `base_url`. With
/// `from`, only URLs starting with that prefix are touched. Timestamps are
/// preserved.
pub async fn migrate_urls(
    repo: &PosterRepository,
    base_url: &str,
    from: Option<&str>,
) -> StoreResult<MigrationReport> {
    let posters = repo.list_all().await?;
    let mut updated = 0;

    for poster in posters.iter() {
        if from.is_some_and(|prefix| !poster.image_url.starts_with(prefix)) {
            continue;
        }
        let fixed = fix_poster_url(poster, base_url);
        if fixed.image_url != poster.image_url {
            repo.replace(&fixed).await?;
            updated += 1;
        }
    }

    info!("URL migration: {} of {} posters updated", updated, posters.len());
    Ok(MigrationReport {
        scanned: posters.len(),
        updated,
    })
}
