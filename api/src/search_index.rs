use crate::{
    exports::{CategoryStats, IndexSettings, paged_categories},
    models::{Category, Poster},
    repository::PosterRepository,
    storage::{ObjectStore, StoreResult},
    urls::fix_poster_url,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub const SEARCH_INDEX_PREFIX: &str = "search-index/";
pub const MANIFEST_KEY: &str = "search-index/manifest.json";
pub const ALL_ENTRIES_KEY: &str = "search-index/all.json";

const JSON: &str = "application/json";

/// Compact record the browser searches client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub target_audience: Vec<String>,
    pub image_url: String,
    pub updated_at: i64,
}

impl From<Poster> for SearchEntry {
    fn from(poster: Poster) -> Self {
        Self {
            id: poster.id,
            title: poster.title,
            description: poster.description,
            category: poster.category,
            target_audience: poster.target_audience,
            image_url: poster.image_url,
            updated_at: poster.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexManifest {
    pub generated_at: DateTime<Utc>,
    pub total_posters: usize,
    pub posters_per_page: usize,
    pub categories: BTreeMap<String, CategoryStats>,
    pub files: Vec<String>,
}

pub fn page_file_key(category: Category, page: usize) -> String {
    format!("{}{}/{}.json", SEARCH_INDEX_PREFIX, category.slug(), page)
}

async fn put_json<T: Serialize + ?Sized>(
    objects: &dyn ObjectStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    objects.put(key, serde_json::to_vec(value)?, JSON).await?;
    debug!("Wrote {}", key);
    Ok(())
}

/// Rewrites the static search-index files and removes any file under the
/// prefix that the new generation did not produce.
pub async fn regenerate(
    repo: &PosterRepository,
    objects: &dyn ObjectStore,
    settings: &IndexSettings,
) -> StoreResult<SearchIndexManifest> {
    let posters = repo.list_all().await?;
    let paged = paged_categories(&posters, settings);

    let entries: Vec<SearchEntry> = posters
        .iter()
        .map(|poster| fix_poster_url(poster, &settings.public_base_url).into())
        .collect();
    put_json(objects, ALL_ENTRIES_KEY, &entries).await?;

    let mut files = vec![ALL_ENTRIES_KEY.to_string()];
    let mut categories = BTreeMap::new();
    for (category, pages) in &paged {
        for (index, page) in pages.iter().enumerate() {
            let key = page_file_key(*category, index + 1);
            put_json(objects, &key, page).await?;
            files.push(key);
        }
        categories.insert(
            category.slug().to_string(),
            CategoryStats {
                count: pages.iter().map(Vec::len).sum(),
                pages: pages.len(),
            },
        );
    }

    let manifest = SearchIndexManifest {
        generated_at: Utc::now(),
        total_posters: posters.len(),
        posters_per_page: settings.posters_per_page,
        categories,
        files: files.clone(),
    };
    put_json(objects, MANIFEST_KEY, &manifest).await?;

    let keep: BTreeSet<&str> = files
        .iter()
        .map(String::as_str)
        .chain([MANIFEST_KEY])
        .collect();
    let mut removed = 0;
    for stale in objects.list(SEARCH_INDEX_PREFIX).await? {
        if !keep.contains(stale.key.as_str()) && objects.delete(&stale.key).await? {
            removed += 1;
        }
    }

    info!(
        "Search index regenerated: {} posters, {} files, {} stale removed",
        manifest.total_posters,
        manifest.files.len() + 1,
        removed
    );
    Ok(manifest)
}
