use crate::{
    models::{Category, Poster},
    repository::PosterRepository,
    storage::{
        StoreResult,
        kv::{KvStore, put_json},
    },
    urls::fix_poster_url,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const EXPORT_PREFIX: &str = "EXPORT_";
pub const EXPORT_METADATA_KEY: &str = "EXPORT_METADATA";

/// Knobs shared by the page index and the static search index.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub posters_per_page: usize,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_time: DateTime<Utc>,
    pub total_posters: usize,
    pub categories: BTreeMap<String, CategoryStats>,
    pub posters_per_page: usize,
    /// Display name to slug.
    pub category_mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub total_posters: usize,
    pub categories: BTreeMap<String, CategoryStats>,
}

pub fn page_key(category: Category, page: usize) -> String {
    format!("{}{}_{}", EXPORT_PREFIX, category.slug(), page)
}

/// Items of the 1-based `page`; empty past the end.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// Posters grouped by category and chunked into pages, URLs fixed. Input
/// order (newest first) is kept inside every category.
pub fn paged_categories(
    posters: &[Poster],
    settings: &IndexSettings,
) -> BTreeMap<Category, Vec<Vec<Poster>>> {
    let mut grouped: BTreeMap<Category, Vec<Poster>> = BTreeMap::new();
    for poster in posters {
        grouped
            .entry(poster.category)
            .or_default()
            .push(fix_poster_url(poster, &settings.public_base_url));
    }

    grouped
        .into_iter()
        .map(|(category, posters)| {
            let pages = posters
                .chunks(settings.posters_per_page.max(1))
                .map(<[Poster]>::to_vec)
                .collect();
            (category, pages)
        })
        .collect()
}

fn stats_of(paged: &BTreeMap<Category, Vec<Vec<Poster>>>) -> BTreeMap<String, CategoryStats> {
    paged
        .iter()
        .map(|(category, pages)| {
            let count = pages.iter().map(Vec::len).sum();
            (
                category.slug().to_string(),
                CategoryStats {
                    count,
                    pages: pages.len(),
                },
            )
        })
        .collect()
}

pub fn category_mapping() -> BTreeMap<String, String> {
    Category::ALL
        .iter()
        .map(|category| (category.name().to_string(), category.slug().to_string()))
        .collect()
}

/// Rewrites every `EXPORT_{slug}_{page}` document plus `EXPORT_METADATA`.
/// Old pages are cleared first so a shrinking category leaves nothing stale.
pub async fn export_to_kv(
    repo: &PosterRepository,
    settings: &IndexSettings,
) -> StoreResult<ExportSummary> {
    let posters = repo.list_all().await?;
    let paged = paged_categories(&posters, settings);
    let kv = repo.kv();

    clear_exports(kv).await?;

    for (category, pages) in &paged {
        for (index, page) in pages.iter().enumerate() {
            let key = page_key(*category, index + 1);
            put_json(kv, &key, page).await?;
            debug!("Stored {} ({} posters)", key, page.len());
        }
    }

    let categories = stats_of(&paged);
    let metadata = ExportMetadata {
        export_time: Utc::now(),
        total_posters: posters.len(),
        categories: categories.clone(),
        posters_per_page: settings.posters_per_page,
        category_mapping: category_mapping(),
    };
    put_json(kv, EXPORT_METADATA_KEY, &metadata).await?;

    info!(
        "Exported {} posters across {} categories",
        posters.len(),
        categories.len()
    );
    Ok(ExportSummary {
        total_posters: posters.len(),
        categories,
    })
}

/// Reads one exported page, falling back to a live query when the page
/// document is missing or unreadable. `None` when the page is empty.
pub async fn exported_page(
    repo: &PosterRepository,
    settings: &IndexSettings,
    category: Category,
    page: usize,
) -> StoreResult<Option<Vec<Poster>>> {
    if page == 0 {
        return Ok(None);
    }

    let key = page_key(category, page);
    if let Some(raw) = repo.kv().get(&key).await? {
        match serde_json::from_str::<Vec<Poster>>(&raw) {
            Ok(posters) => return Ok(Some(posters)),
            Err(e) => warn!("Unreadable export page {}: {}", key, e),
        }
    }

    debug!("{} not exported, querying posters directly", key);
    let posters: Vec<Poster> = repo
        .list_all()
        .await?
        .iter()
        .filter(|poster| poster.category == category)
        .map(|poster| fix_poster_url(poster, &settings.public_base_url))
        .collect();
    let slice = page_slice(&posters, page, settings.posters_per_page);

    Ok((!slice.is_empty()).then(|| slice.to_vec()))
}

pub async fn export_metadata(kv: &dyn KvStore) -> StoreResult<Option<ExportMetadata>> {
    let Some(raw) = kv.get(EXPORT_METADATA_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) => {
            warn!("Unreadable export metadata: {}", e);
            Ok(None)
        }
    }
}

/// Deletes every export document; returns how many were removed.
pub async fn clear_exports(kv: &dyn KvStore) -> StoreResult<usize> {
    let keys = kv.list(EXPORT_PREFIX).await?;
    let mut removed = 0;
    for key in &keys {
        if kv.delete(key).await? {
            removed += 1;
        }
    }
    if removed > 0 {
        info!("Cleared {} export documents", removed);
    }
    Ok(removed)
}

/// `{slug: {page: posters}}` for bundling straight into the front end.
pub async fn static_json(
    repo: &PosterRepository,
    settings: &IndexSettings,
) -> StoreResult<BTreeMap<String, BTreeMap<usize, Vec<Poster>>>> {
    let posters = repo.list_all().await?;
    Ok(paged_categories(&posters, settings)
        .into_iter()
        .map(|(category, pages)| {
            let numbered = pages
                .into_iter()
                .enumerate()
                .map(|(index, page)| (index + 1, page))
                .collect();
            (category.slug().to_string(), numbered)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::NewPoster,
        storage::{MemoryKv, kv::get_json},
    };
    use std::{sync::Arc, time::Duration};

    fn settings() -> IndexSettings {
        IndexSettings {
            posters_per_page: 5,
            public_base_url: "https://api.example.com".into(),
        }
    }

    async fn seeded(counts: &[(Category, usize)]) -> PosterRepository {
        let repo = PosterRepository::new(Arc::new(MemoryKv::new()), Duration::ZERO);
        for (category, count) in counts {
            for n in 0..*count {
                repo.create(NewPoster {
                    title: format!("{} #{n}", category.slug()),
                    description: String::new(),
                    category: *category,
                    target_audience: vec![],
                    image_key: format!("posters/{}-{n}.png", category.slug()),
                    image_url: "https://stale.workers.dev/old".into(),
                })
                .await
                .unwrap();
            }
        }
        repo
    }

    #[test]
    fn page_slice_bounds() {
        let items = [1, 2, 3, 4, 5, 6, 7];
        assert_eq!(page_slice(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(page_slice(&items, 2, 5), &[6, 7]);
        assert!(page_slice(&items, 3, 5).is_empty());
        assert!(page_slice(&items, 0, 5).is_empty());
    }

    #[tokio::test]
    async fn export_writes_pages_and_metadata() {
        let repo = seeded(&[(Category::Engineering, 12), (Category::Science, 3)]).await;
        let summary = export_to_kv(&repo, &settings()).await.unwrap();

        assert_eq!(summary.total_posters, 15);
        assert_eq!(summary.categories["gongke"], CategoryStats { count: 12, pages: 3 });
        assert_eq!(summary.categories["like"], CategoryStats { count: 3, pages: 1 });
        assert!(!summary.categories.contains_key("wenke"));

        let keys = repo.kv().list(EXPORT_PREFIX).await.unwrap();
        assert_eq!(
            keys,
            vec!["EXPORT_METADATA", "EXPORT_gongke_1", "EXPORT_gongke_2", "EXPORT_gongke_3", "EXPORT_like_1"]
        );

        let last: Vec<Poster> = get_json(repo.kv(), "EXPORT_gongke_3").await.unwrap().unwrap();
        assert_eq!(last.len(), 2);
        assert!(last.iter().all(|p| p.image_url.starts_with("https://api.example.com/api/get-poster-url/")));

        let metadata = export_metadata(repo.kv()).await.unwrap().unwrap();
        assert_eq!(metadata.posters_per_page, 5);
        assert_eq!(metadata.category_mapping["商科"], "shangke");
    }

    #[tokio::test]
    async fn re_export_drops_stale_pages() {
        let repo = seeded(&[(Category::Business, 6)]).await;
        export_to_kv(&repo, &settings()).await.unwrap();
        assert!(repo.kv().get("EXPORT_shangke_2").await.unwrap().is_some());

        let victim = repo.list_all().await.unwrap()[0].id.clone();
        repo.delete(&victim).await.unwrap();
        export_to_kv(&repo, &settings()).await.unwrap();

        assert!(repo.kv().get("EXPORT_shangke_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exported_page_falls_back_to_live_query() {
        let repo = seeded(&[(Category::LiberalArts, 7)]).await;

        let live = exported_page(&repo, &settings(), Category::LiberalArts, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(live.len(), 2);

        export_to_kv(&repo, &settings()).await.unwrap();
        let stored = exported_page(&repo, &settings(), Category::LiberalArts, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, live);

        repo.kv().put("EXPORT_wenke_1", "garbage".into()).await.unwrap();
        let recovered = exported_page(&repo, &settings(), Category::LiberalArts, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recovered.len(), 5);

        assert!(exported_page(&repo, &settings(), Category::LiberalArts, 3).await.unwrap().is_none());
        assert!(exported_page(&repo, &settings(), Category::Science, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_and_static_json() {
        let repo = seeded(&[(Category::Science, 6)]).await;
        export_to_kv(&repo, &settings()).await.unwrap();

        assert_eq!(clear_exports(repo.kv()).await.unwrap(), 3);
        assert!(export_metadata(repo.kv()).await.unwrap().is_none());
        assert_eq!(clear_exports(repo.kv()).await.unwrap(), 0);

        let json = static_json(&repo, &settings()).await.unwrap();
        assert_eq!(json["like"][&1].len(), 5);
        assert_eq!(json["like"][&2].len(), 1);

        let rendered = serde_json::to_value(&json).unwrap();
        assert!(rendered["like"]["2"].is_array());
    }
}
