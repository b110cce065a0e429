use crate::{
    exports::CategoryStats,
    models::{Category, Poster},
    storage::ObjectMeta,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
    pub storage: &'static str,
    pub posters: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct PosterResponse {
    pub poster: Poster,
}

#[derive(Debug, Serialize)]
pub struct PostersResponse {
    pub posters: Vec<Poster>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: Category,
    pub slug: &'static str,
    pub english_name: &'static str,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            id: category,
            slug: category.slug(),
            english_name: category.english_name(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub key: String,
    pub last_modified: String,
    pub size: u64,
    pub url: String,
}

impl StoredObject {
    pub fn from_meta(meta: ObjectMeta, url: String) -> Self {
        Self {
            key: meta.key,
            last_modified: meta.uploaded.to_rfc3339(),
            size: meta.size,
            url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoredObjectsResponse {
    pub posters: Vec<StoredObject>,
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub success: bool,
    pub total_posters: usize,
    pub categories: BTreeMap<String, CategoryStats>,
}

#[derive(Debug, Serialize)]
pub struct ClearExportsResponse {
    pub success: bool,
    pub removed: usize,
}
