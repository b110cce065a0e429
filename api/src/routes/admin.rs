use crate::{
    AppState,
    auth::require_admin,
    dto::{ClearExportsResponse, ExportResponse, MigrateUrlsRequest, PostersResponse},
    errors::ApiError,
    extract::ApiPath,
    exports::{
        ExportMetadata, clear_exports, export_metadata, export_to_kv, exported_page, static_json,
    },
    maintenance::rebuild_after_write,
    models::{Category, Poster},
    search_index::{SearchIndexManifest, regenerate},
    urls::{MigrationReport, migrate_urls},
};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use std::collections::BTreeMap;

/// POST /api/admin/export-categorized-data
pub async fn export_categorized(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ExportResponse>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    let summary = export_to_kv(&state.posters, &state.index_settings()).await?;

    Ok(Json(ExportResponse {
        success: true,
        total_posters: summary.total_posters,
        categories: summary.categories,
    }))
}

/// GET /api/exported-data/metadata
pub async fn get_export_metadata(
    State(state): State<AppState>,
) -> Result<Json<ExportMetadata>, ApiError> {
    export_metadata(state.posters.kv())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No export metadata".into()))
}

/// GET /api/exported-data/{category}/{page}
pub async fn get_exported_page(
    State(state): State<AppState>,
    ApiPath((category, page)): ApiPath<(String, usize)>,
) -> Result<Json<PostersResponse>, ApiError> {
    let category: Category = category.parse()?;

    let posters = exported_page(&state.posters, &state.index_settings(), category, page)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No posters for {} page {}", category.slug(), page))
        })?;

    Ok(Json(PostersResponse { posters }))
}

/// GET /api/admin/static-json-data
pub async fn get_static_json(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BTreeMap<String, BTreeMap<usize, Vec<Poster>>>>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    Ok(Json(
        static_json(&state.posters, &state.index_settings()).await?,
    ))
}

/// DELETE /api/admin/exported-data
pub async fn delete_exported_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClearExportsResponse>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    let removed = clear_exports(state.posters.kv()).await?;

    Ok(Json(ClearExportsResponse {
        success: true,
        removed,
    }))
}

/// POST /api/admin/search-index
pub async fn regenerate_search_index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SearchIndexManifest>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    let manifest = regenerate(
        &state.posters,
        state.objects.as_ref(),
        &state.index_settings(),
    )
    .await?;

    Ok(Json(manifest))
}

/// POST /api/admin/migrate-urls
/// Body (optional): { "from": "https://old-domain" }
pub async fn migrate_image_urls(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MigrationReport>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    let request: MigrateUrlsRequest = if body.is_empty() {
        MigrateUrlsRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::ValidationError(e.to_string()))?
    };
    let report = migrate_urls(
        &state.posters,
        &state.config.public_base_url,
        request.from.as_deref(),
    )
    .await?;

    if report.updated > 0 {
        rebuild_after_write(&state, "URL migration").await;
    }

    Ok(Json(report))
}
