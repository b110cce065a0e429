use crate::{
    AppState,
    auth::require_admin,
    dto::{
        CategoriesResponse, CategoryFilter, CategoryInfo, CreatePosterRequest, PaginatedResponse,
        PosterResponse, PostersResponse, SearchParams, SuccessResponse, UpdatePosterRequest,
    },
    errors::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    maintenance::rebuild_after_write,
    models::{Category, Poster},
    search::{paginate, search},
    urls::object_url,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Ok(Some(raw.parse()?)),
        None => Ok(None),
    }
}

fn poster_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Poster {} not found", id))
}

/// GET /api/poster-metadata?category=工科
pub async fn list_posters(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CategoryFilter>,
) -> Result<Json<PostersResponse>, ApiError> {
    let category = parse_category(filter.category.as_deref())?;
    let posters = state.posters.list_all().await?;

    Ok(Json(PostersResponse {
        posters: search(&posters, None, category),
    }))
}

/// GET /api/poster-metadata/{id}
pub async fn get_poster(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<PosterResponse>, ApiError> {
    let poster = state
        .posters
        .get(&id)
        .await?
        .ok_or_else(|| poster_not_found(&id))?;

    Ok(Json(PosterResponse { poster }))
}

/// POST /api/poster-metadata
/// Headers: Authorization: Bearer <token>
pub async fn create_poster(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreatePosterRequest>,
) -> Result<(StatusCode, Json<PosterResponse>), ApiError> {
    require_admin(&headers, &state.jwt_secret)?;
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let mut input = payload.into_new_poster()?;
    if input.image_url.is_empty() {
        input.image_url = object_url(&state.config.public_base_url, &input.image_key);
    }

    let poster = state.posters.create(input).await?;
    rebuild_after_write(&state, "poster create").await;

    Ok((StatusCode::CREATED, Json(PosterResponse { poster })))
}

/// PUT /api/poster-metadata/{id}
/// Headers: Authorization: Bearer <token>
pub async fn update_poster(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdatePosterRequest>,
) -> Result<Json<PosterResponse>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let mut changes = payload.into_changes()?;
    if changes.image_url.is_none() {
        changes.image_url = changes
            .image_key
            .as_deref()
            .map(|key| object_url(&state.config.public_base_url, key));
    }
    let poster = state
        .posters
        .update(&id, changes)
        .await?
        .ok_or_else(|| poster_not_found(&id))?;
    rebuild_after_write(&state, "poster update").await;

    Ok(Json(PosterResponse { poster }))
}

/// DELETE /api/poster-metadata/{id}
/// Headers: Authorization: Bearer <token>
pub async fn delete_poster(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    if !state.posters.delete(&id).await? {
        return Err(poster_not_found(&id));
    }
    rebuild_after_write(&state, "poster delete").await;

    Ok(Json(SuccessResponse {
        success: true,
        message: None,
    }))
}

/// GET /api/categories
/// Categories that currently have at least one poster.
pub async fn used_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    Ok(Json(CategoriesResponse {
        categories: state.posters.categories().await?,
    }))
}

/// GET /api/category-list
pub async fn category_list() -> Json<Vec<CategoryInfo>> {
    Json(Category::ALL.into_iter().map(CategoryInfo::from).collect())
}

/// GET /api/posters?q=solar&category=gongke&page=1&limit=10
pub async fn browse_posters(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<PaginatedResponse<Poster>>, ApiError> {
    let category = parse_category(params.category.as_deref())?;
    let posters = state.posters.list_all().await?;
    let matches = search(&posters, params.q.as_deref(), category);

    Ok(Json(paginate(&matches, params.page, params.limit)))
}
