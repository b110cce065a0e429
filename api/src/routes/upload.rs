use crate::{
    AppState,
    auth::require_admin,
    dto::{StoredObject, StoredObjectsResponse, SuccessResponse, UploadResponse},
    errors::ApiError,
    extract::ApiPath,
    urls::{UPLOAD_PREFIX, object_url, unique_file_name},
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::MultipartError,
        multipart::MultipartRejection,
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

/// Form field carrying the image.
pub const UPLOAD_FIELD: &str = "poster";

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::ValidationError(e.body_text())
    }
}

fn human_size(bytes: usize) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{}MB", b / (1024 * 1024)),
        b if b >= 1024 => format!("{}KB", b / 1024),
        b => format!("{b} bytes"),
    }
}

/// POST /api/upload-poster
/// Headers: Authorization: Bearer <token>
/// Body: multipart form with a `poster` file field
pub async fn upload_poster(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::ValidationError("No file uploaded or invalid file".into()))?;
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?;

        let limit = state.config.max_upload_bytes;
        if data.len() > limit {
            return Err(ApiError::ValidationError(format!(
                "File exceeds the {} limit",
                human_size(limit)
            )));
        }

        let key = unique_file_name(&file_name);
        state.objects.put(&key, data.to_vec(), &content_type).await?;
        let url = object_url(&state.config.public_base_url, &key);

        info!("Image uploaded: {} ({} bytes)", key, data.len());

        return Ok(Json(UploadResponse {
            success: true,
            url,
            key,
        }));
    }

    Err(ApiError::ValidationError(
        "No file uploaded or invalid file".into(),
    ))
}

/// GET /api/get-poster-url/{*key}
/// Serves the stored bytes with their original content type.
pub async fn get_object(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Response, ApiError> {
    let object = state
        .objects
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Poster image not found".into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, object.meta.content_type),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        object.body,
    )
        .into_response())
}

/// GET /api/list-posters
pub async fn list_objects(
    State(state): State<AppState>,
) -> Result<Json<StoredObjectsResponse>, ApiError> {
    let base_url = &state.config.public_base_url;
    let posters = state
        .objects
        .list(UPLOAD_PREFIX)
        .await?
        .into_iter()
        .map(|meta| {
            let url = object_url(base_url, &meta.key);
            StoredObject::from_meta(meta, url)
        })
        .collect();

    Ok(Json(StoredObjectsResponse { posters }))
}

/// DELETE /api/delete-poster/{*key}
/// Headers: Authorization: Bearer <token>
pub async fn delete_object(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_admin(&headers, &state.jwt_secret)?;

    let existed = state.objects.delete(&key).await?;
    info!("Image deleted: {} (existed: {})", key, existed);

    Ok(Json(SuccessResponse {
        success: true,
        message: Some("Poster image deleted".into()),
    }))
}
