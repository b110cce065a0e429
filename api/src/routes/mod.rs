pub mod admin;
pub mod auth;
pub mod health;
pub mod poster;
pub mod upload;

use crate::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Multipart framing allowance on top of the image size limit.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Method, path and summary of every route, logged at startup.
pub const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/health", "Health check"),
    ("POST", "/api/admin/login", "Admin login"),
    ("POST", "/api/upload-poster", "Upload image (admin)"),
    ("GET", "/api/get-poster-url/{key}", "Serve image"),
    ("GET", "/api/list-posters", "List uploaded images"),
    ("DELETE", "/api/delete-poster/{key}", "Delete image (admin)"),
    ("GET", "/api/poster-metadata", "List posters"),
    ("POST", "/api/poster-metadata", "Create poster (admin)"),
    ("GET", "/api/poster-metadata/{id}", "Get poster"),
    ("PUT", "/api/poster-metadata/{id}", "Update poster (admin)"),
    ("DELETE", "/api/poster-metadata/{id}", "Delete poster (admin)"),
    ("GET", "/api/categories", "Categories in use"),
    ("GET", "/api/category-list", "Category table"),
    ("GET", "/api/posters", "Search (paginated)"),
    ("POST", "/api/admin/export-categorized-data", "Export page index (admin)"),
    ("GET", "/api/exported-data/metadata", "Export metadata"),
    ("GET", "/api/exported-data/{category}/{page}", "Category page"),
    ("GET", "/api/admin/static-json-data", "Static JSON bundle (admin)"),
    ("DELETE", "/api/admin/exported-data", "Clear page index (admin)"),
    ("POST", "/api/admin/search-index", "Regenerate search index (admin)"),
    ("POST", "/api/admin/migrate-urls", "Migrate image URLs (admin)"),
];

pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(auth::login))
        // Images
        .route(
            "/upload-poster",
            post(upload::upload_poster)
                .layer(DefaultBodyLimit::max(max_upload_bytes + UPLOAD_OVERHEAD_BYTES)),
        )
        .route("/get-poster-url/{*key}", get(upload::get_object))
        .route("/list-posters", get(upload::list_objects))
        .route("/delete-poster/{*key}", delete(upload::delete_object))
        // Poster metadata
        .route(
            "/poster-metadata",
            get(poster::list_posters).post(poster::create_poster),
        )
        .route(
            "/poster-metadata/{id}",
            get(poster::get_poster)
                .put(poster::update_poster)
                .delete(poster::delete_poster),
        )
        .route("/categories", get(poster::used_categories))
        .route("/category-list", get(poster::category_list))
        .route("/posters", get(poster::browse_posters))
        // Derived indices
        .route(
            "/admin/export-categorized-data",
            post(admin::export_categorized),
        )
        .route("/exported-data/metadata", get(admin::get_export_metadata))
        .route(
            "/exported-data/{category}/{page}",
            get(admin::get_exported_page),
        )
        .route("/admin/static-json-data", get(admin::get_static_json))
        .route("/admin/exported-data", delete(admin::delete_exported_data))
        .route("/admin/search-index", post(admin::regenerate_search_index))
        .route("/admin/migrate-urls", post(admin::migrate_image_urls))
}
