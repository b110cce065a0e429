use crate::{
    errors::ApiError,
    models::{Category, NewPoster, PosterChanges},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 200, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePosterRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[validate(length(min = 1, message = "Image key is required"))]
    pub image_key: String,
    #[serde(default)]
    pub image_url: String,
}

impl CreatePosterRequest {
    pub fn into_new_poster(self) -> Result<NewPoster, ApiError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::ValidationError("Title is required".into()));
        }

        Ok(NewPoster {
            title,
            description: self.description,
            category: self.category.parse::<Category>()?,
            target_audience: clean_audience(self.target_audience),
            image_key: self.image_key,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Default, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePosterRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_audience: Option<Vec<String>>,
    #[validate(length(min = 1, message = "Image key must not be empty"))]
    pub image_key: Option<String>,
    pub image_url: Option<String>,
}

impl UpdatePosterRequest {
    pub fn into_changes(self) -> Result<PosterChanges, ApiError> {
        let title = match self.title {
            Some(title) if title.trim().is_empty() => {
                return Err(ApiError::ValidationError("Title is required".into()));
            }
            other => other.map(|title| title.trim().to_string()),
        };

        Ok(PosterChanges {
            title,
            description: self.description,
            category: self.category.map(|raw| raw.parse::<Category>()).transpose()?,
            target_audience: self.target_audience.map(clean_audience),
            image_key: self.image_key,
            image_url: self.image_url,
        })
    }
}

fn clean_audience(audience: Vec<String>) -> Vec<String> {
    audience
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct CategoryFilter {
    pub category: Option<String>,
}

/// Query for the paginated browse endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}
fn default_limit() -> usize {
    10
}

#[derive(Debug, Default, Deserialize)]
pub struct MigrateUrlsRequest {
    /// Only rewrite URLs starting with this prefix.
    #[serde(default)]
    pub from: Option<String>,
}
