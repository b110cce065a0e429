use crate::{
    dto::PaginatedResponse,
    models::{Category, Poster},
};

pub const MAX_PAGE_SIZE: usize = 100;

/// Case-insensitive substring match over title, description and audience.
pub fn matches_query(poster: &Poster, query: &str) -> bool {
    let needle = query.to_lowercase();
    poster.title.to_lowercase().contains(&needle)
        || poster.description.to_lowercase().contains(&needle)
        || poster
            .target_audience
            .iter()
            .any(|audience| audience.to_lowercase().contains(&needle))
}

/// Filters by category, then by query. Blank queries match everything.
pub fn search(posters: &[Poster], query: Option<&str>, category: Option<Category>) -> Vec<Poster> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    posters
        .iter()
        .filter(|poster| category.is_none_or(|category| poster.category == category))
        .filter(|poster| query.is_none_or(|query| matches_query(poster, query)))
        .cloned()
        .collect()
}

/// 1-based page slice. `limit` is clamped to `1..=MAX_PAGE_SIZE`, pages
/// below 1 are treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> PaginatedResponse<T> {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(limit);

    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit).min(total);
    let data = if start < total {
        items[start..end].to_vec()
    } else {
        vec![]
    };

    PaginatedResponse {
        data,
        page,
        limit,
        total,
        total_pages,
        has_more: end < total,
    }
}
