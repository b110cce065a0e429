use crate::{
    exports::{ExportSummary, export_to_kv},
    search_index::{SearchIndexManifest, regenerate},
    states::AppState,
    storage::StoreResult,
};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub export: ExportSummary,
    pub search_index: SearchIndexManifest,
}

/// Brings every derived document back in line with the poster records:
/// fresh list, per-category page index, static search index.
pub async fn rebuild(state: &AppState) -> StoreResult<RebuildReport> {
    let settings = state.index_settings();
    state.posters.invalidate_cache().await;

    let export = export_to_kv(&state.posters, &settings).await?;
    let search_index = regenerate(&state.posters, state.objects.as_ref(), &settings).await?;

    Ok(RebuildReport {
        export,
        search_index,
    })
}

/// Runs [`rebuild`] after a write. Failures are logged; the write itself
/// already succeeded.
pub async fn rebuild_after_write(state: &AppState, reason: &str) {
    match rebuild(state).await {
        Ok(report) => info!(
            "Derived indices rebuilt after {}: {} posters",
            reason, report.export.total_posters
        ),
        Err(e) => warn!("Rebuilding derived indices after {} failed: {}", reason, e),
    }
}
