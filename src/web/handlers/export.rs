//! Report export endpoint

use axum::{
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::export::{ExportFormat, export_report};
use crate::web::{AppState, extractors::RequestContext};

/// `GET /api/export/{format}/{analysis_id}`
pub async fn export_analysis(
    State(state): State<AppState>,
    Path((format, analysis_id)): Path<(String, String)>,
    context: RequestContext,
) -> Result<Response, AppError> {
    let format = ExportFormat::parse(&format)?;
    let report = state
        .store
        .get(&analysis_id)
        .await
        .ok_or_else(|| AppError::not_found("analysis", &analysis_id))?;

    // rendering is CPU-bound; keep it off the async workers
    let file = tokio::task::spawn_blocking(move || export_report(&report, format))
        .await
        .map_err(|e| AppError::internal(format!("export task failed: {e}")))??;

    info!(
        request_id = %context.request_id,
        real_ip = ?context.real_ip,
        analysis_id = %analysis_id,
        format = %format,
        bytes = file.bytes.len(),
        "Exported analysis"
    );

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .map_err(|e| AppError::internal(format!("invalid export filename: {e}")))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(file.format.content_type()),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        file.bytes,
    )
        .into_response())
}
