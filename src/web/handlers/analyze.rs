//! Trademark analysis endpoint

use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use crate::analysis::{AnalysisReport, AnalyzeRequest};
use crate::errors::AppError;
use crate::web::{
    AppState,
    extractors::{AppJson, RequestContext},
};

/// `POST /api/analyze`
///
/// Compares the desired trademark with every registered one. Individual
/// comparison failures are reported inside the results, so this only fails
/// for malformed requests.
pub async fn analyze_trademarks(
    State(state): State<AppState>,
    context: RequestContext,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<Arc<AnalysisReport>>, AppError> {
    info!(
        request_id = %context.request_id,
        real_ip = ?context.real_ip,
        user_agent = ?context.user_agent,
        pairs = request.existing_trademarks.len(),
        "Analysis requested for '{}'",
        request.desired_trademark.name
    );

    let report = state.analysis.analyze(request).await?;
    Ok(Json(report))
}
