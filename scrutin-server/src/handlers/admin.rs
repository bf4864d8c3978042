use axum::{Json, extract::State};
use tracing::info;

use scrutin_core::api::ApiResponse;
use scrutin_core::lifecycle::ResetReport;

use crate::errors::AppResult;
use crate::infra::app_state::AppState;

/// Wipes the working state for the next cycle. Archives are never touched.
pub async fn reset(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ResetReport>>> {
    let report = state.lifecycle.reset().await?;

    info!(
        "Admin reset via API: {} elections, {} candidates, {} voters removed",
        report.elections_deleted, report.candidates_deleted, report.voters_deleted
    );

    Ok(Json(
        ApiResponse::success(report)
            .with_message("working state cleared; archives untouched".to_string()),
    ))
}
