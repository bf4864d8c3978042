use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use scrutin_core::api::{ApiResponse, ResultsView};
use scrutin_model::{ArchiveId, ArchivedElection, Candidate};

use super::parse_ledger_id;
use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

pub async fn list_archived(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ArchivedElection>>>> {
    let archives = state.archives.list_recent().await?;
    Ok(Json(ApiResponse::success(archives)))
}

pub async fn latest_archived(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ArchivedElection>>> {
    let archive = state
        .archives
        .latest()
        .await?
        .ok_or_else(|| AppError::not_found("no archived elections yet"))?;

    Ok(Json(ApiResponse::success(archive)))
}

pub async fn archived_by_id(
    State(state): State<AppState>,
    Path(archive_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ArchivedElection>>> {
    let archive = state
        .archives
        .find_by_id(ArchiveId::from(archive_id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("no archive with id {archive_id}")))?;

    Ok(Json(ApiResponse::success(archive)))
}

/// Archived-first results lookup: an existing archive always wins; otherwise
/// results are computed live from the roster, but only once voting closed.
pub async fn results_for_election(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<ResultsView>>> {
    let ledger_id = parse_ledger_id(&raw_id)?;

    if let Some(archive) = state.archives.find_by_ledger_id(ledger_id).await? {
        return Ok(Json(ApiResponse::success(ResultsView::from_archive(
            archive,
        ))));
    }

    let election = state
        .elections
        .find_by_ledger_id(ledger_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no results for ledger id {ledger_id}")))?;

    if !election.windows.voting_closed(Utc::now()) {
        return Err(AppError::forbidden(
            "results are not available until voting has closed",
        ));
    }

    let results = state.lifecycle.compute_results(ledger_id).await?;

    Ok(Json(ApiResponse::success(ResultsView::live(
        ledger_id,
        election.title,
        results,
    ))))
}

#[derive(Debug, Deserialize)]
pub struct ApprovedQuery {
    pub position: String,
}

pub async fn approved_candidates(
    State(state): State<AppState>,
    Query(query): Query<ApprovedQuery>,
) -> AppResult<Json<ApiResponse<Vec<Candidate>>>> {
    let candidates = state
        .candidates
        .approved_for_position(&query.position)
        .await?;

    Ok(Json(ApiResponse::success(candidates)))
}
