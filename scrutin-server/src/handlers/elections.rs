use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use scrutin_core::api::ApiResponse;
use scrutin_model::{ArchivedElection, Election, ElectionWindows, LedgerReceipt};

use super::parse_ledger_id;
use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectionRequest {
    pub title: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub voting_start: DateTime<Utc>,
    pub voting_end: DateTime<Utc>,
}

pub async fn create_election(
    State(state): State<AppState>,
    Json(request): Json<CreateElectionRequest>,
) -> AppResult<Json<ApiResponse<Election>>> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }

    let windows = ElectionWindows {
        registration_start: request.registration_start,
        registration_end: request.registration_end,
        voting_start: request.voting_start,
        voting_end: request.voting_end,
    };

    let election = state.lifecycle.create_election(title, windows).await?;

    info!(
        "Registered election '{}' via API (ledger id {:?})",
        election.title, election.ledger_election_id
    );

    Ok(Json(ApiResponse::success(election)))
}

pub async fn current_election(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Election>>> {
    let election = state
        .lifecycle
        .current_election()
        .await?
        .ok_or_else(|| AppError::not_found("no election is currently registered"))?;

    Ok(Json(ApiResponse::success(election)))
}

pub async fn delete_current_election(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Election>>> {
    let removed = state.lifecycle.delete_current().await?;

    info!("Deleted election '{}' via API", removed.title);

    Ok(Json(
        ApiResponse::success(removed)
            .with_message("election and candidate roster removed".to_string()),
    ))
}

pub async fn complete_election(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<LedgerReceipt>>> {
    let ledger_id = parse_ledger_id(&raw_id)?;
    let receipt = state.lifecycle.complete_now(ledger_id).await?;

    Ok(Json(ApiResponse::success(receipt)))
}

pub async fn archive_election(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<ArchivedElection>>> {
    let ledger_id = parse_ledger_id(&raw_id)?;

    // Manual archival addresses a known registry record; publish is the
    // endpoint that tolerates a missing one.
    state
        .elections
        .find_by_ledger_id(ledger_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("no election registered with ledger id {ledger_id}"))
        })?;

    let archive = state.lifecycle.archive_and_retire(ledger_id).await?;

    Ok(Json(ApiResponse::success(archive)))
}

pub async fn publish_election(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<ArchivedElection>>> {
    let ledger_id = parse_ledger_id(&raw_id)?;
    let archive = state.lifecycle.publish(ledger_id).await?;

    Ok(Json(
        ApiResponse::success(archive)
            .with_message("results published and voters deactivated".to_string()),
    ))
}
