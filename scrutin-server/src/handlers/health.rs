use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

pub async fn ping_handler() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "ok",
        "message": "Scrutin election orchestrator is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let mut is_unhealthy = false;

    // Check database connectivity through the archive store
    match state.archives.latest().await {
        Ok(latest) => {
            health_status["checks"]["database"] = json!({
                "status": "healthy",
                "latest_archive_at": latest.map(|a| a.archived_at.to_rfc3339()),
            });
        }
        Err(e) => {
            health_status["checks"]["database"] = json!({
                "status": "unhealthy",
                "error": e.to_string()
            });
            is_unhealthy = true;
        }
    }

    // Check ledger gateway reachability
    let gateway = state.ledger.status().await;
    if gateway.connected {
        health_status["checks"]["ledger_gateway"] = json!({
            "status": "healthy",
            "contract": gateway.contract_ref,
        });
    } else {
        health_status["checks"]["ledger_gateway"] = json!({
            "status": "unhealthy"
        });
        is_unhealthy = true;
    }

    if is_unhealthy {
        health_status["status"] = json!("unhealthy");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    } else {
        Ok(Json(health_status))
    }
}
