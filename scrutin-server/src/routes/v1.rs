use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::handlers::{admin, elections, results};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .merge(create_election_routes())
        .merge(create_results_routes())
        .merge(create_admin_routes())
}

fn create_election_routes() -> Router<AppState> {
    Router::new()
        .route("/elections", post(elections::create_election))
        .route(
            "/elections/current",
            get(elections::current_election).delete(elections::delete_current_election),
        )
        .route(
            "/elections/complete/{ledger_election_id}",
            post(elections::complete_election),
        )
        .route(
            "/elections/archive/{ledger_election_id}",
            post(elections::archive_election),
        )
        .route(
            "/elections/publish/{ledger_election_id}",
            post(elections::publish_election),
        )
}

fn create_results_routes() -> Router<AppState> {
    Router::new()
        .route("/results/archived", get(results::list_archived))
        .route("/results/latest", get(results::latest_archived))
        .route("/results/archived/{archive_id}", get(results::archived_by_id))
        .route(
            "/results/{ledger_election_id}",
            get(results::results_for_election),
        )
        .route("/candidates/approved", get(results::approved_candidates))
}

fn create_admin_routes() -> Router<AppState> {
    Router::new().route("/admin/reset", post(admin::reset))
}
