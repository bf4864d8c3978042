//! Admin HTTP surface for the scrutin election orchestrator.
//!
//! The binary wires the Postgres mirror, the ledger gateway client and the
//! lifecycle scheduler from `scrutin-core`, then serves the admin API built
//! here. Everything handlers need travels in [`AppState`]; the router is
//! assembled by [`routes::create_app`].

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
