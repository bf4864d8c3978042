//! # Scrutin Core
//!
//! Core library for the Scrutin election lifecycle orchestrator: the ledger
//! gateway client, the off-chain Postgres mirror, and the lifecycle engine
//! that drives elections from voting close through on-chain completion,
//! result archival and teardown.
//!
//! ## Overview
//!
//! - **Ledger gateway**: typed client for the on-chain side (vote counts,
//!   completion flag, voter activation), authoritative and append-only
//! - **Off-chain mirror**: election registry, candidate/voter rosters and the
//!   immutable results archive in Postgres
//! - **Lifecycle engine**: timer-driven sweeps plus admin-triggered publish,
//!   all funnelling through one archival procedure whose commit point is the
//!   archive write
//!
//! The ordering invariant the whole crate is built around: voting closes,
//! completion is confirmed on the ledger, the archive is written, and only
//! then is mutable working state deleted.
//!
//! ## Examples
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use scrutin_core::lifecycle::{LifecycleScheduler, LifecycleService, SweepSettings};
//!
//! async fn run_sweeps(service: Arc<LifecycleService>) -> scrutin_core::Result<()> {
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel(1);
//!     let settings = SweepSettings {
//!         completion_interval: Duration::from_secs(60),
//!         archival_interval: Duration::from_secs(30),
//!         auto_complete: true,
//!         auto_archive: true,
//!     };
//!     let scheduler = Arc::new(LifecycleScheduler::new(service, settings, shutdown_rx));
//!     let handle = tokio::spawn(scheduler.run());
//!
//!     // ... later, on shutdown:
//!     shutdown_tx.send(()).await.ok();
//!     handle.await.map_err(|e| {
//!         scrutin_core::ElectionError::Internal(format!("scheduler task panicked: {e}"))
//!     })?
//! }
//! ```

#![allow(missing_docs)]

/// Response envelope and view types shared with the HTTP surface
pub mod api;

/// Postgres mirror: pool management, migrations and repositories
pub mod database;

/// Error types and error handling utilities
pub mod error;

/// Ledger gateway client trait and HTTP implementation
pub mod ledger;

/// Lifecycle orchestration: sweeps, archival procedure, publish and reset
pub mod lifecycle;

/// Uploaded candidate media storage
pub mod uploads;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{ElectionError, Result};
