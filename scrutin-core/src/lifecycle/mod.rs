//! Election lifecycle orchestration: result computation, the retirement
//! service and the timer-driven sweeps that feed it.

mod results;
mod scheduler;
mod service;

pub use results::{compute_roster_results, results_from_summary};
pub use scheduler::{LifecycleScheduler, SweepSettings};
pub use service::{CompletionStatus, LifecycleService, ResetReport};
