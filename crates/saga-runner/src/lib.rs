//! Sequential job runner with compensating rollback.
//!
//! A [`Runner`] executes an ordered queue of reversible jobs one at a time.
//! Each job sees the results of the jobs that ran before it. If a job fails,
//! every job that already committed is compensated in reverse commit order,
//! and the caller receives the original failure together with the partial
//! results. Failures during compensation are routed to a rollback hook and
//! never replace the original error.

mod audit;
mod config;
mod error;
mod fn_job;
mod job;
mod runner;

pub use audit::{JobRecord, JobStatus, RunAuditLog};
pub use config::{RollbackHook, RunnerConfig};
pub use error::{CompensationError, JobError, RollbackError, RunError};
pub use fn_job::{CompensateFn, ExecuteFn, FnJob, JobConfig, noop_compensation};
pub use job::{Job, Operation};
pub use runner::Runner;
