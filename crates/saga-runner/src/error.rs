use std::fmt::Debug;

use thiserror::Error;

use crate::job::Operation;

/// Error reported by a single job operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JobError<E> {
    /// The operation was invoked but no implementation was ever supplied.
    ///
    /// This is a programming error, not a runtime failure of the job.
    #[error("job '{job}' has no {operation} implementation configured")]
    NotConfigured {
        /// Name of the misconfigured job.
        job: String,
        /// The operation that is missing.
        operation: Operation,
    },

    /// The job ran and reported a failure.
    #[error(transparent)]
    Failed(E),
}

impl<E> JobError<E> {
    /// Whether this is a configuration error rather than a job failure.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }

    /// The job's own error, if the job ran and failed.
    #[must_use]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            Self::NotConfigured { .. } => None,
        }
    }
}

impl<E> From<E> for JobError<E> {
    fn from(error: E) -> Self {
        Self::Failed(error)
    }
}

/// Error from a failed compensation during rollback.
#[derive(Debug, Error)]
#[error("compensation failed for job '{job}': {description}")]
pub struct CompensationError<E> {
    /// Name of the job whose compensation failed.
    pub job: String,
    /// Position of the job in the queue.
    pub index: usize,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: JobError<E>,
}

/// Every compensation failure of one rollback phase.
///
/// Handed to the runner's rollback hook; never returned from a run.
#[derive(Debug, Error)]
#[error("rollback after job '{failed_job}' failed: {} compensation(s) failed", errors.len())]
pub struct RollbackError<E: Debug> {
    /// Name of the job whose failure triggered the rollback.
    pub failed_job: String,
    /// Compensation failures, in the order the compensations ran.
    pub errors: Vec<CompensationError<E>>,
}

/// Error from a run of the job queue.
///
/// A failed run never reports a compensation failure here: the triggering
/// error is always the one surfaced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError<T: Debug, E: Debug> {
    /// A job was asked to execute without a forward action.
    ///
    /// Jobs that committed before it were rolled back.
    #[error("job '{job}' at position {index} has no {operation} implementation configured")]
    NotConfigured {
        /// Name of the misconfigured job.
        job: String,
        /// Position of the job in the queue.
        index: usize,
        /// The operation that is missing.
        operation: Operation,
        /// Results of the jobs that committed before the failure, in order.
        results: Vec<T>,
    },

    /// A job failed during the forward phase. Committed jobs were rolled back.
    #[error("job '{job}' at position {index} failed")]
    JobFailed {
        /// Name of the job that failed.
        job: String,
        /// Position of the job in the queue.
        index: usize,
        /// The error that caused the job to fail.
        #[source]
        source: E,
        /// Results of the jobs that committed before the failure, in order.
        results: Vec<T>,
    },
}

impl<T: Debug, E: Debug> RunError<T, E> {
    /// Name of the job that caused the run to fail.
    #[must_use]
    pub fn job(&self) -> &str {
        match self {
            Self::NotConfigured { job, .. } | Self::JobFailed { job, .. } => job,
        }
    }

    /// Queue position of the job that caused the run to fail.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::NotConfigured { index, .. } | Self::JobFailed { index, .. } => *index,
        }
    }

    /// Whether the run was stopped by a configuration error.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }

    /// Results accumulated before the failure.
    #[must_use]
    pub fn results(&self) -> &[T] {
        match self {
            Self::NotConfigured { results, .. } | Self::JobFailed { results, .. } => results,
        }
    }

    /// Consume the error, keeping the results accumulated before the failure.
    #[must_use]
    pub fn into_results(self) -> Vec<T> {
        match self {
            Self::NotConfigured { results, .. } | Self::JobFailed { results, .. } => results,
        }
    }

    /// The failing job's own error, if the run failed in a job.
    #[must_use]
    pub fn job_error(&self) -> Option<&E> {
        match self {
            Self::JobFailed { source, .. } => Some(source),
            Self::NotConfigured { .. } => None,
        }
    }
}
