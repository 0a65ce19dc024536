use std::fmt::{self, Debug};

use tracing::{debug, error, warn};

use crate::audit::RunAuditLog;
use crate::config::{RollbackHook, RunnerConfig};
use crate::error::{CompensationError, JobError, RollbackError, RunError};
use crate::job::{Job, Operation};

type BoxedJob<T, E> = Box<dyn Job<Output = T, Error = E>>;

/// Sequential executer of reversible jobs.
///
/// Jobs run one at a time in queue order, each receiving the results of the
/// jobs before it. If a job fails, every committed job is compensated in
/// reverse commit order (LIFO) and the run reports the original failure.
pub struct Runner<T, E: Debug> {
    queue: Vec<BoxedJob<T, E>>,
    on_rollback_error: RollbackHook<E>,
}

impl<T, E> Runner<T, E>
where
    T: Debug + 'static,
    E: Debug + 'static,
{
    /// Create a runner with an empty queue and the default rollback hook.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with an empty queue and the given configuration.
    #[must_use]
    pub fn with_config(config: RunnerConfig<E>) -> Self {
        Self {
            queue: Vec::new(),
            on_rollback_error: config.into_hook(),
        }
    }

    /// Create a runner seeded with jobs, in order.
    #[must_use]
    pub fn from_jobs<I>(jobs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Job<Output = T, Error = E> + 'static,
    {
        Self::new().enqueue_all(jobs)
    }

    /// Create a runner seeded with jobs, in order, and the given configuration.
    #[must_use]
    pub fn from_jobs_with_config<I>(jobs: I, config: RunnerConfig<E>) -> Self
    where
        I: IntoIterator,
        I::Item: Job<Output = T, Error = E> + 'static,
    {
        Self::with_config(config).enqueue_all(jobs)
    }

    /// Append a job to the tail of the queue.
    #[must_use]
    pub fn enqueue<J>(mut self, job: J) -> Self
    where
        J: Job<Output = T, Error = E> + 'static,
    {
        self.queue.push(Box::new(job));
        self
    }

    /// Append jobs to the tail of the queue, preserving their order.
    #[must_use]
    pub fn enqueue_all<I>(mut self, jobs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Job<Output = T, Error = E> + 'static,
    {
        self.queue
            .extend(jobs.into_iter().map(|job| Box::new(job) as BoxedJob<T, E>));
        self
    }

    /// Replace the hook that observes compensation failures.
    #[must_use]
    pub fn set_error_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(RollbackError<E>) + Send + 'static,
    {
        self.on_rollback_error = Box::new(hook);
        self
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Names of the queued jobs, in execution order.
    #[must_use]
    pub fn job_names(&self) -> Vec<&str> {
        self.queue.iter().map(|job| job.name()).collect()
    }

    /// Run every queued job, returning their results in order.
    ///
    /// On failure, compensates all committed jobs in reverse order before
    /// returning. Compensation failures go to the rollback hook and never
    /// replace the original error.
    ///
    /// # Errors
    ///
    /// Returns `RunError::JobFailed` if a job fails, carrying the results
    /// accumulated before the failure.
    /// Returns `RunError::NotConfigured` if a queued job has no forward
    /// action; when found up front, no job is executed. A missing
    /// compensation is not an error here: it only surfaces if that
    /// compensation is needed, and then goes to the rollback hook.
    pub fn run(&mut self) -> Result<Vec<T>, RunError<T, E>> {
        let (result, _audit_log) = self.run_internal();
        result
    }

    /// Run every queued job and return both the result and an audit log.
    pub fn run_with_audit(&mut self) -> (Result<Vec<T>, RunError<T, E>>, RunAuditLog) {
        self.run_internal()
    }

    fn run_internal(&mut self) -> (Result<Vec<T>, RunError<T, E>>, RunAuditLog) {
        let mut audit_log = RunAuditLog::new();

        if let Err(err) = self.preflight(&mut audit_log) {
            return (Err(err), audit_log);
        }

        let mut results: Vec<T> = Vec::with_capacity(self.queue.len());
        let mut committed: Vec<usize> = Vec::with_capacity(self.queue.len());
        let mut failure = None;

        for (index, job) in self.queue.iter_mut().enumerate() {
            audit_log.record_start(index, job.name());
            debug!(job = job.name(), index, "executing job");

            match job.execute(&results) {
                Ok(result) => {
                    audit_log.record_success(job.compensation_description());
                    results.push(result);
                    committed.push(index);
                }
                Err(error) => {
                    audit_log.record_failure();
                    failure = Some((index, job.name().to_string(), error));
                    break;
                }
            }
        }

        let Some((index, job, error)) = failure else {
            debug!(count = results.len(), "all jobs committed");
            return (Ok(results), audit_log);
        };

        warn!(
            job = %job,
            index,
            error = ?error,
            committed = committed.len(),
            "job failed, rolling back committed jobs"
        );
        self.rollback(&mut audit_log, committed, &job);

        let err = match error {
            JobError::Failed(source) => RunError::JobFailed {
                job,
                index,
                source,
                results,
            },
            JobError::NotConfigured { operation, .. } => RunError::NotConfigured {
                job,
                index,
                operation,
                results,
            },
        };
        (Err(err), audit_log)
    }

    fn preflight(&self, audit_log: &mut RunAuditLog) -> Result<(), RunError<T, E>> {
        for (index, job) in self.queue.iter().enumerate() {
            if let Some(operation @ Operation::Execute) = job.unconfigured() {
                error!(
                    job = job.name(),
                    index,
                    %operation,
                    "queued job has no implementation, nothing was executed"
                );
                audit_log.record_not_configured(index, job.name());
                return Err(RunError::NotConfigured {
                    job: job.name().to_string(),
                    index,
                    operation,
                    results: Vec::new(),
                });
            }
        }
        Ok(())
    }

    fn rollback(&mut self, audit_log: &mut RunAuditLog, committed: Vec<usize>, failed_job: &str) {
        let mut errors = Vec::new();

        for index in committed.into_iter().rev() {
            let job = &mut self.queue[index];
            let description = job.compensation_description();
            debug!(job = job.name(), index, %description, "compensating job");

            match job.compensate() {
                Ok(()) => audit_log.record_compensated(index),
                Err(error) => {
                    if error.is_not_configured() {
                        error!(
                            job = job.name(),
                            index,
                            "committed job has no compensation, its effects remain"
                        );
                    } else {
                        debug!(job = job.name(), index, error = ?error, "compensation failed");
                    }
                    audit_log.record_compensation_failed(index);
                    errors.push(CompensationError {
                        job: job.name().to_string(),
                        index,
                        description,
                        error,
                    });
                }
            }
        }

        if !errors.is_empty() {
            (self.on_rollback_error)(RollbackError {
                failed_job: failed_job.to_string(),
                errors,
            });
        }
    }
}

impl<T, E> Default for Runner<T, E>
where
    T: Debug + 'static,
    E: Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E: Debug> fmt::Debug for Runner<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field(
                "queue",
                &self.queue.iter().map(|job| job.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
