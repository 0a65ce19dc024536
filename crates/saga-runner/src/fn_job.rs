use std::fmt;

use tracing::error;

use crate::error::JobError;
use crate::job::{Job, Operation};

/// Boxed forward action of an [`FnJob`].
pub type ExecuteFn<T, E> = Box<dyn FnMut(&[T]) -> Result<T, E> + Send>;

/// Boxed compensating action of an [`FnJob`].
pub type CompensateFn<E> = Box<dyn FnMut() -> Result<(), E> + Send>;

const DEFAULT_NAME: &str = "job";

/// Compensation that does nothing and always succeeds.
///
/// For jobs whose forward action needs no reversal, such as pure reads.
pub fn noop_compensation<E: 'static>() -> impl FnMut() -> Result<(), E> + Send + 'static {
    || Ok::<(), E>(())
}

/// Configuration for an [`FnJob`].
///
/// Every field is optional. Operations left unset fail with
/// [`JobError::NotConfigured`] when invoked.
pub struct JobConfig<T, E> {
    name: Option<String>,
    execute: Option<ExecuteFn<T, E>>,
    compensate: Option<CompensateFn<E>>,
}

impl<T, E> Default for JobConfig<T, E> {
    fn default() -> Self {
        Self {
            name: None,
            execute: None,
            compensate: None,
        }
    }
}

impl<T, E> JobConfig<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in logs, errors and the audit log.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Forward action. Receives the results of earlier jobs in the run.
    #[must_use]
    pub fn execute<F>(mut self, execute: F) -> Self
    where
        F: FnMut(&[T]) -> Result<T, E> + Send + 'static,
    {
        self.execute = Some(Box::new(execute));
        self
    }

    /// Compensating action. Runs at most once, after a successful forward action.
    #[must_use]
    pub fn compensate<F>(mut self, compensate: F) -> Self
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
    {
        self.compensate = Some(Box::new(compensate));
        self
    }
}

/// A job assembled from closures.
pub struct FnJob<T, E> {
    name: String,
    execute: Option<ExecuteFn<T, E>>,
    compensate: Option<CompensateFn<E>>,
}

impl<T, E> FnJob<T, E> {
    #[must_use]
    pub fn new(config: JobConfig<T, E>) -> Self {
        Self {
            name: config.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            execute: config.execute,
            compensate: config.compensate,
        }
    }

    /// Build a fully configured job in one call.
    #[must_use]
    pub fn from_fns<X, C>(name: impl Into<String>, execute: X, compensate: C) -> Self
    where
        X: FnMut(&[T]) -> Result<T, E> + Send + 'static,
        C: FnMut() -> Result<(), E> + Send + 'static,
    {
        Self::new(
            JobConfig::new()
                .name(name)
                .execute(execute)
                .compensate(compensate),
        )
    }

    /// A job with neither operation supplied.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::new(JobConfig::default())
    }

    /// Replace the compensation with a no-op that always succeeds.
    pub fn disable_rollback(&mut self) -> &mut Self
    where
        E: 'static,
    {
        self.compensate = Some(Box::new(noop_compensation()));
        self
    }

    /// Consuming form of [`disable_rollback`](Self::disable_rollback).
    #[must_use]
    pub fn without_rollback(mut self) -> Self
    where
        E: 'static,
    {
        self.disable_rollback();
        self
    }

    fn not_configured(&self, operation: Operation) -> JobError<E> {
        error!(job = %self.name, %operation, "job operation invoked without an implementation");
        JobError::NotConfigured {
            job: self.name.clone(),
            operation,
        }
    }
}

impl<T, E> Default for FnJob<T, E> {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl<T, E> fmt::Debug for FnJob<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnJob")
            .field("name", &self.name)
            .field("execute", &self.execute.is_some())
            .field("compensate", &self.compensate.is_some())
            .finish()
    }
}

impl<T, E> Job for FnJob<T, E> {
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, results: &[T]) -> Result<T, JobError<E>> {
        let Some(execute) = self.execute.as_mut() else {
            return Err(self.not_configured(Operation::Execute));
        };
        execute(results).map_err(JobError::Failed)
    }

    fn compensate(&mut self) -> Result<(), JobError<E>> {
        let Some(compensate) = self.compensate.as_mut() else {
            return Err(self.not_configured(Operation::Compensate));
        };
        compensate().map_err(JobError::Failed)
    }

    fn unconfigured(&self) -> Option<Operation> {
        self.execute.is_none().then_some(Operation::Execute)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestError(String);

    #[test]
    fn configured_job_runs_both_operations() {
        let mut job: FnJob<String, TestError> = FnJob::from_fns(
            "greet",
            |_| Ok("str exec".to_string()),
            || Ok(()),
        );

        assert!(matches!(job.execute(&[]), Ok(ref s) if s == "str exec"));
        assert!(job.compensate().is_ok());
        assert_eq!(job.unconfigured(), None);
    }

    #[test]
    fn unconfigured_job_fails_distinctly_on_both_operations() {
        let mut job: FnJob<i32, TestError> = FnJob::default();

        let exec_err = job.execute(&[]).expect_err("execute is not configured");
        assert!(exec_err.is_not_configured());
        assert!(matches!(
            exec_err,
            JobError::NotConfigured { operation: Operation::Execute, ref job } if job == "job"
        ));

        let comp_err = job.compensate().expect_err("compensate is not configured");
        assert!(matches!(
            comp_err,
            JobError::NotConfigured {
                operation: Operation::Compensate,
                ..
            }
        ));
    }

    #[test]
    fn job_failure_is_not_a_configuration_error() {
        let mut job: FnJob<i32, TestError> = FnJob::new(
            JobConfig::new()
                .name("flaky")
                .execute(|_| Err(TestError("timeout".to_string()))),
        );

        let err = job.execute(&[]).expect_err("execute should fail");

        assert!(!err.is_not_configured());
        assert_eq!(err.into_failure(), Some(TestError("timeout".to_string())));
    }

    #[test]
    fn unconfigured_reports_only_a_missing_execute() {
        let nothing: FnJob<i32, TestError> = FnJob::unconfigured();
        let exec_only: FnJob<i32, TestError> = FnJob::new(JobConfig::new().execute(|_| Ok(1)));

        assert_eq!(nothing.unconfigured(), Some(Operation::Execute));
        assert_eq!(exec_only.unconfigured(), None);
    }

    #[test]
    fn disable_rollback_makes_compensation_a_silent_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut job: FnJob<i32, TestError> = FnJob::from_fns(
            "read",
            |_| Ok(1),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TestError("should not run".to_string()))
            },
        );

        job.disable_rollback();

        assert!(job.compensate().is_ok());
        assert!(job.compensate().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn without_rollback_completes_configuration() {
        let job: FnJob<i32, TestError> =
            FnJob::new(JobConfig::new().execute(|_| Ok(1))).without_rollback();

        assert_eq!(job.unconfigured(), None);
    }

    #[test]
    fn noop_compensation_succeeds() {
        let mut noop = noop_compensation::<TestError>();

        assert_eq!(noop(), Ok(()));
    }

    #[test]
    fn debug_shows_configured_operations() {
        let job: FnJob<i32, TestError> = FnJob::new(JobConfig::new().name("x").execute(|_| Ok(1)));

        assert_eq!(
            format!("{job:?}"),
            r#"FnJob { name: "x", execute: true, compensate: false }"#
        );
    }
}
