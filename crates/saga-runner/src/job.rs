use std::fmt;

use crate::error::JobError;

/// The two operations every job exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// The forward action.
    Execute,
    /// The compensating action.
    Compensate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execute => f.write_str("execute"),
            Self::Compensate => f.write_str("compensate"),
        }
    }
}

/// A reversible unit of work run by a [`Runner`](crate::Runner).
///
/// Jobs are passive: they know nothing about their position in the queue or
/// about other jobs. The runner calls `execute` at most once per run and
/// calls `compensate` only after `execute` succeeded for the same run.
///
/// # Type Parameters
///
/// - `Output`: Result produced by a successful `execute`
/// - `Error`: The error type for job failures
pub trait Job: Send {
    /// Result produced by the forward action.
    type Output;

    /// Error type for job failures.
    type Error;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &str {
        "job"
    }

    /// Perform the forward action.
    ///
    /// `results` holds the results of every job that committed earlier in
    /// this run, in queue order.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Failed` if the action fails, or
    /// `JobError::NotConfigured` if the job has no forward action.
    fn execute(
        &mut self,
        results: &[Self::Output],
    ) -> Result<Self::Output, JobError<Self::Error>>;

    /// Reverse the effects of a successful `execute`.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Failed` if the compensation fails, or
    /// `JobError::NotConfigured` if the job has no compensation.
    fn compensate(&mut self) -> Result<(), JobError<Self::Error>>;

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }

    /// The first operation this job cannot perform, if any.
    ///
    /// The runner refuses to start when a queued job reports
    /// [`Operation::Execute`]. A missing compensation is only an error if
    /// rollback reaches this job.
    fn unconfigured(&self) -> Option<Operation> {
        None
    }
}

impl<J> Job for Box<J>
where
    J: Job + ?Sized,
{
    type Output = J::Output;
    type Error = J::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(
        &mut self,
        results: &[Self::Output],
    ) -> Result<Self::Output, JobError<Self::Error>> {
        (**self).execute(results)
    }

    fn compensate(&mut self) -> Result<(), JobError<Self::Error>> {
        (**self).compensate()
    }

    fn compensation_description(&self) -> String {
        (**self).compensation_description()
    }

    fn unconfigured(&self) -> Option<Operation> {
        (**self).unconfigured()
    }
}
