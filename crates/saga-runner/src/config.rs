use std::fmt::{self, Debug};

use tracing::warn;

use crate::error::RollbackError;

/// Observer for compensation failures during rollback.
///
/// Invoked once per failed run when at least one compensation failed.
/// The run completes once the hook returns.
pub type RollbackHook<E> = Box<dyn FnMut(RollbackError<E>) + Send>;

/// Runner configuration.
pub struct RunnerConfig<E: Debug> {
    on_rollback_error: Option<RollbackHook<E>>,
}

impl<E: Debug> Default for RunnerConfig<E> {
    fn default() -> Self {
        Self {
            on_rollback_error: None,
        }
    }
}

impl<E: Debug> RunnerConfig<E> {
    /// Create a configuration that uses the default rollback hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default rollback hook, which only logs.
    #[must_use]
    pub fn on_rollback_error<F>(mut self, hook: F) -> Self
    where
        F: FnMut(RollbackError<E>) + Send + 'static,
    {
        self.on_rollback_error = Some(Box::new(hook));
        self
    }

    pub(crate) fn into_hook(self) -> RollbackHook<E>
    where
        E: 'static,
    {
        match self.on_rollback_error {
            Some(hook) => hook,
            None => Box::new(log_rollback_error::<E>),
        }
    }
}

impl<E: Debug> fmt::Debug for RunnerConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("on_rollback_error", &self.on_rollback_error.is_some())
            .finish()
    }
}

/// Default hook: forward the failure to the log and drop it.
pub(crate) fn log_rollback_error<E: Debug>(error: RollbackError<E>) {
    for failure in &error.errors {
        warn!(
            failed_job = %error.failed_job,
            job = %failure.job,
            index = failure.index,
            description = %failure.description,
            error = ?failure.error,
            "compensation failed during rollback"
        );
    }
}
