use std::time::Instant;

/// Status of a job in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum JobStatus {
    /// Job executed successfully and is committed.
    Executed,
    /// Job failed during execution.
    Failed,
    /// Job was compensated successfully.
    Compensated,
    /// Job compensation failed.
    CompensationFailed,
    /// Job was rejected before the run because an operation is missing.
    NotConfigured,
}

/// Record of a job's execution in a run.
#[derive(Debug)]
pub struct JobRecord {
    /// Position of the job in the queue.
    pub index: usize,
    /// Name of the job.
    pub name: String,
    /// Current status.
    pub status: JobStatus,
    /// When the job started executing.
    pub started_at: Instant,
    /// When the job completed (execution or compensation).
    pub completed_at: Option<Instant>,
    /// Description of compensation (if the job committed).
    pub compensation_description: Option<String>,
}

/// Audit log tracking every job execution and compensation in a run.
#[derive(Debug, Default)]
pub struct RunAuditLog {
    records: Vec<JobRecord>,
}

impl RunAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, index: usize, name: &str) {
        self.records.push(JobRecord {
            index,
            name: name.to_string(),
            status: JobStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
        });
    }

    pub(crate) fn record_success(&mut self, compensation_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = JobStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.compensation_description = Some(compensation_description);
        }
    }

    pub(crate) fn record_failure(&mut self) {
        self.finish_last(JobStatus::Failed);
    }

    pub(crate) fn record_not_configured(&mut self, index: usize, name: &str) {
        self.record_start(index, name);
        self.finish_last(JobStatus::NotConfigured);
    }

    pub(crate) fn record_compensated(&mut self, index: usize) {
        self.finish(index, JobStatus::Compensated);
    }

    pub(crate) fn record_compensation_failed(&mut self, index: usize) {
        self.finish(index, JobStatus::CompensationFailed);
    }

    fn finish_last(&mut self, status: JobStatus) {
        if let Some(record) = self.records.last_mut() {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    fn finish(&mut self, index: usize, status: JobStatus) {
        if let Some(record) = self.records.iter_mut().find(|r| r.index == index) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the audit log, in execution order.
    #[must_use]
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    /// Get the record of the job at a queue position.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.index == index)
    }

    /// Get a summary of the run for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                JobStatus::Executed => "✓",
                JobStatus::Failed => "✗",
                JobStatus::Compensated => "↩",
                JobStatus::CompensationFailed => "⚠",
                JobStatus::NotConfigured => "?",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_audit_log_is_empty() {
        let log = RunAuditLog::new();
        assert!(log.records().is_empty());
        assert!(log.summary().is_empty());
    }

    #[test]
    fn record_start_adds_job_with_executed_status() {
        let mut log = RunAuditLog::new();
        log.record_start(0, "fetch");

        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].index, 0);
        assert_eq!(log.records()[0].name, "fetch");
        assert_eq!(log.records()[0].status, JobStatus::Executed);
        assert!(log.records()[0].completed_at.is_none());
    }

    #[test]
    fn record_success_stores_compensation_description() {
        let mut log = RunAuditLog::new();
        log.record_start(0, "fetch");
        log.record_success("undo fetch".to_string());

        assert!(log.records()[0].completed_at.is_some());
        assert_eq!(
            log.records()[0].compensation_description.as_deref(),
            Some("undo fetch")
        );
    }

    #[test]
    fn record_failure_updates_last_job() {
        let mut log = RunAuditLog::new();
        log.record_start(0, "a");
        log.record_success("undo a".to_string());
        log.record_start(1, "b");
        log.record_failure();

        assert_eq!(log.records()[0].status, JobStatus::Executed);
        assert_eq!(log.records()[1].status, JobStatus::Failed);
        assert!(log.records()[1].compensation_description.is_none());
    }

    #[test]
    fn compensation_is_tracked_by_index_not_name() {
        let mut log = RunAuditLog::new();
        log.record_start(0, "copy");
        log.record_success("undo copy".to_string());
        log.record_start(1, "copy");
        log.record_success("undo copy".to_string());

        log.record_compensated(1);
        log.record_compensation_failed(0);

        assert_eq!(log.records()[0].status, JobStatus::CompensationFailed);
        assert_eq!(log.records()[1].status, JobStatus::Compensated);
    }

    #[test]
    fn record_not_configured_is_complete_immediately() {
        let mut log = RunAuditLog::new();
        log.record_not_configured(3, "broken");

        let record = log.record(3).expect("record for index 3");
        assert_eq!(record.status, JobStatus::NotConfigured);
        assert!(record.completed_at.is_some());
        assert!(log.record(0).is_none());
    }

    #[test]
    fn summary_shows_every_status() {
        let mut log = RunAuditLog::new();
        log.record_start(0, "compensated");
        log.record_success("undo".to_string());
        log.record_compensated(0);
        log.record_start(1, "comp_failed");
        log.record_success("undo".to_string());
        log.record_compensation_failed(1);
        log.record_start(2, "failed");
        log.record_failure();
        log.record_start(3, "executed");
        log.record_success("undo".to_string());

        assert_eq!(
            log.summary(),
            "↩ compensated\n⚠ comp_failed\n✗ failed\n✓ executed"
        );
    }
}
