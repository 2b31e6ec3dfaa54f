use chrono::{DateTime, Utc};
use serde::Serialize;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Complete,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// Point-in-time copy of a tracked job. Mutating it never touches the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot<R> {
    pub id: JobId,
    pub job_type: String,
    pub total: usize,
    pub current: usize,
    pub phase: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub result: Option<R>,
}

impl<R> JobSnapshot<R> {
    pub fn view(&self) -> ProgressView {
        ProgressView {
            id: self.id,
            job_type: self.job_type.clone(),
            total: self.total,
            current: self.current,
            phase: self.phase.clone(),
            status: self.status,
        }
    }
}

/// What progress-polling callers receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub id: JobId,
    #[serde(rename = "type")]
    pub job_type: String,
    pub total: usize,
    pub current: usize,
    pub phase: String,
    pub status: JobStatus,
}

impl ProgressView {
    /// Whole-number percentage, 100 for an empty batch.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.current.min(self.total) * 100) / self.total) as u8
    }
}
