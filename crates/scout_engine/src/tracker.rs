use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use scout_core::{JobId, JobSnapshot, JobStatus};
use scout_logging::{scout_debug, scout_info};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Jobs older than this are cancelled and forgotten, whatever their status.
    pub retention: Duration,
    pub cleanup_period: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(15 * 60),
            cleanup_period: Duration::from_secs(60),
        }
    }
}

const MIN_CLEANUP_PERIOD: Duration = Duration::from_millis(1);

struct TrackedJob<R> {
    job: JobSnapshot<R>,
    cancel: CancellationToken,
    started: Instant,
}

/// Registry of in-flight batches.
///
/// Every job gets a child of the tracker's own token, so dropping or shutting
/// down the tracker cancels all of them. Unknown ids are ignored by the
/// mutating calls so late progress events after cleanup are harmless.
pub struct JobTracker<R> {
    jobs: RwLock<HashMap<JobId, TrackedJob<R>>>,
    next_id: AtomicU64,
    root: CancellationToken,
    retention: Duration,
}

impl<R: Clone> JobTracker<R> {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            root: CancellationToken::new(),
            retention,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, TrackedJob<R>>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, TrackedJob<R>>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_job(&self, job_type: &str, total: usize) -> (JobId, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = self.root.child_token();
        let job = JobSnapshot {
            id,
            job_type: job_type.to_string(),
            total,
            current: 0,
            phase: String::new(),
            status: JobStatus::Running,
            created_at: Utc::now(),
            result: None,
        };
        self.write().insert(
            id,
            TrackedJob {
                job,
                cancel: cancel.clone(),
                started: Instant::now(),
            },
        );
        scout_info!("job {} created type={} total={}", id, job_type, total);
        (id, cancel)
    }

    /// Moves a running job forward. An empty `phase` keeps the previous label.
    pub fn update_progress(&self, id: JobId, current: usize, phase: &str) {
        let mut jobs = self.write();
        let Some(tracked) = jobs.get_mut(&id) else {
            return;
        };
        let job = &mut tracked.job;
        if job.status != JobStatus::Running {
            return;
        }
        job.current = current.min(job.total);
        if !phase.is_empty() {
            job.phase = phase.to_string();
        }
    }

    /// Terminal jobs (complete or cancelled) are left untouched.
    pub fn mark_complete(&self, id: JobId, result: R) {
        let mut jobs = self.write();
        let Some(tracked) = jobs.get_mut(&id) else {
            return;
        };
        let job = &mut tracked.job;
        if job.status.is_terminal() {
            scout_debug!("job {} already {:?}; completion ignored", id, job.status);
            return;
        }
        job.status = JobStatus::Complete;
        job.current = job.total;
        job.phase.clear();
        job.result = Some(result);
        scout_info!("job {} complete", id);
    }

    /// Returns true only for the call that actually cancelled a running job.
    pub fn cancel_job(&self, id: JobId) -> bool {
        let mut jobs = self.write();
        let Some(tracked) = jobs.get_mut(&id) else {
            return false;
        };
        if tracked.job.status.is_terminal() {
            return false;
        }
        tracked.cancel.cancel();
        tracked.job.status = JobStatus::Cancelled;
        scout_info!("job {} cancelled at {}/{}", id, tracked.job.current, tracked.job.total);
        true
    }

    pub fn get_progress(&self, id: JobId) -> Option<JobSnapshot<R>> {
        self.read().get(&id).map(|tracked| tracked.job.clone())
    }

    /// Cancels and removes every job older than the retention window.
    pub fn cleanup_old_jobs(&self) -> usize {
        let mut jobs = self.write();
        let before = jobs.len();
        jobs.retain(|id, tracked| {
            if tracked.started.elapsed() <= self.retention {
                return true;
            }
            tracked.cancel.cancel();
            scout_debug!("job {} expired with status {:?}", id, tracked.job.status);
            false
        });
        before - jobs.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Cancels every job. Jobs stay queryable until cleanup removes them.
    pub fn shutdown(&self) {
        let mut jobs = self.write();
        for tracked in jobs.values_mut() {
            if tracked.job.status == JobStatus::Running {
                tracked.job.status = JobStatus::Cancelled;
            }
        }
        self.root.cancel();
    }
}

impl<R> Drop for JobTracker<R> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Runs [`JobTracker::cleanup_old_jobs`] every `period` until `stop` is cancelled.
///
/// A zero `period` is raised to one millisecond.
pub fn spawn_cleanup_loop<R>(
    tracker: Arc<JobTracker<R>>,
    period: Duration,
    stop: CancellationToken,
) -> JoinHandle<()>
where
    R: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_CLEANUP_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = tracker.cleanup_old_jobs();
                    if removed > 0 {
                        scout_info!("cleanup removed {} expired jobs", removed);
                    }
                }
            }
        }
        scout_debug!("cleanup loop stopped");
    })
}
