use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scout_core::JobStatus;
use scout_engine::{spawn_cleanup_loop, CancellationToken, JobTracker};

fn init_logging() {
    scout_logging::initialize_for_tests();
}

fn tracker() -> JobTracker<String> {
    JobTracker::new(Duration::from_secs(600))
}

#[test]
fn ids_are_unique_across_many_jobs() {
    init_logging();
    let tracker = tracker();
    let ids: HashSet<_> = (0..1000).map(|_| tracker.create_job("movies", 3).0).collect();
    assert_eq!(ids.len(), 1000);
    assert_eq!(tracker.len(), 1000);
}

#[test]
fn new_job_starts_running_at_zero() {
    init_logging();
    let tracker = tracker();
    let (id, token) = tracker.create_job("music", 12);

    let job = tracker.get_progress(id).expect("job exists");
    assert_eq!(job.job_type, "music");
    assert_eq!(job.total, 12);
    assert_eq!(job.current, 0);
    assert_eq!(job.phase, "");
    assert_eq!(job.status, JobStatus::Running);
    assert!(job.result.is_none());
    assert!(!token.is_cancelled());
}

#[test]
fn progress_never_exceeds_total() {
    init_logging();
    let tracker = tracker();
    let (id, _token) = tracker.create_job("movies", 5);

    tracker.update_progress(id, 9, "searching");

    let job = tracker.get_progress(id).unwrap();
    assert_eq!(job.current, 5);
}

#[test]
fn empty_phase_keeps_previous_label() {
    init_logging();
    let tracker = tracker();
    let (id, _token) = tracker.create_job("movies", 10);

    tracker.update_progress(id, 1, "searching blu-ray");
    tracker.update_progress(id, 4, "");

    let job = tracker.get_progress(id).unwrap();
    assert_eq!(job.current, 4);
    assert_eq!(job.phase, "searching blu-ray");
}

#[test]
fn completion_fills_progress_and_freezes_job() {
    init_logging();
    let tracker = tracker();
    let (id, _token) = tracker.create_job("movies", 7);
    tracker.update_progress(id, 3, "searching");

    tracker.mark_complete(id, "report".to_string());
    tracker.update_progress(id, 1, "late tick");

    let job = tracker.get_progress(id).unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.current, 7);
    assert_eq!(job.phase, "");
    assert_eq!(job.result.as_deref(), Some("report"));
}

#[test]
fn cancel_succeeds_exactly_once() {
    init_logging();
    let tracker = tracker();
    let (id, token) = tracker.create_job("movies", 2);

    assert!(tracker.cancel_job(id));
    assert!(token.is_cancelled());
    assert!(!tracker.cancel_job(id));
    assert!(!tracker.cancel_job(id + 100));
    assert_eq!(tracker.get_progress(id).unwrap().status, JobStatus::Cancelled);
}

#[test]
fn cancel_after_completion_is_rejected() {
    init_logging();
    let tracker = tracker();
    let (id, token) = tracker.create_job("movies", 2);
    tracker.mark_complete(id, "done".to_string());

    assert!(!tracker.cancel_job(id));
    assert!(!token.is_cancelled());
    assert_eq!(tracker.get_progress(id).unwrap().status, JobStatus::Complete);
}

#[test]
fn completion_after_cancel_is_ignored() {
    init_logging();
    let tracker = tracker();
    let (id, _token) = tracker.create_job("movies", 2);
    tracker.cancel_job(id);

    tracker.mark_complete(id, "late".to_string());

    let job = tracker.get_progress(id).unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.result.is_none());
}

#[test]
fn unknown_ids_are_ignored() {
    init_logging();
    let tracker = tracker();
    tracker.update_progress(42, 1, "x");
    tracker.mark_complete(42, "x".to_string());
    assert!(tracker.get_progress(42).is_none());
    assert!(tracker.is_empty());
}

#[test]
fn snapshots_are_independent_copies() {
    init_logging();
    let tracker = tracker();
    let (id, _token) = tracker.create_job("movies", 3);
    tracker.update_progress(id, 1, "searching");

    let mut first = tracker.get_progress(id).unwrap();
    first.current = 3;
    first.phase = "tampered".to_string();
    first.status = JobStatus::Complete;

    let second = tracker.get_progress(id).unwrap();
    assert_eq!(second.current, 1);
    assert_eq!(second.phase, "searching");
    assert_eq!(second.status, JobStatus::Running);
}

#[test]
fn cleanup_removes_only_expired_jobs() {
    init_logging();
    let tracker: JobTracker<String> = JobTracker::new(Duration::from_millis(50));
    let (old_running, old_running_token) = tracker.create_job("movies", 1);
    let (old_done, old_done_token) = tracker.create_job("movies", 1);
    tracker.mark_complete(old_done, "done".to_string());

    thread::sleep(Duration::from_millis(120));
    let (young, young_token) = tracker.create_job("movies", 1);

    assert_eq!(tracker.cleanup_old_jobs(), 2);

    assert!(tracker.get_progress(old_running).is_none());
    assert!(tracker.get_progress(old_done).is_none());
    assert!(old_running_token.is_cancelled());
    assert!(old_done_token.is_cancelled());

    assert!(tracker.get_progress(young).is_some());
    assert!(!young_token.is_cancelled());
    assert!(!tracker.cancel_job(old_running));
}

#[test]
fn shutdown_cancels_running_jobs() {
    init_logging();
    let tracker = tracker();
    let (running, running_token) = tracker.create_job("movies", 1);
    let (done, _done_token) = tracker.create_job("movies", 1);
    tracker.mark_complete(done, "ok".to_string());

    tracker.shutdown();

    assert!(running_token.is_cancelled());
    assert_eq!(tracker.get_progress(running).unwrap().status, JobStatus::Cancelled);
    assert_eq!(tracker.get_progress(done).unwrap().status, JobStatus::Complete);
}

#[test]
fn dropping_tracker_cancels_job_tokens() {
    init_logging();
    let tracker = tracker();
    let (_id, token) = tracker.create_job("movies", 1);
    drop(tracker);
    assert!(token.is_cancelled());
}

#[test]
fn concurrent_writers_and_readers_keep_invariants() {
    init_logging();
    let tracker = Arc::new(tracker());
    let (id, _token) = tracker.create_job("movies", 200);

    let writer = {
        let tracker = tracker.clone();
        thread::spawn(move || {
            for current in 1..=200 {
                tracker.update_progress(id, current, if current % 10 == 0 { "tick" } else { "" });
            }
            tracker.mark_complete(id, "final".to_string());
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let tracker = tracker.clone();
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..500 {
                    let job = tracker.get_progress(id).unwrap();
                    assert!(job.current <= job.total);
                    assert!(job.current >= last);
                    last = job.current;
                }
            })
        })
        .collect();
    let creators: Vec<_> = (0..4)
        .map(|_| {
            let tracker = tracker.clone();
            thread::spawn(move || {
                (0..100)
                    .map(|_| tracker.create_job("music", 1).0)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    let ids: HashSet<_> = creators
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(ids.len(), 400);
    assert!(!ids.contains(&id));
    let job = tracker.get_progress(id).unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.current, 200);
}

#[tokio::test]
async fn cleanup_loop_expires_jobs_until_stopped() {
    init_logging();
    let tracker: Arc<JobTracker<String>> = Arc::new(JobTracker::new(Duration::from_millis(30)));
    let (id, token) = tracker.create_job("movies", 1);
    let stop = CancellationToken::new();

    let handle = spawn_cleanup_loop(tracker.clone(), Duration::from_millis(20), stop.clone());
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(tracker.get_progress(id).is_none());
    assert!(token.is_cancelled());

    stop.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop stops")
        .unwrap();
}

#[tokio::test]
async fn zero_cleanup_period_still_runs() {
    init_logging();
    let tracker: Arc<JobTracker<String>> = Arc::new(JobTracker::new(Duration::ZERO));
    let (id, token) = tracker.create_job("movies", 1);
    let stop = CancellationToken::new();

    let handle = spawn_cleanup_loop(tracker.clone(), Duration::ZERO, stop.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(tracker.get_progress(id).is_none());
    assert!(token.is_cancelled());

    stop.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop stops")
        .unwrap();
}
