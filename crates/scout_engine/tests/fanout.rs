use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use scout_engine::{fan_out, CancellationToken};

fn init_logging() {
    scout_logging::initialize_for_tests();
}

#[tokio::test]
async fn results_keep_input_order() {
    init_logging();
    let cancel = CancellationToken::new();
    // Earlier items sleep longer, so they finish last.
    let items: Vec<u64> = vec![50, 40, 30, 20, 10, 0];

    let slots = fan_out(items.clone(), 6, &cancel, |_| {}, |delay| async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, String>(delay * 2)
    })
    .await;

    let values: Vec<u64> = slots.into_iter().map(|slot| slot.unwrap().unwrap()).collect();
    assert_eq!(values, vec![100, 80, 60, 40, 20, 0]);
}

#[tokio::test]
async fn never_exceeds_width() {
    init_logging();
    let cancel = CancellationToken::new();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let slots = fan_out((0..20).collect::<Vec<u32>>(), 3, &cancel, |_| {}, |n| {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, String>(n)
        }
    })
    .await;

    assert_eq!(slots.iter().filter(|slot| slot.is_some()).count(), 20);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn failures_do_not_abort_the_batch() {
    init_logging();
    let cancel = CancellationToken::new();

    let slots = fan_out(vec![1, 2, 3, 4], 2, &cancel, |_| {}, |n| async move {
        if n % 2 == 0 {
            Err(format!("item {n} unreachable"))
        } else {
            Ok(n)
        }
    })
    .await;

    assert_eq!(
        slots,
        vec![
            Some(Ok(1)),
            Some(Err("item 2 unreachable".to_string())),
            Some(Ok(3)),
            Some(Err("item 4 unreachable".to_string())),
        ]
    );
}

#[tokio::test]
async fn progress_counts_every_completion() {
    init_logging();
    let cancel = CancellationToken::new();
    let seen = Mutex::new(Vec::new());

    fan_out(
        vec![1, 2, 3, 4, 5],
        2,
        &cancel,
        |done| seen.lock().unwrap().push(done),
        |n| async move {
            if n == 3 {
                Err("boom")
            } else {
                Ok(n)
            }
        },
    )
    .await;

    assert_eq!(seen.into_inner().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn cancellation_stops_dispatch_and_abandons_in_flight_work() {
    init_logging();
    let cancel = CancellationToken::new();
    let started = Arc::new(AtomicUsize::new(0));

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        trigger.cancel();
    });

    let slots = fan_out((0..10).collect::<Vec<u64>>(), 2, &cancel, |_| {}, |n| {
        let started = started.clone();
        async move {
            started.fetch_add(1, Ordering::SeqCst);
            // The first pair finishes quickly; everything after hangs.
            let delay = if n < 2 { 10 } else { 10_000 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, String>(n)
        }
    })
    .await;

    assert_eq!(slots[0], Some(Ok(0)));
    assert_eq!(slots[1], Some(Ok(1)));
    assert!(slots[2..].iter().all(Option::is_none));
    assert_eq!(started.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn already_cancelled_scope_dispatches_nothing() {
    init_logging();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let calls = AtomicUsize::new(0);

    let slots = fan_out(vec![1, 2, 3], 2, &cancel, |_| {}, |n| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, String>(n) }
    })
    .await;

    assert_eq!(slots, vec![None, None, None]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_width_still_makes_progress() {
    init_logging();
    let cancel = CancellationToken::new();

    let slots = fan_out(vec!["a", "b"], 0, &cancel, |_| {}, |s| async move {
        Ok::<_, String>(s.to_uppercase())
    })
    .await;

    assert_eq!(slots, vec![Some(Ok("A".to_string())), Some(Ok("B".to_string()))]);
}
