use std::fmt;
use std::future::Future;

use futures_util::stream::{self, StreamExt};
use scout_logging::{scout_debug, scout_info};
use tokio_util::sync::CancellationToken;

/// Lookups in flight per batch. Higher widths start tripping provider throttling.
pub const DEFAULT_WIDTH: usize = 8;

/// Runs `lookup` over `items` with at most `width` calls in flight.
///
/// Slot `i` of the result always belongs to `items[i]`, whatever order the
/// calls finish in. `on_progress` receives the number of finished items after
/// each completion, failed ones included. Once `cancel` fires no further item
/// is started and in-flight calls are dropped; their slots stay `None`.
pub async fn fan_out<T, R, E, F, Fut, P>(
    items: Vec<T>,
    width: usize,
    cancel: &CancellationToken,
    mut on_progress: P,
    lookup: F,
) -> Vec<Option<Result<R, E>>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    P: FnMut(usize),
    E: fmt::Display,
{
    let total = items.len();
    let mut slots: Vec<Option<Result<R, E>>> = (0..total).map(|_| None).collect();
    if total == 0 || cancel.is_cancelled() {
        return slots;
    }

    let lookup = &lookup;
    let mut pending = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| async move { (index, lookup(item).await) })
        .buffer_unordered(width.max(1));

    let mut completed = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                scout_info!("fan-out cancelled after {}/{} items", completed, total);
                break;
            }
            next = pending.next() => match next {
                Some((index, outcome)) => {
                    if let Err(err) = &outcome {
                        scout_debug!("item {} failed: {}", index, err);
                    }
                    slots[index] = Some(outcome);
                    completed += 1;
                    on_progress(completed);
                }
                None => break,
            }
        }
    }
    slots
}
