//! Batched fan-out scheduler
//!
//! Processes an ordered work list in fixed-size concurrent groups with a
//! pacing delay between groups. This bounds peak concurrent load on the
//! upstream while still overlapping latency within a group.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Process `items` in consecutive groups of at most `batch_size`.
///
/// All items in a group are started concurrently; the group completes when
/// every processor has settled. One item's failure never aborts its
/// siblings or later groups. Between groups (never after the last) the
/// scheduler waits `pacing` before starting the next one.
///
/// Cancellation stops the scheduler at the next group boundary; the pacing
/// wait itself is interruptible.
///
/// Returns the number of items whose processor succeeded, folded from the
/// joined per-item results.
pub async fn run_batches<T, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    pacing: Duration,
    cancel: &CancellationToken,
    mut processor: F,
) -> usize
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let batch_size = batch_size.max(1);
    let total = items.len();
    let mut iter = items.into_iter();
    let mut processed = 0;
    let mut successes = 0;

    while processed < total {
        if cancel.is_cancelled() {
            break;
        }

        let batch: Vec<T> = iter.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        processed += batch.len();

        let results =
            futures::future::join_all(batch.into_iter().map(&mut processor)).await;
        successes += results.iter().filter(|r| r.is_ok()).count();

        if processed < total {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pacing) => {}
            }
        }
    }

    successes
}
