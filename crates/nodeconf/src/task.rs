//! Fan-out / join helper for refresh phases.

use std::future::Future;
use tokio::task::JoinSet;
use tracing::{trace, warn};

/// Results of one fan-out batch
#[derive(Debug)]
pub struct FanOut<T> {
    pub results: Vec<T>,
    /// Tasks that panicked or were cancelled; their results are lost
    pub failed: usize,
}

/// In-flight limit used by refresh
pub fn default_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 4)
        .unwrap_or(16)
}

/// Spawn one task per item with at most `limit` in flight, then wait for all
/// of them. A task that panics is logged and counted, never propagated, so
/// one bad item cannot abort the batch.
pub async fn fan_out<I, F, Fut, T>(label: &'static str, limit: usize, items: I, task: F) -> FanOut<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let limit = limit.max(1);
    let mut set = JoinSet::new();
    let mut out = FanOut {
        results: Vec::new(),
        failed: 0,
    };

    for item in items {
        while set.len() >= limit {
            collect_next(label, &mut set, &mut out).await;
        }
        trace!(task = label, pending = set.len(), "spawn");
        set.spawn(task(item));
    }

    while !set.is_empty() {
        collect_next(label, &mut set, &mut out).await;
    }

    out
}

async fn collect_next<T: Send + 'static>(label: &'static str, set: &mut JoinSet<T>, out: &mut FanOut<T>) {
    match set.join_next().await {
        Some(Ok(value)) => out.results.push(value),
        Some(Err(e)) => {
            warn!(task = label, "Task failed: {}", e);
            out.failed += 1;
        }
        None => {}
    }
}
