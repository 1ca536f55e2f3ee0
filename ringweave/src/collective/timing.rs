use crate::collective::dissemination::disseminate;
use crate::error::Result;
use crate::group::ProcessGroup;
use crate::types::ReduceOp;
use std::future::Future;
use std::time::{Duration, Instant};

/// Result of a collective run under [`timed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    /// Wall-clock time on this rank.
    pub elapsed: Duration,
    /// Largest `elapsed` across the group; identical on every rank.
    pub slowest: Duration,
}

/// Time `fut` so that every rank starts together and learns the slowest
/// rank's duration.
///
/// Runs a barrier, awaits `fut`, then max-reduces the elapsed time across
/// the group. Every rank must call `timed` around the same collective.
pub async fn timed<F, T>(group: &ProcessGroup, fut: F) -> Result<Timed<T>>
where
    F: Future<Output = Result<T>>,
{
    group.barrier().await?;
    let start = Instant::now();
    let value = fut.await?;
    let elapsed = start.elapsed();
    let slowest = slowest_elapsed(group, elapsed).await?;

    tracing::debug!(
        rank = group.rank(),
        elapsed_us = elapsed.as_micros() as u64,
        slowest_us = slowest.as_micros() as u64,
        "timed collective finished"
    );
    Ok(Timed {
        value,
        elapsed,
        slowest,
    })
}

/// Max-reduce a duration across the group at nanosecond resolution.
pub(crate) async fn slowest_elapsed(group: &ProcessGroup, elapsed: Duration) -> Result<Duration> {
    let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
    let sequence = group.next_sequence();
    let reduced = disseminate(group, sequence, vec![nanos], 1, ReduceOp::Max, "timed").await?;
    Ok(Duration::from_nanos(reduced[0]))
}
