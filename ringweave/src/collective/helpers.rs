use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::types::{Rank, RoundTag};
use std::future::Future;
use std::time::Duration;

/// Integer ceiling of log2(n). Returns 0 for n <= 1.
pub(crate) fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    u32::BITS - (n - 1).leading_zeros()
}

/// `(successor, predecessor)` of `rank` on the directed ring.
pub(crate) fn ring_neighbors(rank: Rank, world: u32) -> (Rank, Rank) {
    ((rank + 1) % world, (rank + world - 1) % world)
}

/// Await a point-to-point future under the optional timeout, tagging any
/// failure with the collective and the peer it was talking to.
pub(crate) async fn bounded<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
    operation: &'static str,
    peer: Rank,
    what: &str,
) -> Result<T> {
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                return Err(RingweaveError::CommunicationFailure {
                    operation,
                    rank: peer,
                    reason: format!("{what} timed out after {}ms", limit.as_millis()),
                });
            }
        },
        None => fut.await,
    };
    result.map_err(|e| RingweaveError::collective(operation, peer, e))
}

/// Send a round payload to `dest`, wrapping errors as `CommunicationFailure`.
pub(crate) async fn collective_send(
    group: &ProcessGroup,
    dest: Rank,
    tag: RoundTag,
    payload: &[u8],
    operation: &'static str,
) -> Result<()> {
    bounded(
        group.config().collective_timeout,
        group.send(dest, tag.to_wire(), payload),
        operation,
        dest,
        "send",
    )
    .await
}

/// Receive a round payload from `src`, wrapping errors as `CommunicationFailure`.
pub(crate) async fn collective_recv(
    group: &ProcessGroup,
    src: Rank,
    tag: RoundTag,
    operation: &'static str,
) -> Result<Vec<u8>> {
    bounded(
        group.config().collective_timeout,
        group.recv(src, tag.to_wire()),
        operation,
        src,
        "recv",
    )
    .await
}

/// Send to `dest` and receive from `src` concurrently under one round tag.
///
/// Every rank issues both halves at once, so a full ring or a pair of
/// partners never waits on itself.
pub(crate) async fn exchange(
    group: &ProcessGroup,
    dest: Rank,
    src: Rank,
    tag: RoundTag,
    payload: &[u8],
    operation: &'static str,
) -> Result<Vec<u8>> {
    let (_, received) = tokio::try_join!(
        collective_send(group, dest, tag, payload, operation),
        collective_recv(group, src, tag, operation),
    )?;
    Ok(received)
}
