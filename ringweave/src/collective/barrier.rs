use crate::collective::helpers::{bounded, ceil_log2};
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::protocol::Frame;
use crate::types::Rank;

const OPERATION: &str = "barrier";

/// Threshold: use two-phase barrier for small worlds, dissemination for larger.
const DISSEMINATION_THRESHOLD: u32 = 5;

/// Barrier: blocks until all ranks reach this point.
///
/// Dispatches on world size:
/// - `two_phase_barrier` for world_size <= 4 (lower constant overhead)
/// - `dissemination_barrier` for world_size >= 5 (O(log N) rounds, no coordinator)
///
/// Barrier frames travel on the control lane and never consume a
/// collective sequence number.
pub async fn barrier(group: &ProcessGroup) -> Result<()> {
    let world = group.world_size();
    if world <= 1 {
        return Ok(());
    }

    let epoch = group.next_barrier_epoch();
    tracing::trace!(rank = group.rank(), world, epoch, "barrier enter");
    if world < DISSEMINATION_THRESHOLD {
        two_phase_barrier(group, epoch).await
    } else {
        dissemination_barrier(group, epoch).await
    }
}

async fn send(group: &ProcessGroup, dest: Rank, frame: Frame) -> Result<()> {
    group
        .send_control(dest, frame)
        .await
        .map_err(|e| RingweaveError::collective(OPERATION, dest, e))
}

/// Wait for the next control frame from `src` and check it is `expected`.
async fn expect_frame(group: &ProcessGroup, src: Rank, expected: Frame) -> Result<()> {
    let received = bounded(
        group.config().barrier_timeout,
        group.recv_control(src),
        OPERATION,
        src,
        "waiting for barrier",
    )
    .await?;

    if received == expected {
        Ok(())
    } else {
        Err(RingweaveError::CommunicationFailure {
            operation: OPERATION,
            rank: src,
            reason: format!("expected {expected:?}, got {received:?}"),
        })
    }
}

/// Two-phase barrier: all ranks send to rank 0, rank 0 broadcasts ack.
///
/// Phase 1: Every rank (except 0) sends `Barrier { epoch }` to rank 0.
/// Phase 2: Rank 0 waits for all, then sends `BarrierAck { epoch }` to all.
async fn two_phase_barrier(group: &ProcessGroup, epoch: u64) -> Result<()> {
    let world = group.world_size();

    if group.rank() == 0 {
        for r in 1..world {
            expect_frame(group, r, Frame::Barrier { epoch }).await?;
        }
        for r in 1..world {
            send(group, r, Frame::BarrierAck { epoch }).await?;
        }
    } else {
        send(group, 0, Frame::Barrier { epoch }).await?;
        expect_frame(group, 0, Frame::BarrierAck { epoch }).await?;
    }

    Ok(())
}

/// Dissemination barrier: O(log N) rounds, no single coordinator.
///
/// In round r, rank i sends to rank `(i + 2^r) % N` and receives from
/// rank `(i - 2^r + N) % N`. After `ceil(log2(N))` rounds, every rank
/// has transitively heard from every other rank.
async fn dissemination_barrier(group: &ProcessGroup, epoch: u64) -> Result<()> {
    let rank = group.rank();
    let world = group.world_size();

    for round in 0..ceil_log2(world) {
        let distance = 1u32 << round;
        let send_to = (rank + distance) % world;
        let recv_from = (rank + world - distance) % world;

        tokio::try_join!(
            send(group, send_to, Frame::Barrier { epoch }),
            expect_frame(group, recv_from, Frame::Barrier { epoch }),
        )?;
    }

    Ok(())
}
