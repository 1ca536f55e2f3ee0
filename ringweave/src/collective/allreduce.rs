use crate::collective::agreement::agree_on_length;
use crate::collective::helpers::{exchange, ring_neighbors};
use crate::element::{Element, combine_into, decode_slice, encode_slice};
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::types::{ReduceOp, RoundTag};

const OPERATION: &str = "ring_allreduce";

/// Ring all-reduce: every rank ends with the element-wise sum of all
/// ranks' vectors.
///
/// Algorithm:
/// 1. Agree on the vector length across the group.
/// 2. `P-1` rounds. In each, a rank passes the vector it last received
///    (its own in round 1) to its successor and receives its predecessor's,
///    adding it into the accumulator.
///
/// After round `s` the accumulator holds the sum of `v_r, v_{r-1}, ...,
/// v_{r-s}`, so after `P-1` rounds it holds all `P` contributions.
///
/// Float sums are accumulated in a rank-dependent order and may differ in
/// the last bit across ranks. Use [`butterfly_allreduce`] when bitwise
/// agreement matters.
///
/// [`butterfly_allreduce`]: crate::collective::butterfly_allreduce
pub async fn ring_allreduce<T: Element>(local: &[T], group: &ProcessGroup) -> Result<Vec<T>> {
    let world = group.world_size();
    let rank = group.rank();

    let n = agree_on_length(group, local.len(), OPERATION).await?;
    let sequence = group.next_sequence();
    if world <= 1 || n == 0 {
        return Ok(local.to_vec());
    }

    tracing::debug!(rank, world, n, dtype = T::NAME, sequence, "ring_allreduce start");

    let (next, prev) = ring_neighbors(rank, world);
    let mut acc = local.to_vec();
    let mut current = local.to_vec();

    for round in 1..world {
        let tag = RoundTag::new(sequence, round);
        let received = exchange(group, next, prev, tag, &encode_slice(&current), OPERATION).await?;
        let incoming = decode_slice::<T>(&received, n)
            .map_err(|e| RingweaveError::collective(OPERATION, prev, e))?;

        combine_into(&mut acc, &incoming, ReduceOp::Sum);
        current = incoming;
        group.record_round();
        tracing::trace!(rank, round, %tag, "ring_allreduce round complete");
    }

    tracing::debug!(rank, rounds = world - 1, "ring_allreduce done");
    Ok(acc)
}
