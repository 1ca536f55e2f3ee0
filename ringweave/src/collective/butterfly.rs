use crate::collective::agreement::agree_on_length;
use crate::collective::helpers::exchange;
use crate::element::{Element, combine_into, decode_slice, encode_slice};
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::types::{ReduceOp, RoundTag};

const OPERATION: &str = "butterfly_allreduce";

/// Butterfly (hypercube) all-reduce: every rank ends with the element-wise
/// sum of all ranks' vectors after `log2(P)` rounds.
///
/// In round `i` a rank swaps its whole accumulator with partner
/// `rank ^ (1 << i)` and adds the partner's copy into its own. Partners
/// always hold identical accumulators after a round, so the result is
/// bitwise identical on every rank, floats included.
///
/// `P` must be a power of two. The check is a pure function of `P`, so
/// every rank fails with `InvalidGroupSize` before sending anything.
pub async fn butterfly_allreduce<T: Element>(local: &[T], group: &ProcessGroup) -> Result<Vec<T>> {
    let world = group.world_size();
    let rank = group.rank();

    if !world.is_power_of_two() {
        return Err(RingweaveError::InvalidGroupSize {
            operation: OPERATION,
            world_size: world,
            requirement: "a power-of-two group size",
        });
    }

    let n = agree_on_length(group, local.len(), OPERATION).await?;
    let sequence = group.next_sequence();
    if world == 1 || n == 0 {
        return Ok(local.to_vec());
    }

    let rounds = world.trailing_zeros();
    tracing::debug!(rank, world, n, dtype = T::NAME, sequence, rounds, "butterfly_allreduce start");

    let mut acc = local.to_vec();
    for round in 0..rounds {
        let partner = rank ^ (1 << round);
        let tag = RoundTag::new(sequence, round);
        let received = exchange(group, partner, partner, tag, &encode_slice(&acc), OPERATION).await?;
        let incoming = decode_slice::<T>(&received, n)
            .map_err(|e| RingweaveError::collective(OPERATION, partner, e))?;

        combine_into(&mut acc, &incoming, ReduceOp::Sum);
        group.record_round();
        tracing::trace!(rank, round, partner, %tag, "butterfly_allreduce round complete");
    }

    Ok(acc)
}
