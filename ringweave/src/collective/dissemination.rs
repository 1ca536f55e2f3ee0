use crate::collective::agreement::agree_on_length;
use crate::collective::helpers::{ceil_log2, exchange};
use crate::element::{Element, combine_into, decode_slice, encode_slice};
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::types::{ReduceOp, RoundTag};

const OPERATION: &str = "dissemination_allreduce";

/// All-reduce for idempotent operations (`Min`, `Max`) in `ceil(log2 P)`
/// rounds for any group size.
///
/// In round `k`, rank `r` sends its running value to `(r + 2^k) % P` and
/// folds in the value from `(r - 2^k) % P`. A contribution may be folded in
/// more than once when `P` is not a power of two, so `Sum` is rejected with
/// `UnsupportedOp`.
pub async fn dissemination_allreduce<T: Element>(
    local: &[T],
    op: ReduceOp,
    group: &ProcessGroup,
) -> Result<Vec<T>> {
    if !op.is_idempotent() {
        return Err(RingweaveError::UnsupportedOp {
            op,
            operation: OPERATION,
        });
    }

    let n = agree_on_length(group, local.len(), OPERATION).await?;
    let sequence = group.next_sequence();
    disseminate(group, sequence, local.to_vec(), n, op, OPERATION).await
}

/// Dissemination rounds over an already agreed length `n`.
///
/// Shared by the length agreement and the timing reduction, which cannot
/// run an agreement of their own.
pub(crate) async fn disseminate<T: Element>(
    group: &ProcessGroup,
    sequence: u32,
    mut acc: Vec<T>,
    n: usize,
    op: ReduceOp,
    operation: &'static str,
) -> Result<Vec<T>> {
    debug_assert!(op.is_idempotent());
    let world = group.world_size();
    let rank = group.rank();

    for round in 0..ceil_log2(world) {
        let distance = 1u32 << round;
        let send_to = (rank + distance) % world;
        let recv_from = (rank + world - distance) % world;
        let tag = RoundTag::new(sequence, round);

        let received = exchange(group, send_to, recv_from, tag, &encode_slice(&acc), operation).await?;
        let incoming = decode_slice::<T>(&received, n)
            .map_err(|e| RingweaveError::collective(operation, recv_from, e))?;
        combine_into(&mut acc, &incoming, op);
        tracing::trace!(rank, round, send_to, recv_from, %tag, "{operation}: dissemination round");
    }

    Ok(acc)
}
