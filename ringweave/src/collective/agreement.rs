use crate::collective::dissemination::disseminate;
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::types::ReduceOp;

/// Agree on the vector length before any payload round.
///
/// Every rank contributes `[ok, len, u64::MAX - len]` to a `Min` reduction,
/// which yields the group-wide AND of the `ok` flags together with the
/// minimum and maximum length. All ranks see the same triple, so either
/// every rank proceeds with the same `n` or every rank returns
/// `InvalidVectorLength`.
pub(crate) async fn agree_on_length(
    group: &ProcessGroup,
    local_len: usize,
    operation: &'static str,
) -> Result<usize> {
    let limit = group.config().max_vector_len;
    let ok = local_len <= limit;
    let len = local_len as u64;
    let sequence = group.next_sequence();

    let agreed = disseminate(
        group,
        sequence,
        vec![u64::from(ok), len, u64::MAX - len],
        3,
        ReduceOp::Min,
        operation,
    )
    .await?;

    let all_ok = agreed[0] == 1;
    let min = agreed[1] as usize;
    let max = (u64::MAX - agreed[2]) as usize;

    if !all_ok || min != max {
        tracing::debug!(
            rank = group.rank(),
            local = local_len,
            min,
            max,
            limit,
            "{operation}: vector length agreement failed"
        );
        return Err(RingweaveError::InvalidVectorLength {
            operation,
            local: local_len,
            min,
            max,
            limit,
        });
    }
    Ok(min)
}
