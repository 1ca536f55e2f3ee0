use crate::collective::agreement::agree_on_length;
use crate::collective::helpers::{collective_recv, collective_send};
use crate::element::{Element, combine_into, decode_slice, encode_slice};
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::types::{Rank, ReduceOp, RoundTag};

const OPERATION: &str = "ring_prefix_scan";

/// Position of a rank in the prefix-scan chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRole {
    /// Rank 0 of a multi-rank group: starts the chain, never receives.
    Initiator,
    /// Interior rank: receives from `rank - 1`, forwards to `rank + 1`.
    Relay,
    /// Last rank: receives, never forwards.
    Terminal,
    /// The only rank of a single-rank group.
    Solo,
}

impl ScanRole {
    pub fn for_rank(rank: Rank, world: u32) -> Self {
        match (rank, world) {
            (_, 0 | 1) => ScanRole::Solo,
            (0, _) => ScanRole::Initiator,
            (r, w) if r + 1 == w => ScanRole::Terminal,
            _ => ScanRole::Relay,
        }
    }

    /// Rank this role receives the running sum from, if any.
    pub fn predecessor(self, rank: Rank) -> Option<Rank> {
        match self {
            ScanRole::Relay | ScanRole::Terminal => Some(rank - 1),
            ScanRole::Initiator | ScanRole::Solo => None,
        }
    }

    /// Rank this role forwards its prefix to, if any.
    pub fn successor(self, rank: Rank) -> Option<Rank> {
        match self {
            ScanRole::Initiator | ScanRole::Relay => Some(rank + 1),
            ScanRole::Terminal | ScanRole::Solo => None,
        }
    }
}

/// Ring prefix scan: rank `r` ends with the inclusive sum `v_0 + ... + v_r`.
///
/// The chain is strictly sequential: rank `r` cannot finish before every
/// lower rank has, so the critical path is `P-1` hops. The hop from `r` to
/// `r + 1` is tagged with round `r + 1`.
pub async fn ring_prefix_scan<T: Element>(local: &[T], group: &ProcessGroup) -> Result<Vec<T>> {
    let world = group.world_size();
    let rank = group.rank();
    let role = ScanRole::for_rank(rank, world);

    let n = agree_on_length(group, local.len(), OPERATION).await?;
    let sequence = group.next_sequence();
    if n == 0 {
        return Ok(local.to_vec());
    }

    tracing::debug!(rank, world, n, dtype = T::NAME, sequence, ?role, "ring_prefix_scan start");

    let prefix = match role.predecessor(rank) {
        Some(prev) => {
            let tag = RoundTag::new(sequence, rank);
            let received = collective_recv(group, prev, tag, OPERATION).await?;
            let mut prefix = decode_slice::<T>(&received, n)
                .map_err(|e| RingweaveError::collective(OPERATION, prev, e))?;
            combine_into(&mut prefix, local, ReduceOp::Sum);
            group.record_round();
            tracing::trace!(rank, from = prev, %tag, "ring_prefix_scan received running sum");
            prefix
        }
        None => local.to_vec(),
    };

    if let Some(next) = role.successor(rank) {
        let tag = RoundTag::new(sequence, next);
        collective_send(group, next, tag, &encode_slice(&prefix), OPERATION).await?;
        group.record_round();
        tracing::trace!(rank, to = next, %tag, "ring_prefix_scan forwarded prefix");
    }

    Ok(prefix)
}
