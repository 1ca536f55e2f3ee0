use crate::collective::{self, Timed};
use crate::element::Element;
use crate::error::Result;
use crate::group::ProcessGroup;
use crate::types::ReduceOp;
use std::future::Future;

impl ProcessGroup {
    /// Sum all ranks' vectors around the ring; every rank gets the total.
    pub async fn ring_allreduce<T: Element>(&self, local: &[T]) -> Result<Vec<T>> {
        collective::ring_allreduce(local, self).await
    }

    /// Sum all ranks' vectors over hypercube partners. Requires a
    /// power-of-two group size.
    pub async fn butterfly_allreduce<T: Element>(&self, local: &[T]) -> Result<Vec<T>> {
        collective::butterfly_allreduce(local, self).await
    }

    /// Inclusive prefix sum in rank order.
    pub async fn ring_prefix_scan<T: Element>(&self, local: &[T]) -> Result<Vec<T>> {
        collective::ring_prefix_scan(local, self).await
    }

    /// Element-wise `Min` or `Max` across the group in `ceil(log2 P)` rounds.
    pub async fn dissemination_allreduce<T: Element>(
        &self,
        local: &[T],
        op: ReduceOp,
    ) -> Result<Vec<T>> {
        collective::dissemination_allreduce(local, op, self).await
    }

    /// Run `fut` between a barrier and a max-reduction of elapsed time.
    pub async fn timed<F, T>(&self, fut: F) -> Result<Timed<T>>
    where
        F: Future<Output = Result<T>>,
    {
        collective::timed(self, fut).await
    }
}
