use crate::collective::Timed;
use crate::config::GroupConfig;
use crate::element::Element;
use crate::error::{Result, RingweaveError};
use crate::group::bootstrap::check_world_size;
use crate::group::{ProcessGroup, TrafficSnapshot};
use crate::transport::local::local_mesh;
use crate::types::{Rank, ReduceOp};

/// Blocking wrapper around [`ProcessGroup`].
///
/// Owns a `tokio::runtime::Runtime` and calls `block_on()` for each
/// operation. Meant for one OS thread per rank.
pub struct SyncGroup {
    inner: ProcessGroup,
    rt: tokio::runtime::Runtime,
}

fn new_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RingweaveError::transport_with_source("tokio runtime", e))
}

impl SyncGroup {
    /// Form a local group and return one blocking handle per rank.
    pub fn bootstrap_local(world_size: u32) -> Result<Vec<Self>> {
        Self::bootstrap_local_with_config(world_size, GroupConfig::from_env())
    }

    pub fn bootstrap_local_with_config(world_size: u32, config: GroupConfig) -> Result<Vec<Self>> {
        check_world_size("bootstrap_local", world_size)?;
        config.validate()?;

        // Each rank gets its own runtime, and its router tasks live there, so
        // dropping one handle never stalls the others' receive paths.
        let mut groups = Vec::with_capacity(world_size as usize);
        for (endpoint, rank) in local_mesh(world_size, config.lane_capacity)
            .into_iter()
            .zip(0..world_size)
        {
            let rt = new_runtime()?;
            let inner = {
                let _guard = rt.enter();
                ProcessGroup::from_parts(
                    rank,
                    world_size,
                    endpoint.links,
                    endpoint.inbound,
                    config.clone(),
                )?
            };
            groups.push(SyncGroup { inner, rt });
        }
        Ok(groups)
    }

    /// Wrap an existing async group with a new tokio runtime.
    ///
    /// The group's router tasks stay on the runtime that created it, which
    /// must outlive this handle.
    pub fn from_async(inner: ProcessGroup) -> Result<Self> {
        Ok(Self {
            inner,
            rt: new_runtime()?,
        })
    }

    pub fn rank(&self) -> Rank {
        self.inner.rank()
    }

    pub fn world_size(&self) -> u32 {
        self.inner.world_size()
    }

    pub fn traffic(&self) -> TrafficSnapshot {
        self.inner.traffic()
    }

    pub fn barrier(&self) -> Result<()> {
        self.rt.block_on(self.inner.barrier())
    }

    pub fn ring_allreduce<T: Element>(&self, local: &[T]) -> Result<Vec<T>> {
        self.rt.block_on(self.inner.ring_allreduce(local))
    }

    pub fn butterfly_allreduce<T: Element>(&self, local: &[T]) -> Result<Vec<T>> {
        self.rt.block_on(self.inner.butterfly_allreduce(local))
    }

    pub fn ring_prefix_scan<T: Element>(&self, local: &[T]) -> Result<Vec<T>> {
        self.rt.block_on(self.inner.ring_prefix_scan(local))
    }

    pub fn dissemination_allreduce<T: Element>(&self, local: &[T], op: ReduceOp) -> Result<Vec<T>> {
        self.rt
            .block_on(self.inner.dissemination_allreduce(local, op))
    }

    /// Time a blocking closure the way [`ProcessGroup::timed`] times a future.
    pub fn timed<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<Timed<T>> {
        self.rt.block_on(self.inner.barrier())?;
        let start = std::time::Instant::now();
        let value = f(self)?;
        let elapsed = start.elapsed();
        let slowest = self
            .rt
            .block_on(crate::collective::slowest_elapsed(&self.inner, elapsed))?;
        Ok(Timed {
            value,
            elapsed,
            slowest,
        })
    }

    /// Borrow the wrapped async group.
    pub fn inner(&self) -> &ProcessGroup {
        &self.inner
    }
}

impl std::fmt::Debug for SyncGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncGroup")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
