use crate::config::GroupConfig;
use crate::error::{Result, RingweaveError};
use crate::group::ProcessGroup;
use crate::transport::local::local_mesh;
use crate::transport::tcp::{connect_mesh, spawn_reader};
use crate::transport::{Link, TcpLink};
use crate::types::Rank;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub(crate) fn check_world_size(operation: &'static str, world_size: u32) -> Result<()> {
    if world_size == 0 {
        return Err(RingweaveError::InvalidGroupSize {
            operation,
            world_size,
            requirement: "at least one rank",
        });
    }
    Ok(())
}

impl ProcessGroup {
    /// Form a group of `world_size` ranks inside this process.
    ///
    /// Ranks talk over bounded in-memory channels. Configuration comes from
    /// [`GroupConfig::from_env`].
    pub async fn bootstrap_local(world_size: u32) -> Result<Vec<ProcessGroup>> {
        Self::bootstrap_local_with_config(world_size, GroupConfig::from_env()).await
    }

    /// Like [`bootstrap_local`](Self::bootstrap_local) with an explicit config.
    pub async fn bootstrap_local_with_config(
        world_size: u32,
        config: GroupConfig,
    ) -> Result<Vec<ProcessGroup>> {
        check_world_size("bootstrap_local", world_size)?;
        config.validate()?;

        let groups = local_mesh(world_size, config.lane_capacity)
            .into_iter()
            .zip(0..world_size)
            .map(|(endpoint, rank)| {
                ProcessGroup::from_parts(
                    rank,
                    world_size,
                    endpoint.links,
                    endpoint.inbound,
                    config.clone(),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(world_size, "local process group formed");
        Ok(groups)
    }

    /// Join a TCP process group as `rank`.
    ///
    /// `addrs[i]` is where rank `i` listens; `listener` must already be bound
    /// to `addrs[rank]`. Returns once connections to every peer are up.
    pub async fn bootstrap_tcp(
        rank: Rank,
        listener: TcpListener,
        addrs: &[SocketAddr],
        config: GroupConfig,
    ) -> Result<ProcessGroup> {
        let world_size = addrs.len() as u32;
        check_world_size("bootstrap_tcp", world_size)?;
        config.validate()?;

        let streams = connect_mesh(rank, &listener, addrs, &config).await?;

        let mut links: HashMap<Rank, Arc<dyn Link>> = HashMap::with_capacity(streams.len());
        let mut inbound = HashMap::with_capacity(streams.len());
        let mut readers = Vec::with_capacity(streams.len());
        for (peer, stream) in streams {
            let (read_half, write_half) = stream.into_split();
            links.insert(peer, Arc::new(TcpLink::new(peer, write_half)));
            let (rx, handle) = spawn_reader(peer, read_half, config.lane_capacity);
            inbound.insert(peer, rx);
            readers.push(handle);
        }

        let mut group = match ProcessGroup::from_parts(rank, world_size, links, inbound, config) {
            Ok(group) => group,
            Err(e) => {
                for handle in &readers {
                    handle.abort();
                }
                return Err(e);
            }
        };
        group.adopt_tasks(readers);

        tracing::info!(rank, world_size, "tcp process group formed");
        Ok(group)
    }

    /// Bind `addrs[rank]` and join the TCP process group.
    pub async fn bind_tcp(
        rank: Rank,
        addrs: &[SocketAddr],
        config: GroupConfig,
    ) -> Result<ProcessGroup> {
        let world_size = addrs.len() as u32;
        let addr = addrs
            .get(rank as usize)
            .ok_or(RingweaveError::InvalidRank { rank, world_size })?;
        let listener = TcpListener::bind(addr).await?;
        Self::bootstrap_tcp(rank, listener, addrs, config).await
    }
}
