use crate::config::GroupConfig;
use crate::error::{Result, RingweaveError};
use crate::group::stats::{TrafficSnapshot, TrafficStats};
use crate::protocol::Frame;
use crate::transport::{Link, PeerRouter};
use crate::types::{Rank, Tag};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tokio::sync::mpsc;

/// One rank's handle on a fixed, fully connected process group.
///
/// Holds an outgoing [`Link`] per peer (for sending) and a [`PeerRouter`]
/// per peer (for receiving). Routers run as background tasks that sort
/// inbound frames into the control lane and per-tag lanes, so a `recv` for
/// one tag never steals a payload meant for another.
///
/// Collectives must be called in the same order on every rank: the
/// sequence counter that keeps their round tags apart advances in lockstep.
///
/// # Example
///
/// ```no_run
/// use ringweave::ProcessGroup;
///
/// # async fn example() -> ringweave::Result<()> {
/// let groups = ProcessGroup::bootstrap_local(4).await?;
///
/// assert_eq!(groups[0].rank(), 0);
/// assert_eq!(groups[0].world_size(), 4);
/// # Ok(())
/// # }
/// ```
pub struct ProcessGroup {
    rank: Rank,
    world_size: u32,
    links: HashMap<Rank, Arc<dyn Link>>,
    routers: HashMap<Rank, PeerRouter>,
    /// Router and reader tasks; aborted when the group is dropped.
    background: Vec<tokio::task::JoinHandle<()>>,
    config: GroupConfig,
    /// Collective sequence counter. Starts at 1 so tag 0 never appears on the wire.
    sequence: AtomicU32,
    barrier_epoch: AtomicU64,
    traffic: TrafficStats,
}

impl ProcessGroup {
    /// Assemble a group from per-peer links and inbound frame streams.
    ///
    /// Spawns one router task per peer, so this must run inside a tokio runtime.
    pub fn from_parts(
        rank: Rank,
        world_size: u32,
        links: HashMap<Rank, Arc<dyn Link>>,
        inbound: HashMap<Rank, mpsc::Receiver<Frame>>,
        config: GroupConfig,
    ) -> Result<Self> {
        config.validate()?;
        if rank >= world_size {
            return Err(RingweaveError::InvalidRank { rank, world_size });
        }
        for peer in (0..world_size).filter(|&p| p != rank) {
            if !links.contains_key(&peer) || !inbound.contains_key(&peer) {
                return Err(RingweaveError::transport(format!(
                    "rank {rank} has no connection to rank {peer}"
                )));
            }
        }

        let mut routers = HashMap::with_capacity(inbound.len());
        let mut background = Vec::with_capacity(inbound.len());
        for (peer, rx) in inbound {
            let (router, handle) = PeerRouter::spawn(peer, rx, config.lane_capacity);
            routers.insert(peer, router);
            background.push(handle);
        }

        Ok(Self {
            rank,
            world_size,
            links,
            routers,
            background,
            config,
            sequence: AtomicU32::new(1),
            barrier_epoch: AtomicU64::new(0),
            traffic: TrafficStats::default(),
        })
    }

    /// Keep extra transport tasks alive for the lifetime of the group.
    pub(crate) fn adopt_tasks(&mut self, handles: Vec<tokio::task::JoinHandle<()>>) {
        self.background.extend(handles);
    }

    /// This rank's index within the group.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks in the group.
    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Snapshot of this rank's traffic counters.
    pub fn traffic(&self) -> TrafficSnapshot {
        self.traffic.snapshot()
    }

    pub(crate) fn next_sequence(&self) -> u32 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn next_barrier_epoch(&self) -> u64 {
        self.barrier_epoch.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn record_round(&self) {
        self.traffic.record_round();
    }

    fn link(&self, rank: Rank) -> Result<&Arc<dyn Link>> {
        if rank >= self.world_size {
            return Err(RingweaveError::InvalidRank {
                rank,
                world_size: self.world_size,
            });
        }
        self.links
            .get(&rank)
            .ok_or(RingweaveError::UnknownPeer { rank })
    }

    fn router(&self, rank: Rank) -> Result<&PeerRouter> {
        if rank >= self.world_size {
            return Err(RingweaveError::InvalidRank {
                rank,
                world_size: self.world_size,
            });
        }
        self.routers
            .get(&rank)
            .ok_or(RingweaveError::UnknownPeer { rank })
    }

    /// Send `payload` to `dest` under `tag`.
    ///
    /// The payload is copied; the caller keeps ownership of its buffer.
    pub async fn send(&self, dest: Rank, tag: Tag, payload: &[u8]) -> Result<()> {
        let link = self.link(dest)?;
        link.send_frame(Frame::Data {
            tag,
            payload: payload.to_vec(),
        })
        .await?;
        self.traffic.record_send(payload.len());
        Ok(())
    }

    /// Receive the payload `src` sent under `tag`, waiting until it arrives.
    pub async fn recv(&self, src: Rank, tag: Tag) -> Result<Vec<u8>> {
        let payload = self.router(src)?.recv_tagged(tag).await?;
        self.traffic.record_recv();
        Ok(payload)
    }

    pub(crate) async fn send_control(&self, dest: Rank, frame: Frame) -> Result<()> {
        self.link(dest)?.send_frame(frame).await
    }

    pub(crate) async fn recv_control(&self, src: Rank) -> Result<Frame> {
        self.router(src)?.recv_control().await
    }

    /// Block until every rank of the group has entered the barrier.
    pub async fn barrier(&self) -> Result<()> {
        crate::collective::barrier(self).await
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        for handle in &self.background {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ProcessGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGroup")
            .field("rank", &self.rank)
            .field("world_size", &self.world_size)
            .field("traffic", &self.traffic.snapshot())
            .finish_non_exhaustive()
    }
}
