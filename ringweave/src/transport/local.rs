use crate::error::{Result, RingweaveError};
use crate::protocol::Frame;
use crate::transport::Link;
use crate::types::Rank;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// In-process link backed by a bounded channel.
pub struct LocalLink {
    peer: Rank,
    tx: mpsc::Sender<Frame>,
}

impl LocalLink {
    pub fn new(peer: Rank, tx: mpsc::Sender<Frame>) -> Self {
        Self { peer, tx }
    }
}

impl Link for LocalLink {
    fn peer(&self) -> Rank {
        self.peer
    }

    fn send_frame(&self, frame: Frame) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.tx
                .send(frame)
                .await
                .map_err(|_| RingweaveError::PeerDisconnected { rank: self.peer })
        })
    }
}

/// Outgoing links and inbound receivers for one rank of a local mesh.
pub struct LocalEndpoint {
    pub links: HashMap<Rank, Arc<dyn Link>>,
    pub inbound: HashMap<Rank, mpsc::Receiver<Frame>>,
}

/// Wire a full mesh of `world_size` ranks with one channel per ordered pair.
///
/// Endpoint `i` holds a link to every `j != i` and the receiver for
/// everything `j` sends to `i`.
pub fn local_mesh(world_size: u32, capacity: usize) -> Vec<LocalEndpoint> {
    let mut endpoints: Vec<LocalEndpoint> = (0..world_size)
        .map(|_| LocalEndpoint {
            links: HashMap::new(),
            inbound: HashMap::new(),
        })
        .collect();

    for src in 0..world_size {
        for dst in 0..world_size {
            if src == dst {
                continue;
            }
            let (tx, rx) = mpsc::channel(capacity);
            endpoints[src as usize]
                .links
                .insert(dst, Arc::new(LocalLink::new(dst, tx)));
            endpoints[dst as usize].inbound.insert(src, rx);
        }
    }

    endpoints
}
