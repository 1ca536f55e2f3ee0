use crate::config::GroupConfig;
use crate::error::{Result, RingweaveError};
use crate::protocol::Frame;
use crate::protocol::codec::{read_frame, write_frame};
use crate::transport::Link;
use crate::types::{PROTOCOL_VERSION, Rank};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};

/// Delay between connect attempts while a lower rank is not listening yet.
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Link over one TCP stream carrying length-prefixed frames.
pub struct TcpLink {
    peer: Rank,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpLink {
    pub fn new(peer: Rank, writer: OwnedWriteHalf) -> Self {
        Self {
            peer,
            writer: Mutex::new(writer),
        }
    }
}

impl Link for TcpLink {
    fn peer(&self) -> Rank {
        self.peer
    }

    fn send_frame(&self, frame: Frame) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut writer = self.writer.lock().await;
            write_frame(&mut *writer, &frame).await.map_err(|e| match e {
                RingweaveError::Io(io) => {
                    tracing::debug!(peer = self.peer, error = %io, "tcp link write failed");
                    RingweaveError::PeerDisconnected { rank: self.peer }
                }
                other => other,
            })
        })
    }
}

/// Spawn a task that decodes frames from `reader` into a channel.
///
/// The channel closes when the peer closes the stream or sends garbage.
pub fn spawn_reader(
    peer: Rank,
    mut reader: OwnedReadHalf,
    capacity: usize,
) -> (mpsc::Receiver<Frame>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(async move {
        loop {
            match read_frame(&mut reader).await {
                Ok(Some(frame)) => {
                    if tx.send(frame).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    tracing::debug!(peer, "tcp reader: stream closed");
                    return;
                }
                Err(e) => {
                    tracing::warn!(peer, error = %e, "tcp reader: dropping connection");
                    return;
                }
            }
        }
    });
    (rx, handle)
}

/// Form the TCP full mesh for `rank`.
///
/// Rank `r` dials every lower rank (retrying until `config.connect_timeout`)
/// and accepts one connection from every higher rank on `listener`. The
/// dialing side opens with `Hello`, which the accepting side validates to
/// learn who is on the other end.
pub async fn connect_mesh(
    rank: Rank,
    listener: &TcpListener,
    addrs: &[SocketAddr],
    config: &GroupConfig,
) -> Result<HashMap<Rank, TcpStream>> {
    let world_size = addrs.len() as u32;
    if rank >= world_size {
        return Err(RingweaveError::InvalidRank { rank, world_size });
    }

    let dial = async {
        let mut dialed = Vec::with_capacity(rank as usize);
        for peer in 0..rank {
            let stream = dial_peer(rank, world_size, peer, addrs[peer as usize], config).await?;
            dialed.push((peer, stream));
        }
        Ok::<_, RingweaveError>(dialed)
    };

    let accept = async {
        let expected = (world_size - 1 - rank) as usize;
        let mut accepted = Vec::with_capacity(expected);
        while accepted.len() < expected {
            let (mut stream, remote) = listener.accept().await?;
            stream.set_nodelay(true)?;
            let peer = read_hello(rank, world_size, &mut stream).await?;
            if accepted.iter().any(|(p, _)| *p == peer) {
                return Err(RingweaveError::transport(format!(
                    "rank {peer} connected twice (from {remote})"
                )));
            }
            tracing::debug!(rank, peer, %remote, "accepted mesh connection");
            accepted.push((peer, stream));
        }
        Ok::<_, RingweaveError>(accepted)
    };

    let (dialed, accepted) = tokio::try_join!(dial, accept)?;
    Ok(dialed.into_iter().chain(accepted).collect())
}

async fn dial_peer(
    rank: Rank,
    world_size: u32,
    peer: Rank,
    addr: SocketAddr,
    config: &GroupConfig,
) -> Result<TcpStream> {
    let started = Instant::now();
    let mut stream = loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => break stream,
            Err(e) if started.elapsed() < config.connect_timeout => {
                tracing::trace!(rank, peer, %addr, error = %e, "peer not reachable yet, retrying");
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(e) => {
                return Err(RingweaveError::transport_with_source(
                    format!("connect to rank {peer} at {addr}"),
                    e,
                ));
            }
        }
    };
    stream.set_nodelay(true)?;

    let hello = Frame::Hello {
        rank,
        world_size,
        protocol_version: PROTOCOL_VERSION,
    };
    write_frame(&mut stream, &hello).await?;
    tracing::debug!(rank, peer, %addr, "dialed mesh connection");
    Ok(stream)
}

async fn read_hello(rank: Rank, world_size: u32, stream: &mut TcpStream) -> Result<Rank> {
    match read_frame(stream).await? {
        Some(Frame::Hello {
            rank: peer,
            world_size: peer_world,
            protocol_version,
        }) => {
            if protocol_version != PROTOCOL_VERSION {
                return Err(RingweaveError::ProtocolMismatch {
                    local: PROTOCOL_VERSION,
                    remote: protocol_version,
                });
            }
            if peer_world != world_size {
                return Err(RingweaveError::transport(format!(
                    "rank {peer} believes the world has {peer_world} ranks, expected {world_size}"
                )));
            }
            if peer <= rank || peer >= world_size {
                return Err(RingweaveError::transport(format!(
                    "rank {rank} only accepts higher ranks, got hello from rank {peer}"
                )));
            }
            Ok(peer)
        }
        Some(other) => Err(RingweaveError::DecodeFailed(format!(
            "expected Hello, got {other:?}"
        ))),
        None => Err(RingweaveError::transport(
            "connection closed before Hello",
        )),
    }
}
