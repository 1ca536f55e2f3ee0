use crate::error::{Result, RingweaveError};
use crate::protocol::Frame;
use crate::types::{Rank, RoundTag, Tag};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::sync::{Mutex, mpsc};

/// A demultiplexer that drains the inbound frame stream of one peer and
/// routes each frame to a typed lane.
///
/// # Lanes
///
/// - **`control`**: barrier traffic, consumed in arrival order.
/// - **`tagged`**: one lane per data tag. Created lazily by whichever side
///   comes first (a frame arriving or a receiver registering), so a payload
///   that arrives before its `recv` is buffered rather than lost.
///
/// When the peer goes away, payloads already buffered remain receivable;
/// any receive that would need a new payload fails with `PeerDisconnected`.
pub struct PeerRouter {
    peer: Rank,
    control: Mutex<mpsc::Receiver<Frame>>,
    /// Never held across an await.
    tagged: Arc<StdMutex<TagTable>>,
    capacity: usize,
}

/// A tagged lane. The router holds `tx` until the peer disconnects;
/// `rx` sits here until claimed by a receiver.
struct TaggedChannel {
    tx: Option<mpsc::Sender<Vec<u8>>>,
    rx: Option<mpsc::Receiver<Vec<u8>>>,
}

struct TagTable {
    channels: HashMap<Tag, TaggedChannel>,
    closed: bool,
}

impl TagTable {
    fn new() -> Self {
        Self {
            channels: HashMap::new(),
            closed: false,
        }
    }

    fn entry(&mut self, tag: Tag, capacity: usize) -> &mut TaggedChannel {
        let closed = self.closed;
        self.channels.entry(tag).or_insert_with(|| {
            let (tx, rx) = mpsc::channel(capacity);
            TaggedChannel {
                tx: if closed { None } else { Some(tx) },
                rx: Some(rx),
            }
        })
    }

    fn sender(&mut self, tag: Tag, capacity: usize) -> Option<mpsc::Sender<Vec<u8>>> {
        self.entry(tag, capacity).tx.clone()
    }

    fn claim(&mut self, tag: Tag, capacity: usize) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.entry(tag, capacity).rx.take()
    }

    /// Hand a claimed receiver back so a later `recv` can pick up its payload.
    fn restore(&mut self, tag: Tag, rx: mpsc::Receiver<Vec<u8>>) {
        if let Some(ch) = self.channels.get_mut(&tag) {
            ch.rx = Some(rx);
        }
    }

    fn release(&mut self, tag: Tag) {
        self.channels.remove(&tag);
    }

    fn close(&mut self) {
        self.closed = true;
        for ch in self.channels.values_mut() {
            ch.tx = None;
        }
    }
}

fn lock_table(table: &StdMutex<TagTable>) -> MutexGuard<'_, TagTable> {
    // A panic while holding the lock leaves the table consistent: every
    // mutation is a single map operation.
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A receiver's hold on one tag lane.
///
/// Dropping the claim, whether the receive finished or was cancelled,
/// discards the lane if it is empty and hands it back to the table if a
/// payload is still buffered in it.
struct LaneClaim<'a> {
    table: &'a StdMutex<TagTable>,
    tag: Tag,
    rx: Option<mpsc::Receiver<Vec<u8>>>,
}

impl LaneClaim<'_> {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}

impl Drop for LaneClaim<'_> {
    fn drop(&mut self) {
        let mut table = lock_table(self.table);
        match self.rx.take() {
            Some(rx) if !rx.is_empty() => table.restore(self.tag, rx),
            _ => table.release(self.tag),
        }
    }
}

impl PeerRouter {
    /// Spawn the routing loop over `inbound` and return the router.
    pub fn spawn(
        peer: Rank,
        inbound: mpsc::Receiver<Frame>,
        capacity: usize,
    ) -> (Self, tokio::task::JoinHandle<()>) {
        let (control_tx, control_rx) = mpsc::channel(capacity);
        let tagged = Arc::new(StdMutex::new(TagTable::new()));

        let handle = tokio::spawn(route_loop(
            peer,
            inbound,
            control_tx,
            Arc::clone(&tagged),
            capacity,
        ));

        let router = Self {
            peer,
            control: Mutex::new(control_rx),
            tagged,
            capacity,
        };
        (router, handle)
    }

    /// Receive the next control frame from this peer.
    pub async fn recv_control(&self) -> Result<Frame> {
        self.control
            .lock()
            .await
            .recv()
            .await
            .ok_or(RingweaveError::PeerDisconnected { rank: self.peer })
    }

    /// Receive the payload this peer sent under `tag`.
    ///
    /// Each tag carries exactly one payload; the lane is discarded afterwards.
    /// Cancelling the returned future leaves the tag receivable again.
    pub async fn recv_tagged(&self, tag: Tag) -> Result<Vec<u8>> {
        let rx = lock_table(&self.tagged).claim(tag, self.capacity);
        let rx = rx.ok_or_else(|| {
            RingweaveError::transport(format!(
                "tag {} from rank {} already has a receiver",
                RoundTag::from_wire(tag),
                self.peer
            ))
        })?;

        let mut claim = LaneClaim {
            table: &self.tagged,
            tag,
            rx: Some(rx),
        };
        claim
            .recv()
            .await
            .ok_or(RingweaveError::PeerDisconnected { rank: self.peer })
    }

    /// Number of tag lanes currently open (buffered or awaited).
    pub fn open_lanes(&self) -> usize {
        lock_table(&self.tagged).channels.len()
    }
}

async fn route_loop(
    peer: Rank,
    mut inbound: mpsc::Receiver<Frame>,
    control_tx: mpsc::Sender<Frame>,
    tagged: Arc<StdMutex<TagTable>>,
    capacity: usize,
) {
    while let Some(frame) = inbound.recv().await {
        if frame.is_control() {
            if control_tx.send(frame).await.is_err() {
                tracing::debug!(peer, "router: control lane dropped");
                break;
            }
            continue;
        }

        match frame {
            Frame::Data { tag, payload } => {
                let tx = lock_table(&tagged).sender(tag, capacity);
                let round = RoundTag::from_wire(tag);
                match tx {
                    Some(tx) => {
                        if tx.send(payload).await.is_err() {
                            tracing::warn!(peer, %round, "router: tagged receiver dropped, payload discarded");
                        }
                    }
                    None => {
                        tracing::warn!(peer, %round, "router: tag lane already closed");
                    }
                }
            }
            Frame::Hello { rank, .. } => {
                tracing::warn!(peer, rank, "router: unexpected Hello after handshake");
            }
            other => {
                tracing::warn!(peer, frame = ?other, "router: unroutable frame dropped");
            }
        }
    }

    tracing::debug!(peer, "router: inbound stream closed");
    lock_table(&tagged).close();
}
