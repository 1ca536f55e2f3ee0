//! Links between ranks and the per-peer inbound demultiplexer.
//!
//! A rank holds one outgoing [`Link`] per peer and one [`PeerRouter`] per
//! peer. Links only move frames; the router turns the inbound frame stream
//! into a control lane and lazily-created per-tag data lanes.

use crate::error::Result;
use crate::protocol::Frame;
use crate::types::Rank;
use futures::future::BoxFuture;

pub mod local;
pub mod router;
pub mod tcp;

pub use local::LocalLink;
pub use router::PeerRouter;
pub use tcp::TcpLink;

/// Outgoing half of a connection to one peer.
///
/// Frames sent over one link arrive at the peer in send order.
pub trait Link: Send + Sync {
    /// Rank on the other end of this link.
    fn peer(&self) -> Rank;

    /// Deliver one frame to the peer.
    fn send_frame(&self, frame: Frame) -> BoxFuture<'_, Result<()>>;
}
