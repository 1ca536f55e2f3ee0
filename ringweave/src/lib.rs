//! Hand-rolled collective communication over a fixed process group.
//!
//! A [`ProcessGroup`] is one rank's view of `P` fully connected ranks. On top
//! of its tagged point-to-point `send`/`recv` the crate builds:
//!
//! - [`ring_allreduce`]: `P-1` rounds of neighbor exchange around a ring.
//! - [`butterfly_allreduce`]: `log2(P)` rounds of hypercube partner exchange.
//! - [`ring_prefix_scan`]: inclusive prefix sum along rank order.
//!
//! ```no_run
//! use ringweave::ProcessGroup;
//!
//! # async fn example() -> ringweave::Result<()> {
//! let groups = ProcessGroup::bootstrap_local(4).await?;
//! let mut tasks = Vec::new();
//! for group in groups {
//!     tasks.push(tokio::spawn(async move {
//!         let local = vec![group.rank() as f64 + 1.0];
//!         group.ring_allreduce(&local).await
//!     }));
//! }
//! for task in tasks {
//!     assert_eq!(task.await.unwrap()?, vec![10.0]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod collective;
pub mod config;
pub mod element;
pub mod error;
pub mod group;
pub mod protocol;
pub mod transport;
pub mod types;

pub use collective::{
    ScanRole, Timed, barrier, butterfly_allreduce, dissemination_allreduce, ring_allreduce,
    ring_prefix_scan, timed,
};
pub use config::GroupConfig;
pub use element::Element;
pub use error::{Result, RingweaveError};
pub use group::{ProcessGroup, SyncGroup, TrafficSnapshot};
pub use protocol::Frame;
pub use types::{Rank, ReduceOp, RoundTag, Tag};
