//! Collective algorithms over a [`ProcessGroup`](crate::ProcessGroup).
//!
//! Each collective first agrees on the vector length across the group, then
//! runs its payload rounds under round tags drawn from the group's sequence
//! counter. Only tagged point-to-point messages are used; the barrier uses
//! control frames.

mod agreement;
mod allreduce;
mod barrier;
mod butterfly;
mod dissemination;
mod helpers;
mod scan;
mod timing;

pub use allreduce::ring_allreduce;
pub use barrier::barrier;
pub use butterfly::butterfly_allreduce;
pub use dissemination::dissemination_allreduce;
pub use scan::{ScanRole, ring_prefix_scan};
pub use timing::{Timed, timed};

pub(crate) use timing::slowest_elapsed;
