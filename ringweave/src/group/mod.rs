mod bootstrap;
mod collectives;
mod process_group;
mod stats;
mod sync_group;

pub use process_group::ProcessGroup;
pub use stats::TrafficSnapshot;
pub use sync_group::SyncGroup;
