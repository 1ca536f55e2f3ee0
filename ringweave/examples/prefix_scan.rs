//! Ring prefix scan across 5 ranks.
//!
//! Rank `r` contributes `n` copies of `r + 1`; afterwards rank `r` holds
//! `1 + 2 + ... + (r + 1)` in every slot.
//!
//! ```bash
//! cargo run --example prefix_scan -- 4
//! ```

use ringweave::ProcessGroup;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ringweave::Result<()> {
    let n: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(4);
    let world_size = 5u32;

    let groups: Vec<Arc<ProcessGroup>> = ProcessGroup::bootstrap_local(world_size)
        .await?
        .into_iter()
        .map(Arc::new)
        .collect();

    let mut handles = Vec::new();
    for group in &groups {
        let g = Arc::clone(group);
        handles.push(tokio::spawn(async move {
            let rank = g.rank();
            let local = vec![rank as i64 + 1; n];
            let prefix = g.timed(g.ring_prefix_scan(&local)).await?;
            ringweave::Result::Ok((rank, prefix))
        }));
    }

    for h in handles {
        let (rank, prefix) = h.await.unwrap()?;
        println!(
            "rank {rank}: {:?} (local {:?}, slowest {:?})",
            prefix.value, prefix.elapsed, prefix.slowest
        );
    }
    // rank 0: [1, 1, 1, 1] ...
    // rank 4: [15, 15, 15, 15] ...

    Ok(())
}
