//! Ring and butterfly all-reduce across 4 ranks.
//!
//! Rank `r` contributes the vector `[r, r+1, ..., r+n-1]`. Both algorithms
//! leave every rank with the element-wise sum; the slowest rank's time is
//! reported for each.
//!
//! ```bash
//! cargo run --example allreduce -- 8
//! ```

use ringweave::ProcessGroup;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ringweave::Result<()> {
    let n: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(8);
    let world_size = 4u32;

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
            let local: Vec<f64> = (0..n).map(|i| (rank as usize + i) as f64).collect();

            let ring = g.timed(g.ring_allreduce(&local)).await?;
            let butterfly = g.timed(g.butterfly_allreduce(&local)).await?;
            ringweave::Result::Ok((rank, local, ring, butterfly))
        }));
    }

    for h in handles {
        let (rank, local, ring, butterfly) = h.await.unwrap()?;
        println!("rank {rank}: input {local:?}");
        println!(
            "rank {rank}: ring      {:?} (slowest {:?})",
            ring.value, ring.slowest
        );
        println!(
            "rank {rank}: butterfly {:?} (slowest {:?})",
            butterfly.value, butterfly.slowest
        );
    }

    Ok(())
}
