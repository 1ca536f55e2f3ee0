use ringweave::{GroupConfig, ProcessGroup};
use std::future::Future;
use std::sync::Arc;

/// Helper: run a collective operation across N ranks concurrently.
/// Keeps all groups alive until every task completes.
pub async fn run_collective<F, Fut>(world_size: u32, f: F)
where
    F: Fn(Arc<ProcessGroup>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    collect_results(world_size, f).await;
}

/// Like [`run_collective`], returning each rank's output in rank order.
pub async fn collect_results<F, Fut, T>(world_size: u32, f: F) -> Vec<T>
where
    F: Fn(Arc<ProcessGroup>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    collect_results_with_config(world_size, GroupConfig::default(), f).await
}

pub async fn collect_results_with_config<F, Fut, T>(
    world_size: u32,
    config: GroupConfig,
    f: F,
) -> Vec<T>
where
    F: Fn(Arc<ProcessGroup>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let groups: Vec<Arc<ProcessGroup>> =
        ProcessGroup::bootstrap_local_with_config(world_size, config)
            .await
            .unwrap()
            .into_iter()
            .map(Arc::new)
            .collect();

    let f = Arc::new(f);
    let mut handles = Vec::new();
    for g in &groups {
        let g = Arc::clone(g);
        let f = Arc::clone(&f);
        handles.push(tokio::spawn(async move { f(g).await }));
    }
    let mut results = Vec::with_capacity(handles.len());
    for h in handles {
        results.push(h.await.unwrap());
    }
    // `groups` dropped here; all tasks already complete.
    results
}
