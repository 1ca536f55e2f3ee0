use super::helpers::run_collective;

#[tokio::test]
async fn test_barrier_4_ranks() {
    run_collective(4, |group| async move {
        group.barrier().await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn test_barrier_5_ranks_dissemination() {
    run_collective(5, |group| async move {
        group.barrier().await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn test_barrier_2_ranks_double() {
    run_collective(2, |group| async move {
        group.barrier().await.unwrap();
        group.barrier().await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn test_barrier_single_rank() {
    run_collective(1, |group| async move {
        group.barrier().await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn test_barrier_between_collectives() {
    run_collective(6, |group| async move {
        let rank = group.rank() as i64;
        let before = group.traffic();
        group.barrier().await.unwrap();
        // Barrier traffic uses the control lane only.
        assert_eq!(group.traffic(), before);

        let total = group.ring_allreduce(&[rank]).await.unwrap();
        group.barrier().await.unwrap();
        let prefix = group.ring_prefix_scan(&[rank]).await.unwrap();
        assert_eq!(total, vec![15]);
        assert_eq!(prefix, vec![rank * (rank + 1) / 2]);
    })
    .await;
}
