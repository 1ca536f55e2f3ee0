use super::helpers::{collect_results, run_collective};

#[tokio::test]
async fn test_prefix_scan_4_ranks_scalar() {
    let inputs: [i64; 4] = [2, 1, 3, 0];
    let results = collect_results(4, move |group| async move {
        let local = vec![inputs[group.rank() as usize]];
        group.ring_prefix_scan(&local).await.unwrap()
    })
    .await;

    assert_eq!(results, vec![vec![2], vec![3], vec![6], vec![6]]);
}

#[tokio::test]
async fn test_prefix_scan_5_ranks_vector() {
    run_collective(5, |group| async move {
        let rank = group.rank() as i32;
        let local = vec![1, rank, -rank];

        let out = group.ring_prefix_scan(&local).await.unwrap();
        let triangular = rank * (rank + 1) / 2;
        assert_eq!(out, vec![rank + 1, triangular, -triangular]);
    })
    .await;
}

#[tokio::test]
async fn test_prefix_scan_last_rank_matches_allreduce() {
    run_collective(4, |group| async move {
        let rank = group.rank() as f64;
        let local = vec![rank + 0.5, rank * rank];

        let prefix = group.ring_prefix_scan(&local).await.unwrap();
        let total = group.ring_allreduce(&local).await.unwrap();

        if group.rank() == 0 {
            assert_eq!(prefix, local);
        }
        if group.rank() + 1 == group.world_size() {
            assert_eq!(prefix, total);
        }
    })
    .await;
}

#[tokio::test]
async fn test_prefix_scan_rounds_per_role() {
    run_collective(4, |group| async move {
        group.ring_prefix_scan(&[1u64]).await.unwrap();
        let expected = match group.rank() {
            0 | 3 => 1,
            _ => 2,
        };
        assert_eq!(group.traffic().rounds, expected, "rank {}", group.rank());
    })
    .await;
}

#[tokio::test]
async fn test_prefix_scan_single_rank() {
    run_collective(1, |group| async move {
        let out = group.ring_prefix_scan(&[9i64, -9]).await.unwrap();
        assert_eq!(out, vec![9, -9]);
        assert_eq!(group.traffic().messages_sent, 0);
    })
    .await;
}

#[tokio::test]
async fn test_prefix_scan_empty_vector() {
    run_collective(3, |group| async move {
        let out = group.ring_prefix_scan::<i32>(&[]).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(group.traffic().rounds, 0);
    })
    .await;
}
