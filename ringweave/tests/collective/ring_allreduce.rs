use super::helpers::{collect_results, run_collective};

#[tokio::test]
async fn test_ring_allreduce_4_ranks_scalar() {
    run_collective(4, |group| async move {
        let local = vec![(group.rank() + 1) as f64];
        let before = group.traffic();

        let out = group.ring_allreduce(&local).await.unwrap();
        assert_eq!(out, vec![10.0], "rank {} ring result", group.rank());

        let delta = group.traffic().since(&before);
        assert_eq!(delta.rounds, 3);
        // Two agreement rounds plus three ring rounds.
        assert_eq!(delta.messages_sent, 5);
    })
    .await;
}

#[tokio::test]
async fn test_ring_allreduce_3_ranks_vector() {
    run_collective(3, |group| async move {
        let rank = group.rank() as i64;
        let local: Vec<i64> = (0..5).map(|i| rank * 10 + i).collect();

        let out = group.ring_allreduce(&local).await.unwrap();
        // Sum over ranks 0..3 of (rank * 10 + i) = 30 + 3i.
        let expected: Vec<i64> = (0..5).map(|i| 30 + 3 * i).collect();
        assert_eq!(out, expected);
    })
    .await;
}

#[tokio::test]
async fn test_ring_allreduce_5_ranks_f32() {
    run_collective(5, |group| async move {
        let out = group.ring_allreduce(&[1.0f32; 16]).await.unwrap();
        assert_eq!(out, vec![5.0f32; 16]);
        assert_eq!(group.traffic().rounds, 4);
    })
    .await;
}

#[tokio::test]
async fn test_ring_allreduce_single_rank() {
    run_collective(1, |group| async move {
        let out = group.ring_allreduce(&[3u32, 4, 5]).await.unwrap();
        assert_eq!(out, vec![3, 4, 5]);
        let traffic = group.traffic();
        assert_eq!(traffic.rounds, 0);
        assert_eq!(traffic.messages_sent, 0);
    })
    .await;
}

#[tokio::test]
async fn test_ring_allreduce_empty_vector() {
    run_collective(4, |group| async move {
        let out = group.ring_allreduce::<f64>(&[]).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(group.traffic().rounds, 0);
    })
    .await;
}

#[tokio::test]
async fn test_ring_allreduce_permutation_invariant() {
    let inputs: [i64; 4] = [7, -3, 12, 40];

    let straight = collect_results(4, move |group| async move {
        let local = vec![inputs[group.rank() as usize]];
        group.ring_allreduce(&local).await.unwrap()
    })
    .await;

    let rotated = collect_results(4, move |group| async move {
        let local = vec![inputs[(group.rank() as usize + 2) % 4]];
        group.ring_allreduce(&local).await.unwrap()
    })
    .await;

    assert!(straight.iter().all(|r| r == &vec![56]));
    assert_eq!(straight, rotated);
}

#[tokio::test]
async fn test_ring_allreduce_back_to_back() {
    run_collective(4, |group| async move {
        let rank = group.rank() as u64;
        let first = group.ring_allreduce(&[rank]).await.unwrap();
        let second = group.ring_allreduce(&[rank * 2, 1]).await.unwrap();
        assert_eq!(first, vec![6]);
        assert_eq!(second, vec![12, 4]);
    })
    .await;
}

#[tokio::test]
async fn test_ring_allreduce_integer_sum_wraps() {
    run_collective(2, |group| async move {
        let out = group.ring_allreduce(&[i32::MAX]).await.unwrap();
        assert_eq!(out, vec![-2]);
    })
    .await;
}
