use ringweave::RingweaveError;

use super::helpers::{collect_results, run_collective};

#[tokio::test]
async fn test_butterfly_4_ranks_scalar() {
    run_collective(4, |group| async move {
        let local = vec![(group.rank() + 1) as f64];
        let before = group.traffic();

        let out = group.butterfly_allreduce(&local).await.unwrap();
        assert_eq!(out, vec![10.0], "rank {} butterfly result", group.rank());
        assert_eq!(group.traffic().since(&before).rounds, 2);
    })
    .await;
}

#[tokio::test]
async fn test_butterfly_8_ranks_vector() {
    run_collective(8, |group| async move {
        let rank = group.rank() as u64;
        let local = vec![rank, 1, rank * rank];
        let out = group.butterfly_allreduce(&local).await.unwrap();
        assert_eq!(out, vec![28, 8, 140]);
        assert_eq!(group.traffic().rounds, 3);
    })
    .await;
}

#[tokio::test]
async fn test_butterfly_rejects_non_power_of_two() {
    for world in [3u32, 6] {
        run_collective(world, |group| async move {
            let err = group.butterfly_allreduce(&[1.0f64]).await.unwrap_err();
            assert!(
                matches!(err, RingweaveError::InvalidGroupSize { world_size, .. } if world_size == group.world_size()),
                "got: {err:?}"
            );
            let traffic = group.traffic();
            assert_eq!(traffic.messages_sent, 0);
            assert_eq!(traffic.rounds, 0);
        })
        .await;
    }
}

#[tokio::test]
async fn test_butterfly_single_rank() {
    run_collective(1, |group| async move {
        let out = group.butterfly_allreduce(&[2.5f32]).await.unwrap();
        assert_eq!(out, vec![2.5]);
        assert_eq!(group.traffic().rounds, 0);
    })
    .await;
}

#[tokio::test]
async fn test_butterfly_bitwise_identical_across_ranks() {
    let results = collect_results(8, |group| async move {
        let r = group.rank() as f64;
        let local = vec![0.1 * (r + 1.0), 1.0 / (r + 3.0), -1e-7 * r];
        group.butterfly_allreduce(&local).await.unwrap()
    })
    .await;

    let reference: Vec<u64> = results[0].iter().map(|v| v.to_bits()).collect();
    for (rank, result) in results.iter().enumerate() {
        let bits: Vec<u64> = result.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, reference, "rank {rank} diverged");
    }
}

#[tokio::test]
async fn test_butterfly_matches_ring() {
    run_collective(4, |group| async move {
        let rank = group.rank() as f64;
        let local: Vec<f64> = (0..6).map(|i| rank * 4.0 - i as f64 * 0.5).collect();

        let ring = group.ring_allreduce(&local).await.unwrap();
        let butterfly = group.butterfly_allreduce(&local).await.unwrap();
        assert_eq!(ring, butterfly);
    })
    .await;
}

#[tokio::test]
async fn test_butterfly_permutation_invariant() {
    let inputs: [i64; 4] = [5, -2, 9, 30];

    let straight = collect_results(4, move |group| async move {
        let local = vec![inputs[group.rank() as usize], 1];
        group.butterfly_allreduce(&local).await.unwrap()
    })
    .await;

    let rotated = collect_results(4, move |group| async move {
        let local = vec![inputs[(group.rank() as usize + 1) % 4], 1];
        group.butterfly_allreduce(&local).await.unwrap()
    })
    .await;

    assert!(straight.iter().all(|r| r == &vec![42, 4]));
    assert_eq!(straight, rotated);
}

#[tokio::test]
async fn test_butterfly_empty_vector() {
    run_collective(2, |group| async move {
        let out = group.butterfly_allreduce::<i64>(&[]).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(group.traffic().rounds, 0);
    })
    .await;
}
