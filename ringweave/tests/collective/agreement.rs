use ringweave::{GroupConfig, RingweaveError};

use super::helpers::{collect_results_with_config, run_collective};

fn assert_length_mismatch(err: &RingweaveError, min: usize, max: usize) {
    match err {
        RingweaveError::InvalidVectorLength {
            min: got_min,
            max: got_max,
            ..
        } => {
            assert_eq!((*got_min, *got_max), (min, max));
        }
        other => panic!("expected InvalidVectorLength, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ring_rejects_mismatched_lengths_on_every_rank() {
    run_collective(4, |group| async move {
        let len = if group.rank() == 2 { 3 } else { 2 };
        let local = vec![1.0f64; len];

        let err = group.ring_allreduce(&local).await.unwrap_err();
        assert_length_mismatch(&err, 2, 3);
        assert_eq!(group.traffic().rounds, 0);
    })
    .await;
}

#[tokio::test]
async fn test_butterfly_rejects_mismatched_lengths() {
    run_collective(4, |group| async move {
        let len = group.rank() as usize;
        let err = group.butterfly_allreduce(&vec![1i64; len]).await.unwrap_err();
        assert_length_mismatch(&err, 0, 3);
    })
    .await;
}

#[tokio::test]
async fn test_scan_rejects_mismatched_lengths() {
    run_collective(3, |group| async move {
        let len = if group.rank() == 0 { 5 } else { 4 };
        let err = group.ring_prefix_scan(&vec![0u32; len]).await.unwrap_err();
        assert_length_mismatch(&err, 4, 5);
        assert!(err.is_precondition());
    })
    .await;
}

#[tokio::test]
async fn test_vector_over_limit_fails_whole_group() {
    let config = GroupConfig::default().with_max_vector_len(4);
    let results = collect_results_with_config(3, config, |group| async move {
        let len = if group.rank() == 1 { 5 } else { 4 };
        group.ring_allreduce(&vec![1u64; len]).await
    })
    .await;

    for result in results {
        match result {
            Err(RingweaveError::InvalidVectorLength { limit, .. }) => assert_eq!(limit, 4),
            other => panic!("expected InvalidVectorLength, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_equal_lengths_over_limit_still_fail() {
    let config = GroupConfig::default().with_max_vector_len(2);
    let results = collect_results_with_config(2, config, |group| async move {
        group.ring_allreduce(&[1u64, 2, 3]).await
    })
    .await;

    assert!(
        results
            .iter()
            .all(|r| matches!(r, Err(RingweaveError::InvalidVectorLength { min: 3, max: 3, .. })))
    );
}

#[tokio::test]
async fn test_group_usable_after_failed_agreement() {
    run_collective(3, |group| async move {
        let bad = vec![1i64; group.rank() as usize + 1];
        assert!(group.ring_allreduce(&bad).await.is_err());

        let out = group.ring_allreduce(&[group.rank() as i64]).await.unwrap();
        assert_eq!(out, vec![3]);
    })
    .await;
}
