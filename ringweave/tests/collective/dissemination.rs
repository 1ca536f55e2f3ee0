use ringweave::{ReduceOp, RingweaveError};

use super::helpers::run_collective;

#[tokio::test]
async fn test_dissemination_min_max_non_power_of_two() {
    for world in [2u32, 3, 5, 6, 7] {
        run_collective(world, |group| async move {
            let rank = group.rank() as i64;
            let local = vec![rank, -rank, 100 - rank];
            let last = group.world_size() as i64 - 1;

            let min = group
                .dissemination_allreduce(&local, ReduceOp::Min)
                .await
                .unwrap();
            assert_eq!(min, vec![0, -last, 100 - last]);

            let max = group
                .dissemination_allreduce(&local, ReduceOp::Max)
                .await
                .unwrap();
            assert_eq!(max, vec![last, 0, 100]);
        })
        .await;
    }
}

#[tokio::test]
async fn test_dissemination_rejects_sum() {
    run_collective(3, |group| async move {
        let err = group
            .dissemination_allreduce(&[1.0f64], ReduceOp::Sum)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RingweaveError::UnsupportedOp {
                op: ReduceOp::Sum,
                ..
            }
        ));
        assert_eq!(group.traffic().messages_sent, 0);
    })
    .await;
}

#[tokio::test]
async fn test_dissemination_does_not_count_rounds() {
    run_collective(4, |group| async move {
        group
            .dissemination_allreduce(&[group.rank() as f32], ReduceOp::Max)
            .await
            .unwrap();
        assert_eq!(group.traffic().rounds, 0);
    })
    .await;
}
