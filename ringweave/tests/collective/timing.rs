use std::time::Duration;

use super::helpers::collect_results;

#[tokio::test]
async fn test_timed_reports_slowest_rank() {
    let results = collect_results(4, |group| async move {
        group
            .timed(async {
                if group.rank() == 3 {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                }
                group.ring_allreduce(&[1.0f64]).await
            })
            .await
            .unwrap()
    })
    .await;

    let slowest = results[0].slowest;
    for timed in &results {
        assert_eq!(timed.value, vec![4.0]);
        assert_eq!(timed.slowest, slowest);
        assert!(timed.slowest >= timed.elapsed);
    }
    assert!(slowest >= Duration::from_millis(30));
}

#[tokio::test]
async fn test_timed_single_rank() {
    let results = collect_results(1, |group| async move {
        group
            .timed(group.butterfly_allreduce(&[5u32]))
            .await
            .unwrap()
    })
    .await;
    assert_eq!(results[0].value, vec![5]);
    assert_eq!(results[0].slowest, results[0].elapsed);
}
