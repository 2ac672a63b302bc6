// RetryPolicy tests: attempt accounting, delay bounds, exhaustion.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use hostwatch::retry::RetryPolicy;

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_transient_failures() {
    let policy = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_millis(20));
    let calls = Arc::new(AtomicU32::new(0));
    let calls_in_op = calls.clone();
    let result = policy
        .execute("flaky_op", move || {
            let calls = calls_in_op.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 5 { Err("boom") } else { Ok(n) }
            }
        })
        .await;
    assert_eq!(result.unwrap(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 5, "4 failures then success");
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_after_exactly_max_attempts() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2));
    let calls = Arc::new(AtomicU32::new(0));
    let calls_in_op = calls.clone();
    let result: Result<(), _> = policy
        .execute("doomed_op", move || {
            let calls = calls_in_op.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("nope")
            }
        })
        .await;
    let exhausted = result.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(exhausted.attempts.len(), 3, "one recorded error per attempt");
    assert!(exhausted.attempts.iter().all(|e| e == "nope"));
    assert_eq!(exhausted.operation, "doomed_op");
    assert!(exhausted.to_string().contains("doomed_op"));
}

#[tokio::test(start_paused = true)]
async fn test_delays_stay_within_configured_bounds() {
    let min = Duration::from_millis(50);
    let max = Duration::from_millis(100);
    let policy = RetryPolicy::new(4, min, max);
    let start = tokio::time::Instant::now();
    let result: Result<(), _> = policy
        .execute("timed_op", || async { Err::<(), _>("fail") })
        .await;
    assert!(result.is_err());
    // 3 sleeps between 4 attempts, each drawn from [min, max]
    let elapsed = start.elapsed();
    assert!(elapsed >= min * 3, "elapsed {:?} below 3x min delay", elapsed);
    assert!(elapsed <= max * 3 + Duration::from_millis(5), "elapsed {:?} above 3x max delay", elapsed);
}

#[tokio::test]
async fn test_single_attempt_policy_never_sleeps() {
    let policy = RetryPolicy::new(1, Duration::from_secs(60), Duration::from_secs(60));
    let start = std::time::Instant::now();
    let result: Result<(), _> = policy
        .execute("one_shot", || async { Err::<(), _>("fail") })
        .await;
    let exhausted = result.unwrap_err();
    assert_eq!(exhausted.attempts.len(), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_first_try_success_records_no_failures() {
    let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(1));
    let result = policy
        .execute("clean_op", || async { Ok::<_, &str>(42) })
        .await;
    assert_eq!(result.unwrap(), 42);
}
