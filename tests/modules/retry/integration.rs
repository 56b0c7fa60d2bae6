//! 重试模块集成测试
//!
//! 重试与熔断器叠加时各自维护独立状态

use fuseron::circuit_breaker::CircuitBreaker;
use fuseron::config::{CircuitBreakerConfig, RetryConfig};
use fuseron::decorators::decorate_checked_supplier;
use fuseron::error::{CircuitState, FuseError};
use fuseron::retry::{decorate_retry, Retry};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn retry(max_attempts: u32) -> Arc<Retry> {
    let config = RetryConfig::builder()
        .max_attempts(max_attempts)
        .wait_interval(Duration::from_millis(1))
        .ignore_failure_kind("circuit_open")
        .build()
        .unwrap();
    Arc::new(Retry::new("backend", config))
}

/// 重试包在熔断器外层：熔断后拒绝错误被重试忽略，立即返回
#[test]
fn test_retry_around_breaker() {
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(2)
        .wait_interval(Duration::from_secs(60))
        .build()
        .unwrap();
    let breaker = Arc::new(CircuitBreaker::new("backend", config));
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let guarded = decorate_checked_supplier(breaker.clone(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(FuseError::Other("down".to_string()))
    });
    let retry = retry(5);
    let resilient = decorate_retry(retry.clone(), guarded);

    let result = resilient();
    assert!(matches!(result, Err(FuseError::CircuitBreakerOpen(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(retry.stats().total_retries(), 2);

    let result = resilient();
    assert!(matches!(result, Err(FuseError::CircuitBreakerOpen(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

/// 熔断器包在重试外层：一次完整的重试序列只记录一次结果
#[test]
fn test_breaker_around_retry() {
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(2)
        .build()
        .unwrap();
    let breaker = Arc::new(CircuitBreaker::new("backend", config));
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let retried = decorate_retry(retry(3), move || {
        if counter.fetch_add(1, Ordering::SeqCst) % 3 == 2 {
            Ok("recovered")
        } else {
            Err(FuseError::Other("flaky".to_string()))
        }
    });
    let guarded = decorate_checked_supplier(breaker.clone(), retried);

    assert_eq!(guarded().unwrap(), "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let stats = breaker.stats();
    assert_eq!(stats.successful_calls, 1);
    assert_eq!(stats.failed_calls, 0);
    assert_eq!(stats.state, CircuitState::Closed);
}
