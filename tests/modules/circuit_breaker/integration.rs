//! 熔断器模块集成测试
//!
//! 覆盖状态机的阈值、恢复、忽略分类和并发场景

use fuseron::circuit_breaker::CircuitBreaker;
use fuseron::clock::ManualClock;
use fuseron::config::CircuitBreakerConfig;
use fuseron::error::{CircuitState, FailureKind, FuseError};
use std::sync::Arc;
use std::time::Duration;

fn manual_breaker(
    threshold: u32,
    wait: Duration,
    ignored: &[&'static str],
) -> (Arc<CircuitBreaker>, ManualClock) {
    let clock = ManualClock::new();
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(threshold)
        .wait_interval(wait)
        .ignore_failure_kinds(ignored.iter().copied())
        .build()
        .unwrap();
    let breaker = CircuitBreaker::with_clock("backend", config, Arc::new(clock.clone()));
    (Arc::new(breaker), clock)
}

/// 阈值为1、等待1000ms的完整恢复流程
#[test]
fn test_single_failure_recovery_scenario() {
    let (breaker, clock) = manual_breaker(1, Duration::from_millis(1000), &[]);

    breaker.record_failure(&FailureKind::ERROR);
    assert_eq!(breaker.state(), CircuitState::Open);

    clock.advance(Duration::from_millis(500));
    assert!(!breaker.is_call_permitted());

    clock.advance(Duration::from_millis(500));
    assert!(breaker.is_call_permitted());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);

    breaker.record_success();
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);
}

/// 阈值为3时第三次失败熔断，打开状态下的第四次失败不改变恢复时间
#[test]
fn test_fourth_failure_while_open() {
    let (breaker, clock) = manual_breaker(3, Duration::from_secs(5), &[]);

    breaker.record_failure(&FailureKind::ERROR);
    breaker.record_failure(&FailureKind::ERROR);
    assert_eq!(breaker.state(), CircuitState::Closed);
    breaker.record_failure(&FailureKind::ERROR);
    assert_eq!(breaker.state(), CircuitState::Open);

    let retry_after = breaker.retry_after().unwrap();
    clock.advance(Duration::from_secs(2));
    breaker.record_failure(&FailureKind::ERROR);

    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(breaker.retry_after(), Some(retry_after));
}

/// 被忽略的超时分类不影响关闭状态
#[test]
fn test_ignored_timeout_kind() {
    let (breaker, _clock) = manual_breaker(1, Duration::from_secs(5), &["TimeoutKind"]);

    breaker.record_failure(&FailureKind::from("TimeoutKind"));
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);
}

/// 打开后只有到达恢复时间的那次检查切换到半开
#[test]
fn test_permission_denied_until_retry_after() {
    let (breaker, clock) = manual_breaker(2, Duration::from_millis(300), &[]);
    breaker.record_failure(&FailureKind::ERROR);
    breaker.record_failure(&FailureKind::ERROR);

    for _ in 0..10 {
        clock.advance(Duration::from_millis(29));
        assert!(!breaker.is_call_permitted());
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    clock.advance(Duration::from_millis(10));
    assert!(breaker.is_call_permitted());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert_eq!(breaker.stats().times_opened, 1);
}

/// 多次开合循环中计数只在进入关闭状态时清零
#[test]
fn test_repeated_open_close_cycles() {
    let (breaker, clock) = manual_breaker(2, Duration::from_millis(100), &[]);

    for cycle in 1..=3u64 {
        breaker.record_failure(&FailureKind::ERROR);
        breaker.record_failure(&FailureKind::ERROR);
        assert_eq!(breaker.state(), CircuitState::Open);

        clock.advance(Duration::from_millis(100));
        assert!(breaker.is_call_permitted());
        breaker.record_failure(&FailureKind::ERROR);
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(breaker.consecutive_failures(), 3);

        clock.advance(Duration::from_millis(100));
        assert!(breaker.is_call_permitted());
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(), 0);
        assert_eq!(breaker.stats().times_opened, cycle * 2);
    }
}

/// 并发失败不会丢失计数，且只熔断一次
#[test]
fn test_concurrent_record_failure_no_lost_updates() {
    let (breaker, _clock) = manual_breaker(10, Duration::from_secs(60), &[]);
    let threads = 32u64;
    let per_thread = 50u64;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let breaker = breaker.clone();
            std::thread::spawn(move || {
                for _ in 0..per_thread {
                    breaker.record_failure(&FailureKind::ERROR);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = breaker.stats();
    assert_eq!(stats.state, CircuitState::Open);
    assert_eq!(stats.consecutive_failures, threads * per_thread);
    assert_eq!(stats.failed_calls, threads * per_thread);
    assert_eq!(stats.times_opened, 1);
}

/// 并发任务通过 execute 调用同一个熔断器
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_execute_tasks() {
    let (breaker, _clock) = manual_breaker(5, Duration::from_secs(60), &[]);

    let mut handles = Vec::new();
    for i in 0..20 {
        let breaker = breaker.clone();
        handles.push(tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    Err::<(), FuseError>(FuseError::Other(format!("task {}", i)))
                })
                .await
        }));
    }

    let mut failed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Err(FuseError::CircuitBreakerOpen(_)) => rejected += 1,
            Err(_) => failed += 1,
            Ok(_) => panic!("call should not succeed"),
        }
    }

    let stats = breaker.stats();
    assert_eq!(stats.state, CircuitState::Open);
    assert_eq!(stats.times_opened, 1);
    assert!(failed >= 5);
    assert_eq!(failed + rejected, 20);
    assert_eq!(stats.failed_calls, failed);
    assert_eq!(stats.rejected_calls, rejected);
}

/// 使用系统时钟的真实等待
#[tokio::test]
async fn test_auto_recovery_with_system_clock() {
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(2)
        .wait_interval(Duration::from_millis(100))
        .build()
        .unwrap();
    let breaker = CircuitBreaker::new("real_time", config);

    for _ in 0..2 {
        let _ = breaker
            .execute(|| async { Err::<(), FuseError>(FuseError::Other("down".to_string())) })
            .await;
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let result = breaker
        .execute(|| async { Ok::<(), FuseError>(()) })
        .await;
    assert!(result.is_ok());
    assert_eq!(breaker.state(), CircuitState::Closed);
}
