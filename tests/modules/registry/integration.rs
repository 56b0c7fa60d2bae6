//! 注册表模块集成测试

use fuseron::config::{CircuitBreakerConfig, ResilienceConfig};
use fuseron::decorators::decorate_checked_supplier;
use fuseron::error::{CircuitState, FuseError};
use fuseron::health::{HealthReport, HealthStatus};
use fuseron::registry::CircuitBreakerRegistry;
use std::sync::Arc;
use std::time::Duration;

/// 同名重复获取返回同一实例，后续配置参数被忽略
#[test]
fn test_registry_idempotent_per_name() {
    let registry = CircuitBreakerRegistry::new();

    let first = registry.get_or_create("svc");
    let second = registry.get_or_create("svc");
    let strict = CircuitBreakerConfig::builder()
        .failure_threshold(1)
        .wait_interval(Duration::from_millis(1))
        .build()
        .unwrap();
    let third = registry.get_or_create_with("svc", strict);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
    assert!(Arc::ptr_eq(third.config(), first.config()));
    assert_eq!(third.config().failure_threshold(), 3);
}

/// 多线程并发获取同名熔断器
#[test]
fn test_registry_concurrent_get_or_create() {
    let registry = Arc::new(CircuitBreakerRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                (0..100)
                    .map(|n| registry.get_or_create(&format!("svc-{}", (n + i) % 4)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 4);
    assert_eq!(
        registry.names(),
        vec!["svc-0", "svc-1", "svc-2", "svc-3"]
    );
}

/// 从配置文件构建注册表，并通过装饰器驱动健康报告
#[test]
fn test_registry_from_file_and_health() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resilience.toml");
    std::fs::write(
        &path,
        r#"
[default_circuit_breaker]
failure_threshold = 5

[circuit_breakers.payments]
failure_threshold = 1
wait_interval_ms = 60000
ignored_failure_kinds = ["config"]
"#,
    )
    .unwrap();

    let config = ResilienceConfig::from_file(&path).unwrap();
    let registry = CircuitBreakerRegistry::from_config(&config).unwrap();
    let payments = registry.get("payments").unwrap();

    let charge = decorate_checked_supplier(payments.clone(), || {
        Err::<(), _>(FuseError::ConfigError("bad card".to_string()))
    });
    assert!(matches!(charge(), Err(FuseError::ConfigError(_))));
    assert_eq!(payments.state(), CircuitState::Closed);
    assert_eq!(HealthReport::from_registry(&registry).status, HealthStatus::Up);

    let refund = decorate_checked_supplier(payments.clone(), || {
        Err::<(), _>(FuseError::Other("gateway down".to_string()))
    });
    assert!(matches!(refund(), Err(FuseError::Other(_))));
    assert_eq!(payments.state(), CircuitState::Open);

    let report = HealthReport::from_registry(&registry);
    assert_eq!(report.status, HealthStatus::Down);
    assert_eq!(report.circuit_breakers.len(), 1);
    assert_eq!(report.circuit_breakers[0].ignored_calls, 1);
    assert_eq!(report.circuit_breakers[0].failed_calls, 1);

    assert_eq!(
        registry.get_or_create("orders").config().failure_threshold(),
        5
    );
}
