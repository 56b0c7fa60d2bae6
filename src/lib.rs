//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Fuseron - Circuit Breaker and Retry Decorators
//!
//! Guards calls to unreliable backends: after repeated failures the circuit
//! opens and calls fail fast, then a probe call decides whether to close it again.
//!
//! # API Layers
//!
//! ## Prelude (Quick Start)
//!
//! Use `use fuseron::prelude::*;` to import all commonly used types.
//!
//! ## Core API
//!
//! - [`CircuitBreaker`] - The circuit breaker state machine
//! - [`CircuitBreakerConfig`] - Immutable breaker configuration
//! - [`CircuitBreakerRegistry`] - Named breaker instances with get-or-create
//! - [`FuseError`] / [`CircuitBreakerOpenError`] - Error types
//!
//! ## Decorators
//!
//! Higher-order functions in [`decorators`], [`retry`] and [`metrics`] wrap a
//! callable and return one with the same shape, so they can be stacked freely.
//!
//! ## Extensions (feature-gated)
//!
//! - Prometheus metrics sink (requires `monitoring` feature)
//! - Tracing subscriber initialisation (requires `telemetry` feature)
//!
//! # Examples
//!
//! ```rust
//! use fuseron::prelude::*;
//! use std::time::Duration;
//!
//! let registry = CircuitBreakerRegistry::with_default_config(
//!     CircuitBreakerConfig::builder()
//!         .failure_threshold(2)
//!         .wait_interval(Duration::from_secs(30))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let breaker = registry.get_or_create("inventory");
//! let lookup = decorate_checked_supplier(breaker.clone(), || {
//!     Err::<u32, FuseError>(FuseError::Other("backend down".to_string()))
//! });
//!
//! assert!(lookup().is_err());
//! assert!(lookup().is_err());
//! assert_eq!(breaker.state(), CircuitState::Open);
//! assert!(matches!(lookup(), Err(FuseError::CircuitBreakerOpen(_))));
//! ```
//!
//! # Features
//!
//! - **Consecutive-failure threshold**: Closed → Open after N non-ignored failures
//! - **Lazy recovery**: Open → HalfOpen is evaluated on the next permission check
//! - **Failure classification**: ignored failure kinds never affect breaker health
//! - **Retry**: fixed-interval retry with its own ignore list
//! - **Monitoring**: in-memory and Prometheus call metrics, health reports

pub mod prelude;

pub mod circuit_breaker;
pub mod clock;
pub mod config;
pub mod constants;
pub mod decorators;
pub mod error;
pub mod health;
pub mod metrics;
pub mod registry;
pub mod retry;
#[cfg(feature = "telemetry")]
pub mod telemetry;

// 重新导出常用类型
pub use circuit_breaker::CircuitBreaker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitBreakerSettings, ResilienceConfig,
    RetryConfig, RetryConfigBuilder, RetrySettings,
};
pub use decorators::{
    decorate_async_supplier, decorate_checked_function, decorate_checked_supplier,
    decorate_function, decorate_supplier, BoxFuture,
};
pub use error::{
    CircuitBreakerOpenError, CircuitBreakerStats, CircuitState, ClassifyFailure, FailureKind,
    FuseError,
};
pub use health::{HealthReport, HealthStatus};
#[cfg(feature = "monitoring")]
pub use metrics::PrometheusMetrics;
pub use metrics::{
    decorate_timed, decorate_timed_async, CallMetricsSnapshot, CallOutcome, InMemoryMetrics,
    MetricsSink,
};
pub use registry::CircuitBreakerRegistry;
pub use retry::{decorate_retry, decorate_retry_async, Retry, RetryStats};
#[cfg(feature = "telemetry")]
pub use telemetry::{init_tracing, TelemetryConfig};
