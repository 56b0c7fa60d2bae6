//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 调用指标
//!
//! 装饰器可以把调用耗时和结果写入 [`MetricsSink`]。指标不属于熔断器状态机，
//! 只是可选的观测钩子。
//!
//! - [`InMemoryMetrics`]: 进程内计数，始终可用
//! - [`PrometheusMetrics`]: Prometheus 指标（需要 `monitoring` feature）

use crate::decorators::BoxFuture;
use crate::error::{ClassifyFailure, FailureKind};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 调用结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallOutcome {
    /// 调用成功
    Success,
    /// 调用失败
    Failure,
    /// 熔断器拒绝调用
    Rejected,
}

impl CallOutcome {
    /// 根据调用结果判断
    pub fn of<T, E: ClassifyFailure>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => CallOutcome::Success,
            Err(e) if e.failure_kind() == FailureKind::CIRCUIT_OPEN => CallOutcome::Rejected,
            Err(_) => CallOutcome::Failure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::Rejected => "rejected",
        }
    }
}

/// 指标接收端
pub trait MetricsSink: Send + Sync {
    fn record(&self, name: &str, duration: Duration, outcome: CallOutcome);
}

/// 单个名称的调用指标
#[derive(Debug, Default)]
struct CallMetrics {
    successful: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
    total_duration_micros: AtomicU64,
}

/// 调用指标快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetricsSnapshot {
    pub successful: u64,
    pub failed: u64,
    pub rejected: u64,
    pub total_duration: Duration,
}

impl CallMetricsSnapshot {
    pub fn total_calls(&self) -> u64 {
        self.successful + self.failed + self.rejected
    }
}

/// 进程内指标
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    calls: DashMap<String, CallMetrics>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定名称的指标快照
    pub fn snapshot(&self, name: &str) -> Option<CallMetricsSnapshot> {
        self.calls.get(name).map(|metrics| CallMetricsSnapshot {
            successful: metrics.successful.load(Ordering::Relaxed),
            failed: metrics.failed.load(Ordering::Relaxed),
            rejected: metrics.rejected.load(Ordering::Relaxed),
            total_duration: Duration::from_micros(
                metrics.total_duration_micros.load(Ordering::Relaxed),
            ),
        })
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record(&self, name: &str, duration: Duration, outcome: CallOutcome) {
        let metrics = self.calls.entry(name.to_string()).or_default();
        let counter = match outcome {
            CallOutcome::Success => &metrics.successful,
            CallOutcome::Failure => &metrics.failed,
            CallOutcome::Rejected => &metrics.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        metrics
            .total_duration_micros
            .fetch_add(micros, Ordering::Relaxed);
    }
}

#[cfg(feature = "monitoring")]
pub use self::prometheus_sink::PrometheusMetrics;

#[cfg(feature = "monitoring")]
mod prometheus_sink {
    use super::{CallOutcome, MetricsSink};
    use crate::constants::CALL_DURATION_BUCKETS;
    use crate::error::FuseError;
    use prometheus::{
        Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
    };
    use std::time::Duration;

    /// Prometheus 指标
    #[derive(Clone)]
    pub struct PrometheusMetrics {
        calls_total: IntCounterVec,
        call_duration: HistogramVec,
        registry: Registry,
    }

    impl PrometheusMetrics {
        /// 创建并注册指标
        pub fn new() -> Result<Self, FuseError> {
            let registry = Registry::new();

            let calls_total = IntCounterVec::new(
                Opts::new("fuseron_calls_total", "Total number of decorated calls"),
                &["name", "outcome"],
            )
            .map_err(|e| FuseError::MetricsError(e.to_string()))?;

            let call_duration = HistogramVec::new(
                HistogramOpts::new(
                    "fuseron_call_duration_seconds",
                    "Duration of decorated calls in seconds",
                )
                .buckets(CALL_DURATION_BUCKETS.to_vec()),
                &["name"],
            )
            .map_err(|e| FuseError::MetricsError(e.to_string()))?;

            registry
                .register(Box::new(calls_total.clone()))
                .map_err(|e| FuseError::MetricsError(e.to_string()))?;
            registry
                .register(Box::new(call_duration.clone()))
                .map_err(|e| FuseError::MetricsError(e.to_string()))?;

            Ok(Self {
                calls_total,
                call_duration,
                registry,
            })
        }

        pub fn registry(&self) -> &Registry {
            &self.registry
        }

        /// 导出文本格式指标
        pub fn render(&self) -> Result<String, FuseError> {
            let mut buffer = Vec::new();
            TextEncoder::new()
                .encode(&self.registry.gather(), &mut buffer)
                .map_err(|e| FuseError::MetricsError(e.to_string()))?;
            String::from_utf8(buffer).map_err(|e| FuseError::MetricsError(e.to_string()))
        }
    }

    impl MetricsSink for PrometheusMetrics {
        fn record(&self, name: &str, duration: Duration, outcome: CallOutcome) {
            self.calls_total
                .with_label_values(&[name, outcome.as_str()])
                .inc();
            self.call_duration
                .with_label_values(&[name])
                .observe(duration.as_secs_f64());
        }
    }

}

/// 包装可能失败的无参函数，记录耗时和结果
pub fn decorate_timed<T, E, F>(
    sink: Arc<dyn MetricsSink>,
    name: impl Into<String>,
    supplier: F,
) -> impl Fn() -> Result<T, E>
where
    F: Fn() -> Result<T, E>,
    E: ClassifyFailure,
{
    let name = name.into();
    move || {
        let start = Instant::now();
        let result = supplier();
        sink.record(&name, start.elapsed(), CallOutcome::of(&result));
        result
    }
}

/// 包装返回 Future 的无参函数，记录耗时和结果
pub fn decorate_timed_async<T, E, F, Fut>(
    sink: Arc<dyn MetricsSink>,
    name: impl Into<String>,
    supplier: F,
) -> impl Fn() -> BoxFuture<Result<T, E>>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: ClassifyFailure + Send + 'static,
{
    let name: String = name.into();
    let name: Arc<str> = Arc::from(name);
    move || {
        let sink = sink.clone();
        let name = name.clone();
        let future = supplier();
        Box::pin(async move {
            let start = Instant::now();
            let result = future.await;
            sink.record(&name, start.elapsed(), CallOutcome::of(&result));
            result
        })
    }
}
