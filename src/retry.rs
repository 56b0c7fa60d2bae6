//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 重试实现
//!
//! 以固定间隔重新调用失败的操作，最多 `max_attempts` 次（包含首次调用）。
//! 被忽略的失败分类立即返回，不再重试。重试状态与熔断器相互独立，
//! 因此可以和熔断装饰器任意叠加。

use crate::config::RetryConfig;
use crate::decorators::BoxFuture;
use crate::error::ClassifyFailure;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 重试统计
#[derive(Debug, Default)]
pub struct RetryStats {
    /// 总重试次数
    total_retries: AtomicU64,
    /// 重试后成功的调用数
    successful_retries: AtomicU64,
    /// 重试耗尽后仍失败的调用数
    failed_retries: AtomicU64,
}

impl RetryStats {
    /// 获取总重试次数
    pub fn total_retries(&self) -> u64 {
        self.total_retries.load(Ordering::Relaxed)
    }

    /// 获取成功重试次数
    pub fn successful_retries(&self) -> u64 {
        self.successful_retries.load(Ordering::Relaxed)
    }

    /// 获取失败重试次数
    pub fn failed_retries(&self) -> u64 {
        self.failed_retries.load(Ordering::Relaxed)
    }

    fn record_retry(&self) {
        self.total_retries.fetch_add(1, Ordering::Relaxed);
    }

    fn record_success(&self) {
        self.successful_retries.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// 重置统计
    pub fn reset(&self) {
        self.total_retries.store(0, Ordering::Relaxed);
        self.successful_retries.store(0, Ordering::Relaxed);
        self.failed_retries.store(0, Ordering::Relaxed);
    }
}

/// 单次尝试之后的处理
enum Step {
    Retry(Duration),
    Stop,
}

/// 重试器
#[derive(Debug)]
pub struct Retry {
    name: String,
    config: RetryConfig,
    stats: RetryStats,
}

impl Retry {
    pub fn new(name: impl Into<String>, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            config,
            stats: RetryStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn stats(&self) -> &RetryStats {
        &self.stats
    }

    /// 同步执行，失败时阻塞当前线程等待后重试
    pub fn call<T, E, F>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: ClassifyFailure + std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            let result = operation();
            match self.after_attempt(attempt, &result) {
                Step::Retry(wait) => {
                    if !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    attempt += 1;
                }
                Step::Stop => return result,
            }
        }
    }

    /// 异步执行，失败时使用 tokio 定时器等待后重试
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            let result = operation().await;
            match self.after_attempt(attempt, &result) {
                Step::Retry(wait) => {
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Step::Stop => return result,
            }
        }
    }

    fn after_attempt<T, E>(&self, attempt: u32, result: &Result<T, E>) -> Step
    where
        E: ClassifyFailure + std::fmt::Display,
    {
        let err = match result {
            Ok(_) => {
                if attempt > 1 {
                    self.stats.record_success();
                    debug!("{} 重试成功，尝试次数: {}", self.name, attempt);
                }
                return Step::Stop;
            }
            Err(err) => err,
        };

        let kind = err.failure_kind();
        if self.config.is_ignored(&kind) {
            debug!("{} 失败分类 {} 被忽略，不再重试", self.name, kind);
            return Step::Stop;
        }

        if attempt < self.config.max_attempts() {
            self.stats.record_retry();
            warn!(
                "{} 操作失败，将在 {:?} 后重试 (尝试 {}/{}): {}",
                self.name,
                self.config.wait_interval(),
                attempt,
                self.config.max_attempts(),
                err
            );
            Step::Retry(self.config.wait_interval())
        } else {
            if attempt > 1 {
                self.stats.record_failure();
            }
            error!("{} 操作失败，已达最大尝试次数: {}", self.name, err);
            Step::Stop
        }
    }
}

/// 包装可能失败的无参函数，按重试配置重新调用
pub fn decorate_retry<T, E, F>(retry: Arc<Retry>, supplier: F) -> impl Fn() -> Result<T, E>
where
    F: Fn() -> Result<T, E>,
    E: ClassifyFailure + std::fmt::Display,
{
    move || retry.call(&supplier)
}

/// 包装返回 Future 的无参函数，按重试配置重新调用
pub fn decorate_retry_async<T, E, F, Fut>(
    retry: Arc<Retry>,
    supplier: F,
) -> impl Fn() -> BoxFuture<Result<T, E>>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: ClassifyFailure + std::fmt::Display + Send + 'static,
{
    let supplier = Arc::new(supplier);
    move || {
        let retry = retry.clone();
        let supplier = supplier.clone();
        Box::pin(async move { retry.execute(|| supplier()).await })
    }
}
