//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 熔断器实现
//!
//! 提供熔断器状态机，支持三状态转换和基于时间的自动恢复。
//!
//! # 特性
//!
//! - **三状态**: Closed（关闭）、Open（打开）、HalfOpen（半开）
//! - **自动熔断**: 连续失败次数达到阈值自动熔断
//! - **惰性恢复**: 没有后台定时器，每次许可检查时判断是否进入半开状态
//! - **失败分类**: 被忽略的失败分类不影响熔断器健康度
//! - **线程安全**: 状态、计数和恢复时间在同一把锁内原子更新
//!
//! # 状态转换
//!
//! ```text
//! Closed   --(连续失败 >= 阈值)-----------> Open
//! Open     --(许可检查时 now >= retry_after)--> HalfOpen
//! HalfOpen --(成功)------------------------> Closed
//! HalfOpen --(失败)------------------------> Open
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::CircuitBreakerConfig;
use crate::error::{
    CircuitBreakerOpenError, CircuitBreakerStats, CircuitState, ClassifyFailure, FailureKind,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, trace, warn};

/// 状态及其关联数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateKind {
    Closed,
    /// `retry_after` 为 `None` 表示恢复时间超出时钟范围，不再自动恢复
    Open { retry_after: Option<Instant> },
    HalfOpen,
}

impl StateKind {
    fn as_circuit_state(&self) -> CircuitState {
        match self {
            StateKind::Closed => CircuitState::Closed,
            StateKind::Open { .. } => CircuitState::Open,
            StateKind::HalfOpen => CircuitState::HalfOpen,
        }
    }
}

/// 受锁保护的可变状态
#[derive(Debug)]
struct Snapshot {
    kind: StateKind,
    consecutive_failures: u64,
    last_state_change: DateTime<Utc>,
}

/// 状态变更记录，在释放锁后用于日志输出
struct Transition {
    from: CircuitState,
    to: CircuitState,
    consecutive_failures: u64,
}

/// 调用统计
#[derive(Debug, Default)]
struct CallCounters {
    successful: AtomicU64,
    failed: AtomicU64,
    ignored: AtomicU64,
    rejected: AtomicU64,
    times_opened: AtomicU64,
}

/// 熔断器
pub struct CircuitBreaker {
    /// 名称
    name: String,
    /// 配置
    config: Arc<CircuitBreakerConfig>,
    /// 时钟
    clock: Arc<dyn Clock>,
    /// 当前状态
    state: Mutex<Snapshot>,
    /// 统计计数
    counters: CallCounters,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}

impl CircuitBreaker {
    /// 创建新的熔断器
    ///
    /// # 参数
    /// - `name`: 熔断器名称
    /// - `config`: 熔断器配置
    ///
    /// # 示例
    /// ```rust
    /// use fuseron::circuit_breaker::CircuitBreaker;
    /// use fuseron::config::CircuitBreakerConfig;
    /// use fuseron::error::CircuitState;
    ///
    /// let breaker = CircuitBreaker::new("backend", CircuitBreakerConfig::default());
    /// assert_eq!(breaker.state(), CircuitState::Closed);
    /// ```
    pub fn new(name: impl Into<String>, config: impl Into<Arc<CircuitBreakerConfig>>) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// 使用指定时钟创建熔断器
    pub fn with_clock(
        name: impl Into<String>,
        config: impl Into<Arc<CircuitBreakerConfig>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();
        let config = config.into();

        info!(
            "创建熔断器: name={}, failure_threshold={}, wait_interval={:?}, ignored={}",
            name,
            config.failure_threshold(),
            config.wait_interval(),
            config.ignored_failure_kinds().len()
        );

        Self {
            name,
            config,
            clock,
            state: Mutex::new(Snapshot {
                kind: StateKind::Closed,
                consecutive_failures: 0,
                last_state_change: Utc::now(),
            }),
            counters: CallCounters::default(),
        }
    }

    /// 请求调用许可
    ///
    /// 打开状态下若已到达 `retry_after`，切换到半开状态并放行本次调用。
    pub fn is_call_permitted(&self) -> bool {
        let mut state = self.state.lock();

        let kind = state.kind;
        let (permitted, transition) = match kind {
            StateKind::Closed | StateKind::HalfOpen => (true, None),
            StateKind::Open { retry_after } => {
                let now = self.clock.now();
                match retry_after {
                    Some(retry_after) if now >= retry_after => {
                        (true, Some(self.transition(&mut state, StateKind::HalfOpen)))
                    }
                    _ => (false, None),
                }
            }
        };
        drop(state);

        if let Some(transition) = transition {
            self.log_transition(&transition);
        }
        permitted
    }

    /// 记录一次成功调用
    pub fn record_success(&self) {
        let mut state = self.state.lock();

        let kind = state.kind;
        let transition = match kind {
            StateKind::Closed => {
                state.consecutive_failures = 0;
                None
            }
            StateKind::HalfOpen => Some(self.transition(&mut state, StateKind::Closed)),
            StateKind::Open { .. } => None,
        };
        drop(state);

        self.counters.successful.fetch_add(1, Ordering::Relaxed);
        match transition {
            Some(transition) => self.log_transition(&transition),
            None => trace!("熔断器 {} 记录成功", self.name),
        }
    }

    /// 记录一次失败调用
    ///
    /// 被忽略的失败分类不计数，也不改变状态。
    pub fn record_failure(&self, kind: &FailureKind) {
        if self.config.is_ignored(kind) {
            self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            trace!("熔断器 {} 忽略失败: kind={}", self.name, kind);
            return;
        }

        let mut state = self.state.lock();
        state.consecutive_failures += 1;

        let current = state.kind;
        let transition = match current {
            StateKind::Closed => {
                if state.consecutive_failures >= u64::from(self.config.failure_threshold()) {
                    Some(self.open(&mut state))
                } else {
                    None
                }
            }
            StateKind::HalfOpen => Some(self.open(&mut state)),
            // 已经打开，仅计数
            StateKind::Open { .. } => None,
        };
        let consecutive_failures = state.consecutive_failures;
        drop(state);

        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        match transition {
            Some(transition) => self.log_transition(&transition),
            None => trace!(
                "熔断器 {} 记录失败: kind={}, {}/{}",
                self.name,
                kind,
                consecutive_failures,
                self.config.failure_threshold()
            ),
        }
    }

    /// 获取当前状态
    pub fn state(&self) -> CircuitState {
        self.state.lock().kind.as_circuit_state()
    }

    /// 连续失败次数
    pub fn consecutive_failures(&self) -> u64 {
        self.state.lock().consecutive_failures
    }

    /// 打开状态下允许探测的时间点
    pub fn retry_after(&self) -> Option<Instant> {
        match self.state.lock().kind {
            StateKind::Open { retry_after } => retry_after,
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取配置
    pub fn config(&self) -> &Arc<CircuitBreakerConfig> {
        &self.config
    }

    /// 重置熔断器到关闭状态
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let transition = self.transition(&mut state, StateKind::Closed);
        drop(state);

        info!(
            "重置熔断器 {}: {} -> {}",
            self.name, transition.from, transition.to
        );
    }

    /// 获取统计信息
    pub fn stats(&self) -> CircuitBreakerStats {
        let state = self.state.lock();

        CircuitBreakerStats {
            name: self.name.clone(),
            state: state.kind.as_circuit_state(),
            consecutive_failures: state.consecutive_failures,
            successful_calls: self.counters.successful.load(Ordering::Relaxed),
            failed_calls: self.counters.failed.load(Ordering::Relaxed),
            ignored_calls: self.counters.ignored.load(Ordering::Relaxed),
            rejected_calls: self.counters.rejected.load(Ordering::Relaxed),
            times_opened: self.counters.times_opened.load(Ordering::Relaxed),
            last_state_change: Some(state.last_state_change),
        }
    }

    /// 获取调用许可，拒绝时返回 [`CircuitBreakerOpenError`]
    pub fn acquire_permission(&self) -> Result<(), CircuitBreakerOpenError> {
        if self.is_call_permitted() {
            Ok(())
        } else {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!("熔断器 {} 打开，拒绝请求", self.name);
            Err(CircuitBreakerOpenError::new(self.name.clone()))
        }
    }

    /// 根据调用结果记录成功或失败
    pub fn on_result<T, E: ClassifyFailure>(&self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(&e.failure_kind()),
        }
    }

    /// 执行同步操作，自动处理熔断逻辑
    ///
    /// 熔断器打开时不调用 `operation`，直接返回转换后的
    /// [`CircuitBreakerOpenError`]；否则原样返回操作结果。
    ///
    /// # 示例
    /// ```rust
    /// use fuseron::circuit_breaker::CircuitBreaker;
    /// use fuseron::config::CircuitBreakerConfig;
    /// use fuseron::error::FuseError;
    ///
    /// let breaker = CircuitBreaker::new("backend", CircuitBreakerConfig::default());
    /// let value = breaker.call(|| Ok::<_, FuseError>(42)).unwrap();
    /// assert_eq!(value, 42);
    /// ```
    pub fn call<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: ClassifyFailure + From<CircuitBreakerOpenError>,
    {
        self.acquire_permission()?;
        let result = operation();
        self.on_result(&result);
        result
    }

    /// 执行异步操作，自动处理熔断逻辑
    ///
    /// # 示例
    /// ```rust
    /// use fuseron::circuit_breaker::CircuitBreaker;
    /// use fuseron::config::CircuitBreakerConfig;
    /// use fuseron::error::FuseError;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let breaker = CircuitBreaker::new("backend", CircuitBreakerConfig::default());
    ///
    /// let result = breaker
    ///     .execute(|| async { Ok::<(), FuseError>(()) })
    ///     .await;
    /// assert!(result.is_ok());
    /// # }
    /// ```
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + From<CircuitBreakerOpenError>,
    {
        self.acquire_permission()?;
        let result = operation().await;
        self.on_result(&result);
        result
    }

    /// 切换到打开状态并设置恢复时间
    fn open(&self, state: &mut Snapshot) -> Transition {
        let retry_after = self.clock.now().checked_add(self.config.wait_interval());
        self.counters.times_opened.fetch_add(1, Ordering::Relaxed);
        self.transition(state, StateKind::Open { retry_after })
    }

    /// 切换状态，进入关闭状态时重置失败计数
    fn transition(&self, state: &mut Snapshot, to: StateKind) -> Transition {
        let from = state.kind.as_circuit_state();
        state.kind = to;
        state.last_state_change = Utc::now();
        if to == StateKind::Closed {
            state.consecutive_failures = 0;
        }

        Transition {
            from,
            to: to.as_circuit_state(),
            consecutive_failures: state.consecutive_failures,
        }
    }

    fn log_transition(&self, transition: &Transition) {
        if transition.to == CircuitState::Open {
            warn!(
                "熔断器状态变更: name={}, {} -> {} (failure_count={})",
                self.name, transition.from, transition.to, transition.consecutive_failures
            );
        } else {
            info!(
                "熔断器状态变更: name={}, {} -> {}",
                self.name, transition.from, transition.to
            );
        }
    }
}
