//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 熔断装饰器
//!
//! 把任意可调用单元包装成形状相同、带熔断行为的新可调用单元。
//!
//! 所有装饰器遵循同一契约：
//!
//! 1. 先请求调用许可，被拒绝时直接返回 [`CircuitBreakerOpenError`]，不调用被包装函数
//! 2. 调用被包装函数
//! 3. 成功时记录成功并原样返回结果
//! 4. 失败时分类、记录失败并原样返回原始错误
//!
//! 状态变更全部封装在 [`CircuitBreaker`] 内部，装饰器只负责组合，
//! 因此同一函数可以被多个熔断器或重试装饰器层层包装。
//!
//! # 示例
//!
//! ```rust
//! use fuseron::circuit_breaker::CircuitBreaker;
//! use fuseron::config::CircuitBreakerConfig;
//! use fuseron::decorators::decorate_checked_supplier;
//! use fuseron::error::FuseError;
//! use std::sync::Arc;
//!
//! let breaker = Arc::new(CircuitBreaker::new("backend", CircuitBreakerConfig::default()));
//! let fetch = decorate_checked_supplier(breaker, || Ok::<_, FuseError>("payload"));
//! assert_eq!(fetch().unwrap(), "payload");
//! ```

use crate::circuit_breaker::CircuitBreaker;
use crate::error::{CircuitBreakerOpenError, ClassifyFailure};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// 装箱的异步结果
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// 包装可能失败的无参函数
pub fn decorate_checked_supplier<T, E, F>(
    breaker: Arc<CircuitBreaker>,
    supplier: F,
) -> impl Fn() -> Result<T, E>
where
    F: Fn() -> Result<T, E>,
    E: ClassifyFailure + From<CircuitBreakerOpenError>,
{
    move || breaker.call(&supplier)
}

/// 包装可能失败的单参函数
pub fn decorate_checked_function<A, T, E, F>(
    breaker: Arc<CircuitBreaker>,
    function: F,
) -> impl Fn(A) -> Result<T, E>
where
    F: Fn(A) -> Result<T, E>,
    E: ClassifyFailure + From<CircuitBreakerOpenError>,
{
    move |input| breaker.call(|| function(input))
}

/// 包装不会失败的无参函数
///
/// 被包装函数总是记录为成功，只有许可被拒绝时返回错误。
pub fn decorate_supplier<T, F>(
    breaker: Arc<CircuitBreaker>,
    supplier: F,
) -> impl Fn() -> Result<T, CircuitBreakerOpenError>
where
    F: Fn() -> T,
{
    move || breaker.call(|| Ok(supplier()))
}

/// 包装不会失败的单参函数
pub fn decorate_function<A, T, F>(
    breaker: Arc<CircuitBreaker>,
    function: F,
) -> impl Fn(A) -> Result<T, CircuitBreakerOpenError>
where
    F: Fn(A) -> T,
{
    move |input| breaker.call(|| Ok(function(input)))
}

/// 包装返回 Future 的无参函数
pub fn decorate_async_supplier<T, E, F, Fut>(
    breaker: Arc<CircuitBreaker>,
    supplier: F,
) -> impl Fn() -> BoxFuture<Result<T, E>>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: ClassifyFailure + From<CircuitBreakerOpenError> + Send + 'static,
{
    let supplier = Arc::new(supplier);
    move || {
        let breaker = breaker.clone();
        let supplier = supplier.clone();
        Box::pin(async move { breaker.execute(|| supplier()).await })
    }
}
