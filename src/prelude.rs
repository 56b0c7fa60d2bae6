//! Prelude module - Commonly used types for quick imports
//!
//! This module re-exports the most commonly used types from Fuseron,
//! allowing users to import them with a single `use fuseron::prelude::*;`
//! statement instead of importing each type individually.

// Core types - always available
pub use crate::circuit_breaker::CircuitBreaker;
pub use crate::config::{CircuitBreakerConfig, RetryConfig};
pub use crate::error::{
    CircuitBreakerOpenError, CircuitState, ClassifyFailure, FailureKind, FuseError,
};
pub use crate::registry::CircuitBreakerRegistry;

// Decorators
pub use crate::decorators::{
    decorate_async_supplier, decorate_checked_function, decorate_checked_supplier,
    decorate_function, decorate_supplier,
};
pub use crate::metrics::{decorate_timed, MetricsSink};
pub use crate::retry::{decorate_retry, Retry};
