//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Centralized configuration constants for Fuseron.
//!
//! All default values used by the configuration builders live here.

// ============================================================================
// Circuit Breaker Constants
// ============================================================================

/// Default failure threshold for circuit breaker.
///
/// The circuit breaker transitions to open state after this many consecutive failures.
pub const DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 3;

/// Default wait interval for circuit breaker (60 seconds).
///
/// How long the circuit breaker remains open before a permission check may half-open it.
pub const DEFAULT_CIRCUIT_BREAKER_WAIT_INTERVAL_MS: u64 = 60_000;

// ============================================================================
// Retry Constants
// ============================================================================

/// Default maximum number of attempts, including the first call.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default fixed wait between retry attempts (500 milliseconds).
pub const DEFAULT_RETRY_WAIT_INTERVAL_MS: u64 = 500;

// ============================================================================
// Metrics Constants
// ============================================================================

/// Histogram buckets (seconds) for decorated call durations.
pub const CALL_DURATION_BUCKETS: &[f64] = &[0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];
