//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 健康检查报告
//!
//! 汇总注册表中所有熔断器的状态，可序列化为 JSON 供健康检查端点使用。

use crate::error::{CircuitBreakerStats, CircuitState, FuseError};
use crate::registry::CircuitBreakerRegistry;
use serde::{Deserialize, Serialize};

/// 整体健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// 所有熔断器关闭
    Up,
    /// 存在半开的熔断器，没有打开的熔断器
    Degraded,
    /// 存在打开的熔断器
    Down,
}

/// 健康检查报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub circuit_breakers: Vec<CircuitBreakerStats>,
}

impl HealthReport {
    /// 根据注册表生成报告
    pub fn from_registry(registry: &CircuitBreakerRegistry) -> Self {
        let circuit_breakers: Vec<CircuitBreakerStats> = registry
            .breakers()
            .iter()
            .map(|breaker| breaker.stats())
            .collect();

        let status = if circuit_breakers
            .iter()
            .any(|s| s.state == CircuitState::Open)
        {
            HealthStatus::Down
        } else if circuit_breakers
            .iter()
            .any(|s| s.state == CircuitState::HalfOpen)
        {
            HealthStatus::Degraded
        } else {
            HealthStatus::Up
        };

        Self {
            status,
            circuit_breakers,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Up
    }

    pub fn to_json(&self) -> Result<String, FuseError> {
        Ok(serde_json::to_string(self)?)
    }
}
