//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 熔断器注册表
//!
//! 按名称管理熔断器实例，同一名称最多只会创建一个实例。
//! 注册表由调用方显式构造并传递，不提供全局单例。

use crate::circuit_breaker::CircuitBreaker;
use crate::clock::{Clock, SystemClock};
use crate::config::{CircuitBreakerConfig, ResilienceConfig};
use crate::error::FuseError;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// 熔断器注册表
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    default_config: Arc<CircuitBreakerConfig>,
    clock: Arc<dyn Clock>,
}

impl CircuitBreakerRegistry {
    /// 使用默认配置创建注册表
    pub fn new() -> Self {
        Self::with_default_config(CircuitBreakerConfig::default())
    }

    /// 使用指定的默认配置创建注册表
    pub fn with_default_config(config: CircuitBreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// 使用指定时钟创建注册表，新建的熔断器共享该时钟
    pub fn with_clock(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            breakers: DashMap::new(),
            default_config: Arc::new(config),
            clock,
        }
    }

    /// 根据配置文件创建注册表并预先创建命名熔断器
    pub fn from_config(config: &ResilienceConfig) -> Result<Self, FuseError> {
        let registry = Self::with_default_config(config.default_circuit_breaker_config()?);
        for (name, settings) in &config.circuit_breakers {
            registry.get_or_create_with(name, CircuitBreakerConfig::try_from(settings)?);
        }
        Ok(registry)
    }

    /// 获取或创建使用默认配置的熔断器
    pub fn get_or_create(&self, name: &str) -> Arc<CircuitBreaker> {
        self.get_or_create_with(name, self.default_config.clone())
    }

    /// 获取或创建熔断器
    ///
    /// 名称已存在时直接返回原实例，忽略 `config` 参数。
    pub fn get_or_create_with(
        &self,
        name: &str,
        config: impl Into<Arc<CircuitBreakerConfig>>,
    ) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.get(name) {
            return breaker.clone();
        }

        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("注册熔断器: {}", name);
                Arc::new(CircuitBreaker::with_clock(
                    name,
                    config,
                    self.clock.clone(),
                ))
            })
            .clone()
    }

    /// 查找已注册的熔断器
    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| entry.clone())
    }

    /// 所有已注册熔断器的名称（已排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// 所有已注册的熔断器（按名称排序）
    pub fn breakers(&self) -> Vec<Arc<CircuitBreaker>> {
        let mut breakers: Vec<_> = self.breakers.iter().map(|e| e.value().clone()).collect();
        breakers.sort_by(|a, b| a.name().cmp(b.name()));
        breakers
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    pub fn default_config(&self) -> &Arc<CircuitBreakerConfig> {
        &self.default_config
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
