//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 配置模块
//!
//! 定义熔断器与重试的不可变配置，以及可从 YAML/TOML 文件加载的
//! [`ResilienceConfig`]。

use crate::constants::{
    DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD, DEFAULT_CIRCUIT_BREAKER_WAIT_INTERVAL_MS,
    DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_WAIT_INTERVAL_MS,
};
use crate::error::{FailureKind, FuseError};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 熔断器配置
///
/// 构建后不可变，通过 `Arc` 在调用之间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    failure_threshold: u32,
    wait_interval: Duration,
    ignored_failure_kinds: HashSet<FailureKind>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            wait_interval: Duration::from_millis(DEFAULT_CIRCUIT_BREAKER_WAIT_INTERVAL_MS),
            ignored_failure_kinds: HashSet::new(),
        }
    }
}

impl CircuitBreakerConfig {
    /// 创建配置构建器
    ///
    /// # 示例
    /// ```rust
    /// use fuseron::config::CircuitBreakerConfig;
    /// use std::time::Duration;
    ///
    /// let config = CircuitBreakerConfig::builder()
    ///     .failure_threshold(5)
    ///     .wait_interval(Duration::from_secs(10))
    ///     .ignore_failure_kind("io::TimedOut")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.failure_threshold(), 5);
    /// ```
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::default()
    }

    /// 失败阈值（连续失败达到此值时熔断）
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// 打开状态后等待此时间再允许探测
    pub fn wait_interval(&self) -> Duration {
        self.wait_interval
    }

    pub fn ignored_failure_kinds(&self) -> &HashSet<FailureKind> {
        &self.ignored_failure_kinds
    }

    /// 检查失败分类是否被忽略
    pub fn is_ignored(&self, kind: &FailureKind) -> bool {
        self.ignored_failure_kinds.contains(kind)
    }
}

/// 熔断器配置构建器
#[derive(Debug, Clone, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn wait_interval(mut self, wait_interval: Duration) -> Self {
        self.config.wait_interval = wait_interval;
        self
    }

    /// 添加一个被忽略的失败分类
    pub fn ignore_failure_kind(mut self, kind: impl Into<FailureKind>) -> Self {
        self.config.ignored_failure_kinds.insert(kind.into());
        self
    }

    pub fn ignore_failure_kinds<I, K>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FailureKind>,
    {
        self.config
            .ignored_failure_kinds
            .extend(kinds.into_iter().map(Into::into));
        self
    }

    /// 校验并构建配置
    pub fn build(self) -> Result<CircuitBreakerConfig, FuseError> {
        if self.config.failure_threshold == 0 {
            return Err(FuseError::ConfigError("失败阈值必须大于0".to_string()));
        }
        Ok(self.config)
    }
}

/// 重试配置
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    max_attempts: u32,
    wait_interval: Duration,
    ignored_failure_kinds: HashSet<FailureKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            wait_interval: Duration::from_millis(DEFAULT_RETRY_WAIT_INTERVAL_MS),
            ignored_failure_kinds: HashSet::new(),
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// 最大尝试次数（包含首次调用）
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 两次尝试之间的固定等待时间
    pub fn wait_interval(&self) -> Duration {
        self.wait_interval
    }

    pub fn ignored_failure_kinds(&self) -> &HashSet<FailureKind> {
        &self.ignored_failure_kinds
    }

    pub fn is_ignored(&self, kind: &FailureKind) -> bool {
        self.ignored_failure_kinds.contains(kind)
    }
}

/// 重试配置构建器
#[derive(Debug, Clone, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn wait_interval(mut self, wait_interval: Duration) -> Self {
        self.config.wait_interval = wait_interval;
        self
    }

    pub fn ignore_failure_kind(mut self, kind: impl Into<FailureKind>) -> Self {
        self.config.ignored_failure_kinds.insert(kind.into());
        self
    }

    pub fn build(self) -> Result<RetryConfig, FuseError> {
        if self.config.max_attempts == 0 {
            return Err(FuseError::ConfigError("最大尝试次数必须大于0".to_string()));
        }
        Ok(self.config)
    }
}

/// 熔断器文件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub wait_interval_ms: u64,
    pub ignored_failure_kinds: Vec<FailureKind>,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            wait_interval_ms: DEFAULT_CIRCUIT_BREAKER_WAIT_INTERVAL_MS,
            ignored_failure_kinds: Vec::new(),
        }
    }
}

impl TryFrom<&CircuitBreakerSettings> for CircuitBreakerConfig {
    type Error = FuseError;

    fn try_from(settings: &CircuitBreakerSettings) -> Result<Self, Self::Error> {
        CircuitBreakerConfig::builder()
            .failure_threshold(settings.failure_threshold)
            .wait_interval(Duration::from_millis(settings.wait_interval_ms))
            .ignore_failure_kinds(settings.ignored_failure_kinds.iter().cloned())
            .build()
    }
}

/// 重试文件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub wait_interval_ms: u64,
    pub ignored_failure_kinds: Vec<FailureKind>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            wait_interval_ms: DEFAULT_RETRY_WAIT_INTERVAL_MS,
            ignored_failure_kinds: Vec::new(),
        }
    }
}

impl TryFrom<&RetrySettings> for RetryConfig {
    type Error = FuseError;

    fn try_from(settings: &RetrySettings) -> Result<Self, Self::Error> {
        let mut builder = RetryConfig::builder()
            .max_attempts(settings.max_attempts)
            .wait_interval(Duration::from_millis(settings.wait_interval_ms));
        for kind in &settings.ignored_failure_kinds {
            builder = builder.ignore_failure_kind(kind.clone());
        }
        builder.build()
    }
}

/// 弹性配置文件
///
/// ```yaml
/// default_circuit_breaker:
///   failure_threshold: 5
///   wait_interval_ms: 30000
/// circuit_breakers:
///   payments:
///     failure_threshold: 2
///     ignored_failure_kinds: ["io::TimedOut"]
/// retries:
///   payments:
///     max_attempts: 4
///     wait_interval_ms: 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub default_circuit_breaker: CircuitBreakerSettings,
    pub circuit_breakers: HashMap<String, CircuitBreakerSettings>,
    pub retries: HashMap<String, RetrySettings>,
}

impl ResilienceConfig {
    /// 从YAML字符串解析
    pub fn from_yaml_str(content: &str) -> Result<Self, FuseError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从TOML字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, FuseError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载，根据扩展名选择格式
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FuseError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(FuseError::ConfigError(format!(
                "不支持的配置文件格式: {:?}",
                other
            ))),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), FuseError> {
        CircuitBreakerConfig::try_from(&self.default_circuit_breaker)
            .map_err(|e| FuseError::ConfigError(format!("默认熔断器配置无效: {}", e)))?;

        for (name, settings) in &self.circuit_breakers {
            if name.is_empty() {
                return Err(FuseError::ConfigError("熔断器名称不能为空".to_string()));
            }
            CircuitBreakerConfig::try_from(settings)
                .map_err(|e| FuseError::ConfigError(format!("熔断器[{}]配置无效: {}", name, e)))?;
        }

        for (name, settings) in &self.retries {
            RetryConfig::try_from(settings)
                .map_err(|e| FuseError::ConfigError(format!("重试[{}]配置无效: {}", name, e)))?;
        }

        Ok(())
    }

    /// 默认熔断器配置
    pub fn default_circuit_breaker_config(&self) -> Result<CircuitBreakerConfig, FuseError> {
        CircuitBreakerConfig::try_from(&self.default_circuit_breaker)
    }

    /// 获取命名重试配置
    pub fn retry_config(&self, name: &str) -> Result<Option<RetryConfig>, FuseError> {
        self.retries.get(name).map(RetryConfig::try_from).transpose()
    }
}
