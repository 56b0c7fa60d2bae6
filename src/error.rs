//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 错误类型定义
//!
//! 使用thiserror定义所有错误类型，以及失败分类（[`FailureKind`]）。

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Fuseron 错误类型
#[derive(Error, Debug)]
pub enum FuseError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 熔断器打开，调用被拒绝
    #[error(transparent)]
    CircuitBreakerOpen(#[from] CircuitBreakerOpenError),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// YAML解析错误
    #[error("YAML解析错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML解析错误
    #[error("TOML解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    /// 指标错误
    #[error("指标错误: {0}")]
    MetricsError(String),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

/// 熔断器打开错误
///
/// 仅在装饰器的许可检查阶段产生，携带熔断器名称。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("熔断器 '{name}' 已打开，调用被拒绝")]
pub struct CircuitBreakerOpenError {
    /// 熔断器名称
    pub name: String,
}

impl CircuitBreakerOpenError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 失败分类
///
/// 调用方把错误映射为分类标签，熔断器只根据标签判断是否忽略该失败。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureKind(Cow<'static, str>);

impl FailureKind {
    /// 通用失败分类
    pub const ERROR: FailureKind = FailureKind(Cow::Borrowed("error"));

    /// 熔断器拒绝调用时的分类
    pub const CIRCUIT_OPEN: FailureKind = FailureKind(Cow::Borrowed("circuit_open"));

    /// 创建新的失败分类
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FailureKind {
    fn from(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }
}

impl From<String> for FailureKind {
    fn from(kind: String) -> Self {
        Self(Cow::Owned(kind))
    }
}

/// 错误分类
///
/// 装饰器在记录失败前调用 [`ClassifyFailure::failure_kind`]，
/// 熔断器本身不关心具体失败原因。
pub trait ClassifyFailure {
    fn failure_kind(&self) -> FailureKind;
}

impl ClassifyFailure for std::io::Error {
    fn failure_kind(&self) -> FailureKind {
        FailureKind::from(format!("io::{:?}", self.kind()))
    }
}

impl ClassifyFailure for anyhow::Error {
    fn failure_kind(&self) -> FailureKind {
        if self.downcast_ref::<CircuitBreakerOpenError>().is_some() {
            return FailureKind::CIRCUIT_OPEN;
        }
        self.chain()
            .find_map(|cause| cause.downcast_ref::<std::io::Error>())
            .map(ClassifyFailure::failure_kind)
            .unwrap_or(FailureKind::ERROR)
    }
}

impl ClassifyFailure for CircuitBreakerOpenError {
    fn failure_kind(&self) -> FailureKind {
        FailureKind::CIRCUIT_OPEN
    }
}

impl ClassifyFailure for FuseError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            FuseError::CircuitBreakerOpen(_) => FailureKind::CIRCUIT_OPEN,
            FuseError::IoError(e) => e.failure_kind(),
            FuseError::ConfigError(_) => FailureKind::from("config"),
            FuseError::SerdeError(_) | FuseError::YamlError(_) | FuseError::TomlError(_) => {
                FailureKind::from("serde")
            }
            FuseError::MetricsError(_) | FuseError::Other(_) => FailureKind::ERROR,
        }
    }
}

/// 熔断器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// 关闭状态（正常）
    Closed,
    /// 打开状态（熔断）
    Open,
    /// 半开状态（探测）
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => f.write_str("CLOSED"),
            CircuitState::Open => f.write_str("OPEN"),
            CircuitState::HalfOpen => f.write_str("HALF_OPEN"),
        }
    }
}

/// 熔断器统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerStats {
    /// 熔断器名称
    pub name: String,
    /// 当前状态
    pub state: CircuitState,
    /// 连续失败次数
    pub consecutive_failures: u64,
    /// 成功次数
    pub successful_calls: u64,
    /// 计入统计的失败次数
    pub failed_calls: u64,
    /// 被忽略的失败次数
    pub ignored_calls: u64,
    /// 被拒绝的调用次数
    pub rejected_calls: u64,
    /// 进入打开状态的次数
    pub times_opened: u64,
    /// 最后状态变更时间
    pub last_state_change: Option<chrono::DateTime<chrono::Utc>>,
}
