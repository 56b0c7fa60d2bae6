//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 日志初始化
//!
//! 为使用方提供基于 `tracing-subscriber` 的日志订阅器初始化。
//!
//! # 示例
//!
//! ```rust
//! use fuseron::telemetry::{init_tracing, TelemetryConfig};
//!
//! init_tracing(&TelemetryConfig::default()).ok();
//! ```

use crate::error::FuseError;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 日志配置
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// 过滤规则，`RUST_LOG` 环境变量优先
    pub filter: String,
    /// 是否输出目标模块
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "fuseron=info".to_string(),
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Default::default()
        }
    }
}

/// 安装全局日志订阅器
///
/// 已经安装过订阅器时返回 [`FuseError::Other`]。
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), FuseError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| FuseError::ConfigError(format!("日志过滤规则无效: {}", e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .map_err(|e| FuseError::Other(format!("日志订阅器初始化失败: {}", e)))?;

    info!("日志系统初始化完成: filter={}", config.filter);
    Ok(())
}
