//! 日志系统模块
//!
//! 提供结构化日志配置和管理功能。诊断日志全部写入stderr，
//! 避免污染被包装工具透传到stdout的原生输出。

use log::LevelFilter;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 日志级别环境变量，兼容 RUST_LOG 语法
pub const LOG_ENV_VAR: &str = "UVKIT_LOG";

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            json_format: false,
        }
    }
}

/// 全局日志初始化状态
static LOGGING_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// 日志系统管理器
pub struct LoggingSystem;

impl LoggingSystem {
    /// 初始化日志系统
    ///
    /// # 参数
    /// * `config` - 日志配置
    ///
    /// # 特性
    /// - 线程安全的单次初始化
    /// - log crate 到 tracing 的桥接
    /// - 环境变量 UVKIT_LOG 覆盖默认级别
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<()> {
        let result = LOGGING_INIT.get_or_init(|| {
            Self::perform_initialization(&config).map_err(|e| e.to_string())
        });

        result
            .as_ref()
            .map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))?;
        Ok(())
    }

    /// 检查日志系统是否已初始化
    pub fn is_initialized() -> bool {
        matches!(LOGGING_INIT.get(), Some(Ok(())))
    }

    /// 执行实际的日志系统初始化
    fn perform_initialization(config: &LogConfig) -> anyhow::Result<()> {
        Self::init_log_tracer()?;
        Self::init_tracing_subscriber(config)?;
        Ok(())
    }

    /// 初始化 LogTracer（log crate 到 tracing 的桥接）
    fn init_log_tracer() -> anyhow::Result<()> {
        use tracing_log::LogTracer;

        LogTracer::init().map_err(|e| anyhow::anyhow!("LogTracer初始化失败: {}", e))
    }

    /// 初始化 tracing subscriber
    fn init_tracing_subscriber(config: &LogConfig) -> anyhow::Result<()> {
        // 环境变量优先，其次使用配置中的级别
        let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
            EnvFilter::default().add_directive(Self::convert_level_to_directive(config.level))
        });

        // 格式化层一律输出到stderr
        let fmt_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            fmt::layer()
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .boxed()
        };

        match registry().with(env_filter).with(fmt_layer).try_init() {
            Ok(()) => {
                tracing::debug!("日志系统初始化完成");
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("already been set") {
                    // 测试环境下可能重复初始化
                    tracing::debug!("日志系统已经初始化过了");
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("tracing subscriber初始化失败: {}", error_msg))
                }
            }
        }
    }

    /// 将 log::LevelFilter 转换为 tracing 的指令
    fn convert_level_to_directive(level: LevelFilter) -> tracing_subscriber::filter::Directive {
        use tracing_subscriber::filter::Directive;
        match level {
            LevelFilter::Off => "off".parse().unwrap(),
            LevelFilter::Error => Directive::from(tracing::Level::ERROR),
            LevelFilter::Warn => Directive::from(tracing::Level::WARN),
            LevelFilter::Info => Directive::from(tracing::Level::INFO),
            LevelFilter::Debug => Directive::from(tracing::Level::DEBUG),
            LevelFilter::Trace => Directive::from(tracing::Level::TRACE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_idempotent() {
        let config = LogConfig::default();

        // 第一次初始化应该成功
        let result1 = LoggingSystem::setup_logging(config.clone());
        assert!(result1.is_ok());
        assert!(LoggingSystem::is_initialized());

        // 第二次初始化复用之前的结果，不会重复初始化
        let result2 = LoggingSystem::setup_logging(config);
        assert!(result2.is_ok());
    }

    #[test]
    fn test_default_config_level() {
        let config = LogConfig::default();
        assert_eq!(config.level, LevelFilter::Warn);
        assert!(!config.json_format);
    }
}
