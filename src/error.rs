//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use std::path::PathBuf;
use thiserror::Error;

/// uvkit 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum UvkitError {
    /// 命令行解析错误
    #[error("参数解析错误: {0}")]
    Parse(#[from] ParseError),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 外部工具不可用
    #[error("未找到外部工具 `{tool}`，请确认 uv 已安装并在 PATH 中")]
    ToolNotFound { tool: String },

    /// 文件系统操作错误
    #[error("文件系统操作失败 ({path}): {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 模板渲染错误
    #[error("模板渲染失败: {0}")]
    Template(String),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 命令行解析错误类型
///
/// 所有解析与验证错误都在构建任何调用之前报告，退出码为1。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 未知子命令
    #[error("未知命令: `{token}`")]
    UnknownCommand { token: String },

    /// 未知选项
    #[error("未知选项: `{token}`")]
    UnknownOption { token: String },

    /// 缺少必需参数
    #[error("缺少参数: {what}")]
    MissingArgument { what: String },
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, UvkitError>;
