//! uvkit - 基于 uv 的 Python 工作流启动器
//!
//! 这是一个用Rust编写的命令行前端，把自身的参数语法翻译为对外部
//! 包管理器 uv 的调用，支持：
//! - 软件包安装/卸载/升级/列表
//! - 虚拟环境生命周期管理（显式标记文件，跨进程生效）
//! - 项目脚手架（内嵌模板，直接文件系统操作）
//! - 构建与发布工作流
//! - `*`/`!` 转义语法透传任意底层工具参数

pub mod cli;
pub mod config;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod output;
pub mod project;
pub mod venv;

// 重新导出主要类型
pub use cli::args::{Commands, ParsedCommand, VenvCommands};
pub use config::ToolConfig;
pub use error::{ParseError, Result, UvkitError};
pub use invoke::{ExecutionResult, FsOp, Invocation};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
