//! 命令行接口模块
//!
//! 包含参数语法解析与命令处理逻辑

pub mod args;
pub mod commands;
