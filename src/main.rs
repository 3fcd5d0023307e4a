//! uvkit 主程序入口
//!
//! 基于 uv 的 Python 工作流启动器

use tracing::error;
use uvkit::cli::args;
use uvkit::cli::commands::{execute_command, CommandContext};
use uvkit::config::ToolConfig;
use uvkit::logging::{LogConfig, LoggingSystem};
use uvkit::output;

#[tokio::main]
async fn main() {
    let raw: Vec<String> = std::env::args().skip(1).collect();

    // 帮助与版本属于呈现层，在语法解析之前处理
    if raw.is_empty() || raw[0] == "-h" || raw[0] == "--help" {
        output::print_usage();
        return;
    }
    if raw[0] == "-V" || raw[0] == "--version" {
        output::print_version();
        return;
    }

    // 初始化日志系统
    if let Err(e) = LoggingSystem::setup_logging(LogConfig::default()) {
        eprintln!("日志系统初始化失败: {e}");
    }

    std::process::exit(run(&raw).await);
}

/// 执行一次完整的命令管线，返回进程退出码
async fn run(raw: &[String]) -> i32 {
    // 解析与验证：所有解析错误都在构建任何调用之前报告
    let parsed = match args::parse(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            output::print_error(&e.to_string());
            output::print_usage_hint();
            return 1;
        }
    };

    let config = match ToolConfig::load().await {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e.to_string());
            return 1;
        }
    };

    let ctx = CommandContext::new(parsed, config);
    match execute_command(&ctx).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            error!("命令执行失败: {e}");
            output::print_error(&e.to_string());
            1
        }
    }
}
