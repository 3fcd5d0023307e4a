//! 调用执行器
//!
//! 把调用计划落地为子进程或文件系统操作。进程调用在调用方视角
//! 是同步的：阻塞直到子进程退出，退出码原样向上传递。没有任何
//! 重试逻辑，每个失败只向用户呈现一次。

use crate::error::{Result, UvkitError};
use crate::invoke::plan::{ExecutionResult, FsOp, Invocation, ProcessInvocation};
use tokio::process::Command;
use tracing::{debug, warn};

/// 子进程输出处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 继承标准流，用户实时看到被包装工具的原生输出
    Streamed,
    /// 捕获输出供解析与呈现
    Captured,
}

/// 调用执行器
///
/// 无状态：跨调用不保留任何可变数据，一次只执行一个调用。
#[derive(Debug, Default)]
pub struct Executor;

impl Executor {
    /// 创建执行器
    pub fn new() -> Self {
        Self
    }

    /// 执行一次调用并返回结果
    pub async fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<ExecutionResult> {
        match invocation {
            Invocation::Process(process) => self.run_process(process, mode).await,
            Invocation::Filesystem(ops) => self.run_filesystem(ops).await,
        }
    }

    /// 执行子进程调用
    async fn run_process(
        &self,
        invocation: &ProcessInvocation,
        mode: OutputMode,
    ) -> Result<ExecutionResult> {
        debug!("执行命令: {}", invocation.command_line().join(" "));

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        for (key, value) in &invocation.env {
            command.env(key, value);
        }
        if let Some(ref cwd) = invocation.cwd {
            command.current_dir(cwd);
        }

        match mode {
            OutputMode::Captured => {
                let output = command
                    .output()
                    .await
                    .map_err(|e| Self::map_spawn_error(e, &invocation.program))?;
                Ok(ExecutionResult {
                    exit_code: exit_code_of(&output.status),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
            OutputMode::Streamed => {
                let mut child = command
                    .spawn()
                    .map_err(|e| Self::map_spawn_error(e, &invocation.program))?;

                // 中断信号由终端同时送达子进程进程组；
                // 包装器只记录并继续等待子进程退出
                let status = loop {
                    tokio::select! {
                        status = child.wait() => break status?,
                        _ = tokio::signal::ctrl_c() => {
                            warn!("收到中断信号，等待子进程退出");
                        }
                    }
                };

                Ok(ExecutionResult {
                    exit_code: exit_code_of(&status),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
        }
    }

    /// 执行文件系统操作序列
    async fn run_filesystem(&self, ops: &[FsOp]) -> Result<ExecutionResult> {
        for op in ops {
            debug!("文件系统操作: {op:?}");
            match op {
                FsOp::CreateDir(path) => {
                    tokio::fs::create_dir_all(path)
                        .await
                        .map_err(|e| Self::fs_error(path, e))?;
                }
                FsOp::WriteFile { path, contents } => {
                    if let Some(parent) = path.parent() {
                        tokio::fs::create_dir_all(parent)
                            .await
                            .map_err(|e| Self::fs_error(parent, e))?;
                    }
                    tokio::fs::write(path, contents)
                        .await
                        .map_err(|e| Self::fs_error(path, e))?;
                }
                FsOp::RemoveDirAll(path) => {
                    tokio::fs::remove_dir_all(path)
                        .await
                        .map_err(|e| Self::fs_error(path, e))?;
                }
                FsOp::RemoveFile(path) => {
                    tokio::fs::remove_file(path)
                        .await
                        .map_err(|e| Self::fs_error(path, e))?;
                }
            }
        }
        Ok(ExecutionResult::success())
    }

    /// 进程启动失败映射：可执行文件缺失属于环境前置条件错误
    fn map_spawn_error(error: std::io::Error, program: &str) -> UvkitError {
        if error.kind() == std::io::ErrorKind::NotFound {
            UvkitError::ToolNotFound {
                tool: program.to_string(),
            }
        } else {
            UvkitError::Io(error)
        }
    }

    /// 文件系统错误包装
    fn fs_error(path: &std::path::Path, error: std::io::Error) -> UvkitError {
        UvkitError::Filesystem {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// 从退出状态提取退出码
///
/// Unix 下被信号终止的子进程映射为 128+signo。
fn exit_code_of(status: &std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
