//! 调用计划类型定义
//!
//! 一次命令解析最终落地为若干 Invocation：外部进程调用或
//! 文件系统操作。Invocation 构建完成后不再修改。

use std::path::PathBuf;

/// 外部进程调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    /// 可执行文件
    pub program: String,
    /// 参数向量（透传参数始终位于结构化参数之后）
    pub args: Vec<String>,
    /// 附加环境变量
    pub env: Vec<(String, String)>,
    /// 工作目录
    pub cwd: Option<PathBuf>,
}

impl ProcessInvocation {
    /// 创建最小进程调用
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
            cwd: None,
        }
    }

    /// 完整命令行（用于日志与测试断言）
    pub fn command_line(&self) -> Vec<String> {
        let mut line = vec![self.program.clone()];
        line.extend(self.args.iter().cloned());
        line
    }
}

/// 单个文件系统操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOp {
    /// 创建目录（含父目录）
    CreateDir(PathBuf),
    /// 写入文件
    WriteFile { path: PathBuf, contents: String },
    /// 递归删除目录
    RemoveDirAll(PathBuf),
    /// 删除单个文件
    RemoveFile(PathBuf),
}

impl FsOp {
    /// 操作的目标路径
    pub fn path(&self) -> &PathBuf {
        match self {
            FsOp::CreateDir(path) => path,
            FsOp::WriteFile { path, .. } => path,
            FsOp::RemoveDirAll(path) => path,
            FsOp::RemoveFile(path) => path,
        }
    }
}

/// 一次待执行的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// 外部进程调用
    Process(ProcessInvocation),
    /// 文件系统操作序列
    Filesystem(Vec<FsOp>),
}

impl Invocation {
    /// 进程调用的参数向量（文件系统调用返回None）
    pub fn argv(&self) -> Option<&[String]> {
        match self {
            Invocation::Process(p) => Some(&p.args),
            Invocation::Filesystem(_) => None,
        }
    }
}

/// 一次调用的执行结果
///
/// 每个 Invocation 产生一个结果，被消费一次后丢弃，
/// 不跨调用持久化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// 退出码（文件系统操作成功为0）
    pub exit_code: i32,
    /// 捕获的标准输出（流式模式下为空）
    pub stdout: String,
    /// 捕获的标准错误（流式模式下为空）
    pub stderr: String,
}

impl ExecutionResult {
    /// 构造成功结果
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// 执行是否成功
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
