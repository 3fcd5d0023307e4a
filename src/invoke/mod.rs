//! 调用层
//!
//! 包含调用计划类型、纯函数构建器与执行器。
//! 数据流：命令 → 构建器 → Invocation → 执行器 → ExecutionResult。

pub mod builder;
pub mod plan;
pub mod runner;

pub use builder::{BuildContext, PipScope};
pub use plan::{ExecutionResult, FsOp, Invocation, ProcessInvocation};
pub use runner::{Executor, OutputMode};
