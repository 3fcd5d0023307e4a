//! 调用构建器
//!
//! 把验证完成的命令映射为具体的 uv 参数向量或文件系统操作计划。
//! 构建是纯函数：相同的输入（命令 + 构建上下文）产生逐字节相同
//! 的调用，不产生任何副作用。透传参数始终追加在结构化参数之后，
//! 并保持原始相对顺序。

use crate::config::ToolConfig;
use crate::error::Result;
use crate::invoke::plan::{FsOp, Invocation, ProcessInvocation};
use crate::project;
use crate::venv::{ActiveEnv, VenvPaths};
use std::path::Path;

/// 列出 Python 内建模块的代码片段
const BUILTIN_MODULES_SNIPPET: &str =
    "import sys; print('\\n'.join(sys.builtin_module_names))";

/// 调用构建上下文
///
/// 一次运行内不可变：配置、激活环境标记与当前 PATH 在进程启动时
/// 采集一次，之后构建过程不再读取任何外部状态。
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// uv 可执行文件
    pub uv_program: String,
    /// 当前激活的虚拟环境（来自标记文件）
    pub active_env: Option<VenvPaths>,
    /// 安装时是否编译字节码
    pub compile_bytecode: bool,
    /// 调用方的 PATH 值，用于前置虚拟环境 bin 目录
    pub path_var: Option<String>,
}

impl BuildContext {
    /// 根据配置与激活状态创建上下文
    pub fn new(
        config: &ToolConfig,
        active_env: Option<VenvPaths>,
        path_var: Option<String>,
    ) -> Self {
        Self {
            uv_program: config.uv_path.clone(),
            active_env,
            compile_bytecode: config.compile_bytecode,
            path_var,
        }
    }
}

/// pip 子命令的目标环境
#[derive(Debug, Clone, Copy)]
pub enum PipScope<'a> {
    /// 跟随激活环境；无激活环境且未指定版本时操作系统环境
    Default { python: Option<&'a str> },
    /// 显式指定的虚拟环境
    Venv(&'a VenvPaths),
}

/// 目标环境对应的结构化标志与环境变量
fn scope_parts(ctx: &BuildContext, scope: PipScope<'_>) -> (Vec<String>, Vec<(String, String)>) {
    match scope {
        PipScope::Default { python: Some(py) } => {
            (vec!["--python".to_string(), py.to_string()], Vec::new())
        }
        PipScope::Default { python: None } => match ctx.active_env {
            Some(ref paths) => (Vec::new(), venv_env(paths, ctx.path_var.as_deref())),
            None => (vec!["--system".to_string()], Vec::new()),
        },
        PipScope::Venv(paths) => (Vec::new(), venv_env(paths, ctx.path_var.as_deref())),
    }
}

/// 虚拟环境调用注入的环境变量
fn venv_env(paths: &VenvPaths, path_var: Option<&str>) -> Vec<(String, String)> {
    let separator = if cfg!(windows) { ";" } else { ":" };
    let bin_dir = paths.bin_dir.display().to_string();
    let path_value = match path_var {
        Some(existing) => format!("{bin_dir}{separator}{existing}"),
        None => bin_dir,
    };
    vec![
        ("VIRTUAL_ENV".to_string(), paths.root.display().to_string()),
        ("PATH".to_string(), path_value),
    ]
}

/// 组装一次 uv 进程调用
fn uv_process(
    ctx: &BuildContext,
    args: Vec<String>,
    env: Vec<(String, String)>,
    passthrough: &[String],
) -> Invocation {
    let mut args = args;
    args.extend(passthrough.iter().cloned());
    let mut invocation = ProcessInvocation::new(ctx.uv_program.clone(), args);
    invocation.env = env;
    Invocation::Process(invocation)
}

/// 安装软件包: `uv pip install <pkgs> [-r <file>] [--upgrade] [范围标志] [--compile-bytecode]`
pub fn pip_install(
    ctx: &BuildContext,
    scope: PipScope<'_>,
    packages: &[String],
    requirements: Option<&str>,
    upgrade: bool,
    passthrough: &[String],
) -> Invocation {
    let (scope_flags, env) = scope_parts(ctx, scope);
    let mut args = vec!["pip".to_string(), "install".to_string()];
    args.extend(packages.iter().cloned());
    if let Some(file) = requirements {
        args.push("-r".to_string());
        args.push(file.to_string());
    }
    if upgrade {
        args.push("--upgrade".to_string());
    }
    args.extend(scope_flags);
    if ctx.compile_bytecode {
        args.push("--compile-bytecode".to_string());
    }
    uv_process(ctx, args, env, passthrough)
}

/// 卸载软件包: `uv pip uninstall <pkgs> [范围标志]`
pub fn pip_uninstall(
    ctx: &BuildContext,
    scope: PipScope<'_>,
    packages: &[String],
    passthrough: &[String],
) -> Invocation {
    let (scope_flags, env) = scope_parts(ctx, scope);
    let mut args = vec!["pip".to_string(), "uninstall".to_string()];
    args.extend(packages.iter().cloned());
    args.extend(scope_flags);
    uv_process(ctx, args, env, passthrough)
}

/// 列出已安装软件包: `uv pip freeze [范围标志]`
pub fn pip_freeze(ctx: &BuildContext, scope: PipScope<'_>) -> Invocation {
    let (scope_flags, env) = scope_parts(ctx, scope);
    let mut args = vec!["pip".to_string(), "freeze".to_string()];
    args.extend(scope_flags);
    uv_process(ctx, args, env, &[])
}

/// 列出软件包: `uv pip list [--outdated] [范围标志]`
pub fn pip_list(ctx: &BuildContext, scope: PipScope<'_>, outdated: bool) -> Invocation {
    let (scope_flags, env) = scope_parts(ctx, scope);
    let mut args = vec!["pip".to_string(), "list".to_string()];
    if outdated {
        args.push("--outdated".to_string());
    }
    args.extend(scope_flags);
    uv_process(ctx, args, env, &[])
}

/// 依赖树: `uv pip tree`
pub fn pip_tree(ctx: &BuildContext, scope: PipScope<'_>) -> Invocation {
    let (scope_flags, env) = scope_parts(ctx, scope);
    let mut args = vec!["pip".to_string(), "tree".to_string()];
    args.extend(scope_flags);
    uv_process(ctx, args, env, &[])
}

/// 依赖一致性检查: `uv pip check`
pub fn pip_check(ctx: &BuildContext, scope: PipScope<'_>) -> Invocation {
    let (scope_flags, env) = scope_parts(ctx, scope);
    let mut args = vec!["pip".to_string(), "check".to_string()];
    args.extend(scope_flags);
    uv_process(ctx, args, env, &[])
}

/// 创建虚拟环境: `uv venv <path> [-p <python>]`
pub fn venv_create(
    ctx: &BuildContext,
    paths: &VenvPaths,
    python: Option<&str>,
    passthrough: &[String],
) -> Invocation {
    let mut args = vec!["venv".to_string(), paths.root.display().to_string()];
    if let Some(py) = python {
        args.push("-p".to_string());
        args.push(py.to_string());
    }
    uv_process(ctx, args, Vec::new(), passthrough)
}

/// 向项目依赖记录添加并安装软件包: `uv add [--compile-bytecode] <pkgs>`
pub fn uv_add(
    ctx: &BuildContext,
    paths: &VenvPaths,
    packages: &[String],
    passthrough: &[String],
) -> Invocation {
    let mut args = vec!["add".to_string()];
    if ctx.compile_bytecode {
        args.push("--compile-bytecode".to_string());
    }
    args.extend(packages.iter().cloned());
    uv_process(
        ctx,
        args,
        venv_env(paths, ctx.path_var.as_deref()),
        passthrough,
    )
}

/// 从项目依赖记录移除软件包: `uv remove <pkgs>`
pub fn uv_remove(ctx: &BuildContext, paths: &VenvPaths, packages: &[String]) -> Invocation {
    let mut args = vec!["remove".to_string()];
    args.extend(packages.iter().cloned());
    uv_process(ctx, args, venv_env(paths, ctx.path_var.as_deref()), &[])
}

/// 构建分发产物: `uv build [--sdist] [--wheel]`
///
/// 两个标志都未指定时构建全部产物（uv 的默认行为）。
pub fn build(ctx: &BuildContext, sdist: bool, wheel: bool, passthrough: &[String]) -> Invocation {
    let mut args = vec!["build".to_string()];
    if sdist {
        args.push("--sdist".to_string());
    }
    if wheel {
        args.push("--wheel".to_string());
    }
    uv_process(ctx, args, Vec::new(), passthrough)
}

/// 发布产物: `uv publish [--repository <repo>]`
///
/// 产物路径由 uv 默认解析（dist/），不在此处展开通配符。
pub fn publish(ctx: &BuildContext, repository: Option<&str>, passthrough: &[String]) -> Invocation {
    let mut args = vec!["publish".to_string()];
    if let Some(repo) = repository {
        args.push("--repository".to_string());
        args.push(repo.to_string());
    }
    uv_process(ctx, args, Vec::new(), passthrough)
}

/// 激活虚拟环境：写入标记文件
pub fn venv_activate(state: &ActiveEnv, marker: &Path) -> Result<Invocation> {
    Ok(Invocation::Filesystem(vec![FsOp::WriteFile {
        path: marker.to_path_buf(),
        contents: state.to_marker_contents()?,
    }]))
}

/// 取消激活虚拟环境：删除标记文件
pub fn venv_deactivate(marker: &Path) -> Invocation {
    Invocation::Filesystem(vec![FsOp::RemoveFile(marker.to_path_buf())])
}

/// 删除整个虚拟环境目录；若标记指向该环境则一并清除
pub fn venv_remove_env(paths: &VenvPaths, marker_to_clear: Option<&Path>) -> Invocation {
    let mut ops = vec![FsOp::RemoveDirAll(paths.root.clone())];
    if let Some(marker) = marker_to_clear {
        ops.push(FsOp::RemoveFile(marker.to_path_buf()));
    }
    Invocation::Filesystem(ops)
}

/// 创建项目骨架
pub fn project_create(project_dir: &Path, default_python: Option<&str>) -> Result<Invocation> {
    Ok(Invocation::Filesystem(project::create_plan(
        project_dir,
        default_python,
    )?))
}

/// 删除项目目录
pub fn project_delete(project_dir: &Path) -> Invocation {
    Invocation::Filesystem(project::delete_plan(project_dir))
}

/// 列出系统中的 Python 解释器路径
pub fn python_paths_listing() -> Invocation {
    let invocation = if cfg!(windows) {
        ProcessInvocation::new("where.exe", vec!["python".to_string()])
    } else {
        ProcessInvocation::new("which", vec!["-a".to_string(), "python3".to_string()])
    };
    Invocation::Process(invocation)
}

/// 探测指定解释器的版本
pub fn python_version_probe(interpreter: &str) -> Invocation {
    Invocation::Process(ProcessInvocation::new(
        interpreter.to_string(),
        vec!["--version".to_string()],
    ))
}

/// 列出 Python 内建模块
pub fn builtin_modules_listing() -> Invocation {
    let python = if cfg!(windows) { "python" } else { "python3" };
    Invocation::Process(ProcessInvocation::new(
        python,
        vec!["-c".to_string(), BUILTIN_MODULES_SNIPPET.to_string()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;

    fn test_ctx() -> BuildContext {
        BuildContext::new(&ToolConfig::default(), None, Some("/usr/bin".to_string()))
    }

    fn argv(invocation: &Invocation) -> Vec<String> {
        invocation.argv().unwrap().to_vec()
    }

    #[test]
    fn test_builder_is_deterministic() {
        let ctx = test_ctx();
        let packages = vec!["requests".to_string()];
        let passthrough = vec!["-e .".to_string()];

        let first = pip_install(
            &ctx,
            PipScope::Default { python: None },
            &packages,
            None,
            false,
            &passthrough,
        );
        let second = pip_install(
            &ctx,
            PipScope::Default { python: None },
            &packages,
            None,
            false,
            &passthrough,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_install_system_scope() {
        let ctx = test_ctx();
        let invocation = pip_install(
            &ctx,
            PipScope::Default { python: None },
            &["requests".to_string()],
            None,
            false,
            &[],
        );
        assert_eq!(
            argv(&invocation),
            vec!["pip", "install", "requests", "--system", "--compile-bytecode"]
        );
    }

    #[test]
    fn test_install_with_python_selector() {
        let ctx = test_ctx();
        let invocation = pip_install(
            &ctx,
            PipScope::Default {
                python: Some("3.12"),
            },
            &["requests".to_string()],
            None,
            false,
            &[],
        );
        let args = argv(&invocation);
        assert!(args.contains(&"--python".to_string()));
        assert!(args.contains(&"3.12".to_string()));
        assert!(!args.contains(&"--system".to_string()));
    }

    #[test]
    fn test_install_with_active_env_injects_environment() {
        let config = ToolConfig::default();
        let paths = VenvPaths::new("/work/.venv");
        let ctx = BuildContext::new(&config, Some(paths.clone()), Some("/usr/bin".to_string()));

        let invocation = pip_install(
            &ctx,
            PipScope::Default { python: None },
            &["requests".to_string()],
            None,
            false,
            &[],
        );
        let Invocation::Process(process) = &invocation else {
            panic!("应为进程调用");
        };
        assert!(!process.args.contains(&"--system".to_string()));
        assert!(process
            .env
            .iter()
            .any(|(key, value)| key == "VIRTUAL_ENV" && value.contains(".venv")));
        let path_entry = process
            .env
            .iter()
            .find(|(key, _)| key == "PATH")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert!(path_entry.starts_with(&paths.bin_dir.display().to_string()));
    }

    #[test]
    fn test_passthrough_appended_last_in_order() {
        let ctx = test_ctx();
        let passthrough = vec!["--no-cache".to_string(), "-e .".to_string()];
        let invocation = pip_install(
            &ctx,
            PipScope::Default { python: None },
            &["requests".to_string()],
            None,
            false,
            &passthrough,
        );
        let args = argv(&invocation);
        assert_eq!(args[args.len() - 2], "--no-cache");
        assert_eq!(args[args.len() - 1], "-e .");
    }

    #[test]
    fn test_upgrade_flag() {
        let ctx = test_ctx();
        let invocation = pip_install(
            &ctx,
            PipScope::Default { python: None },
            &["requests".to_string()],
            None,
            true,
            &[],
        );
        assert!(argv(&invocation).contains(&"--upgrade".to_string()));
    }

    #[test]
    fn test_build_flag_mapping() {
        let ctx = test_ctx();
        assert_eq!(argv(&build(&ctx, false, false, &[])), vec!["build"]);
        assert_eq!(
            argv(&build(&ctx, true, false, &[])),
            vec!["build", "--sdist"]
        );
        assert_eq!(
            argv(&build(&ctx, true, true, &[])),
            vec!["build", "--sdist", "--wheel"]
        );
    }

    #[test]
    fn test_publish_repository_mapping() {
        let ctx = test_ctx();
        assert_eq!(argv(&publish(&ctx, None, &[])), vec!["publish"]);
        assert_eq!(
            argv(&publish(&ctx, Some("testpypi"), &[])),
            vec!["publish", "--repository", "testpypi"]
        );
    }

    #[test]
    fn test_venv_create_with_python() {
        let ctx = test_ctx();
        let paths = VenvPaths::new(".venv");
        let invocation = venv_create(&ctx, &paths, Some("3.12"), &[]);
        assert_eq!(argv(&invocation), vec!["venv", ".venv", "-p", "3.12"]);
    }

    #[test]
    fn test_venv_remove_env_clears_marker() {
        let paths = VenvPaths::new("/work/.venv");
        let marker = Path::new("/state/active_env.json");
        let invocation = venv_remove_env(&paths, Some(marker));
        let Invocation::Filesystem(ops) = invocation else {
            panic!("应为文件系统调用");
        };
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], FsOp::RemoveDirAll(_)));
        assert!(matches!(ops[1], FsOp::RemoveFile(_)));
    }

    #[test]
    fn test_pip_check_minimal() {
        let ctx = test_ctx();
        let invocation = pip_check(&ctx, PipScope::Default { python: None });
        assert_eq!(argv(&invocation), vec!["pip", "check", "--system"]);
    }
}
