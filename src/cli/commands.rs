//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑。处理器负责编排：调用纯函数构建器
//! 生成调用计划，交给执行器运行，再把结果交给呈现层。多步命令
//! （如 update --all）的中间捕获输出也在这里解析。

use crate::cli::args::{Commands, ParsedCommand, VenvCommands};
use crate::config::ToolConfig;
use crate::error::{Result, UvkitError};
use crate::invoke::{builder, BuildContext, Executor, OutputMode, PipScope};
use crate::output;
use crate::venv::{ActiveEnv, VenvPaths};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// 命令执行上下文
///
/// 每次运行构造一次：解析结果、配置、构建上下文与执行器。
/// 激活环境标记在这里读取一次，之后不再访问外部状态。
pub struct CommandContext {
    /// 解析完成的命令
    pub parsed: ParsedCommand,
    /// 工具配置
    pub config: ToolConfig,
    /// 调用构建上下文
    pub build: BuildContext,
    /// 调用执行器
    pub executor: Executor,
    /// 激活环境标记文件路径
    pub marker_path: PathBuf,
}

impl CommandContext {
    /// 创建命令执行上下文
    pub fn new(parsed: ParsedCommand, config: ToolConfig) -> Self {
        let marker_path = ActiveEnv::marker_path();
        let active_env = match ActiveEnv::load(&marker_path) {
            Ok(state) => state.map(|state| VenvPaths::new(state.venv_path)),
            Err(e) => {
                warn!("激活环境标记文件无法读取，按未激活处理: {e}");
                None
            }
        };
        let build = BuildContext::new(&config, active_env, std::env::var("PATH").ok());
        Self {
            parsed,
            config,
            build,
            executor: Executor::new(),
            marker_path,
        }
    }
}

/// 命令处理器trait
///
/// 返回值是包装器自身的退出码：进程调用原样传递子进程退出码，
/// 文件系统操作成功为0。
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, ctx: &CommandContext) -> Result<i32>;
}

/// 执行解析完成的命令
pub async fn execute_command(ctx: &CommandContext) -> Result<i32> {
    match &ctx.parsed.command {
        Commands::Install { .. } => InstallCommand.execute(ctx).await,
        Commands::Uninstall { .. } => UninstallCommand.execute(ctx).await,
        Commands::Update { .. } => UpdateCommand.execute(ctx).await,
        Commands::List { .. } => ListCommand.execute(ctx).await,
        Commands::Venv(_) => VenvCommand.execute(ctx).await,
        Commands::ProjectCreate { .. } => ProjectCreateCommand.execute(ctx).await,
        Commands::ProjectDelete { .. } => ProjectDeleteCommand.execute(ctx).await,
        Commands::Build { .. } => BuildCommand.execute(ctx).await,
        Commands::Publish { .. } => PublishCommand.execute(ctx).await,
        Commands::Check => CheckCommand.execute(ctx).await,
    }
}

/// 安装命令
pub struct InstallCommand;

#[async_trait]
impl Command for InstallCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::Install {
            packages,
            python,
            requirements,
        } = &ctx.parsed.command
        {
            let invocation = builder::pip_install(
                &ctx.build,
                PipScope::Default {
                    python: python.as_deref(),
                },
                packages,
                requirements.as_deref(),
                false,
                &ctx.parsed.passthrough,
            );
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if result.is_success() {
                output::print_success("软件包安装完成");
            }
            Ok(result.exit_code)
        } else {
            Ok(0)
        }
    }
}

/// 卸载命令
pub struct UninstallCommand;

#[async_trait]
impl Command for UninstallCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::Uninstall { packages, python } = &ctx.parsed.command {
            let invocation = builder::pip_uninstall(
                &ctx.build,
                PipScope::Default {
                    python: python.as_deref(),
                },
                packages,
                &ctx.parsed.passthrough,
            );
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if result.is_success() {
                output::print_success("软件包卸载完成");
            }
            Ok(result.exit_code)
        } else {
            Ok(0)
        }
    }
}

/// 升级命令
pub struct UpdateCommand;

#[async_trait]
impl Command for UpdateCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::Update {
            packages,
            python,
            all,
        } = &ctx.parsed.command
        {
            if *all {
                self.update_all(ctx, python.as_deref()).await
            } else {
                let invocation = builder::pip_install(
                    &ctx.build,
                    PipScope::Default {
                        python: python.as_deref(),
                    },
                    packages,
                    None,
                    true,
                    &ctx.parsed.passthrough,
                );
                let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
                if result.is_success() {
                    output::print_success("软件包升级完成");
                }
                Ok(result.exit_code)
            }
        } else {
            Ok(0)
        }
    }
}

impl UpdateCommand {
    /// 升级全部软件包：先捕获 freeze 输出，再逐个升级
    async fn update_all(&self, ctx: &CommandContext, python: Option<&str>) -> Result<i32> {
        let freeze = builder::pip_freeze(&ctx.build, PipScope::Default { python });
        let result = ctx.executor.run(&freeze, OutputMode::Captured).await?;
        if !result.is_success() {
            eprint!("{}", result.stderr);
            return Ok(result.exit_code);
        }

        let packages = parse_freeze_names(&result.stdout);
        if packages.is_empty() {
            println!("没有可升级的软件包");
            return Ok(0);
        }

        let mut worst_exit_code = 0;
        for package in &packages {
            let invocation = builder::pip_install(
                &ctx.build,
                PipScope::Default { python },
                std::slice::from_ref(package),
                None,
                true,
                &[],
            );
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if !result.is_success() {
                output::print_error(&format!("升级 {package} 失败"));
                worst_exit_code = result.exit_code;
            }
        }

        if worst_exit_code == 0 {
            output::print_success("全部软件包升级完成");
        }
        Ok(worst_exit_code)
    }
}

/// 从 `pip freeze` 输出提取软件包名称
fn parse_freeze_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(|line| line.split("==").next())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// 列表命令
pub struct ListCommand;

#[async_trait]
impl Command for ListCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::List {
            python,
            internal,
            external,
            outdated,
            all: _,
        } = &ctx.parsed.command
        {
            if *python {
                let exit_code = self.list_python_versions(ctx).await?;
                if exit_code != 0 {
                    return Ok(exit_code);
                }
            }
            if *internal {
                let exit_code = self.list_internal_modules(ctx).await?;
                if exit_code != 0 {
                    return Ok(exit_code);
                }
            }
            if *external {
                let invocation =
                    builder::pip_list(&ctx.build, PipScope::Default { python: None }, false);
                let result = ctx.executor.run(&invocation, OutputMode::Captured).await?;
                if !result.is_success() {
                    eprint!("{}", result.stderr);
                    return Ok(result.exit_code);
                }
                output::print_package_table(&result.stdout);
            }
            if *outdated {
                let invocation =
                    builder::pip_list(&ctx.build, PipScope::Default { python: None }, true);
                let result = ctx.executor.run(&invocation, OutputMode::Captured).await?;
                if !result.is_success() {
                    eprint!("{}", result.stderr);
                    return Ok(result.exit_code);
                }
                output::print_outdated_table(&result.stdout);
            }
        }
        Ok(0)
    }
}

impl ListCommand {
    /// 列出系统中的 Python 解释器及其版本
    async fn list_python_versions(&self, ctx: &CommandContext) -> Result<i32> {
        let listing = builder::python_paths_listing();
        let result = ctx.executor.run(&listing, OutputMode::Captured).await?;
        if !result.is_success() {
            eprint!("{}", result.stderr);
            return Ok(result.exit_code);
        }

        let mut rows = Vec::new();
        for path in result.stdout.lines().map(str::trim).filter(|p| !p.is_empty()) {
            let probe = builder::python_version_probe(path);
            let version = match ctx.executor.run(&probe, OutputMode::Captured).await {
                Ok(probe_result) if probe_result.is_success() => {
                    let raw = if probe_result.stdout.trim().is_empty() {
                        probe_result.stderr
                    } else {
                        probe_result.stdout
                    };
                    let version = raw.trim().to_string();
                    if path.contains("venv") {
                        format!("venv {}", version.trim_start_matches("Python").trim())
                    } else {
                        version
                    }
                }
                _ => "未知".to_string(),
            };
            rows.push((version, path.to_string()));
        }
        output::print_python_table(&rows);
        Ok(0)
    }

    /// 列出 Python 内建模块
    async fn list_internal_modules(&self, ctx: &CommandContext) -> Result<i32> {
        let invocation = builder::builtin_modules_listing();
        let result = ctx.executor.run(&invocation, OutputMode::Captured).await?;
        if !result.is_success() {
            eprint!("{}", result.stderr);
            return Ok(result.exit_code);
        }
        output::print_builtin_modules(&result.stdout);
        Ok(0)
    }
}

/// 虚拟环境命令
pub struct VenvCommand;

#[async_trait]
impl Command for VenvCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::Venv(sub) = &ctx.parsed.command {
            match sub {
                VenvCommands::Create { path, python } => {
                    self.create(ctx, path, python.as_deref()).await
                }
                VenvCommands::Add { packages, path } => self.add(ctx, packages, path).await,
                VenvCommands::Update {
                    packages,
                    all,
                    path,
                } => self.update(ctx, packages, *all, path).await,
                VenvCommands::Activate { path } => self.activate(ctx, path).await,
                VenvCommands::Deactivate => self.deactivate(ctx).await,
                VenvCommands::Remove {
                    packages,
                    venv,
                    yes,
                    path,
                } => self.remove(ctx, packages, *venv, *yes, path).await,
                VenvCommands::List {
                    packages,
                    deps,
                    outdated,
                    all: _,
                    path,
                } => self.list(ctx, *packages, *deps, *outdated, path).await,
            }
        } else {
            Ok(0)
        }
    }
}

impl VenvCommand {
    /// 推导目标虚拟环境目录（未指定时使用配置默认值）
    fn venv_paths(&self, ctx: &CommandContext, path: &Option<PathBuf>) -> VenvPaths {
        VenvPaths::new(
            path.clone()
                .unwrap_or_else(|| PathBuf::from(&ctx.config.venv_dir)),
        )
    }

    async fn create(
        &self,
        ctx: &CommandContext,
        path: &Option<PathBuf>,
        python: Option<&str>,
    ) -> Result<i32> {
        let paths = self.venv_paths(ctx, path);
        let python = python.or(ctx.config.default_python.as_deref());
        let invocation =
            builder::venv_create(&ctx.build, &paths, python, &ctx.parsed.passthrough);
        let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
        if result.is_success() {
            output::print_success("虚拟环境创建完成");
        }
        Ok(result.exit_code)
    }

    async fn add(
        &self,
        ctx: &CommandContext,
        packages: &[String],
        path: &Option<PathBuf>,
    ) -> Result<i32> {
        let paths = self.venv_paths(ctx, path);
        let invocation = builder::uv_add(&ctx.build, &paths, packages, &ctx.parsed.passthrough);
        let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
        if result.is_success() {
            output::print_success(&format!("软件包 {} 添加完成", packages.join(", ")));
        }
        Ok(result.exit_code)
    }

    async fn update(
        &self,
        ctx: &CommandContext,
        packages: &[String],
        all: bool,
        path: &Option<PathBuf>,
    ) -> Result<i32> {
        let paths = self.venv_paths(ctx, path);
        if all {
            // 先捕获过期列表，再一次性升级
            let outdated = builder::pip_list(&ctx.build, PipScope::Venv(&paths), true);
            let result = ctx.executor.run(&outdated, OutputMode::Captured).await?;
            if !result.is_success() {
                eprint!("{}", result.stderr);
                return Ok(result.exit_code);
            }
            let names: Vec<String> = output::parse_table_rows(&result.stdout)
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .collect();
            if names.is_empty() {
                println!("没有可升级的软件包");
                return Ok(0);
            }
            let invocation =
                builder::pip_install(&ctx.build, PipScope::Venv(&paths), &names, None, true, &[]);
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if result.is_success() {
                output::print_success("全部软件包升级完成");
            }
            Ok(result.exit_code)
        } else {
            let invocation = builder::pip_install(
                &ctx.build,
                PipScope::Venv(&paths),
                packages,
                None,
                true,
                &ctx.parsed.passthrough,
            );
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if result.is_success() {
                output::print_success("软件包升级完成");
            }
            Ok(result.exit_code)
        }
    }

    async fn activate(&self, ctx: &CommandContext, path: &Option<PathBuf>) -> Result<i32> {
        let paths = self.venv_paths(ctx, path);
        if !paths.exists() {
            return Err(UvkitError::Filesystem {
                path: paths.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "虚拟环境目录不存在"),
            });
        }
        let state = ActiveEnv::new(&paths.root);
        let invocation = builder::venv_activate(&state, &ctx.marker_path)?;
        ctx.executor.run(&invocation, OutputMode::Streamed).await?;
        output::print_success("虚拟环境已激活，后续软件包命令将在该环境中执行");
        Ok(0)
    }

    async fn deactivate(&self, ctx: &CommandContext) -> Result<i32> {
        // 以标记文件本身为准，损坏的标记也要能被取消激活
        if !ctx.marker_path.exists() {
            println!("当前没有已激活的虚拟环境");
            return Ok(0);
        }
        let invocation = builder::venv_deactivate(&ctx.marker_path);
        ctx.executor.run(&invocation, OutputMode::Streamed).await?;
        output::print_success("虚拟环境已取消激活");
        Ok(0)
    }

    async fn remove(
        &self,
        ctx: &CommandContext,
        packages: &[String],
        _venv: bool,
        yes: bool,
        path: &Option<PathBuf>,
    ) -> Result<i32> {
        let paths = self.venv_paths(ctx, path);

        if !packages.is_empty() {
            // 先卸载，再从依赖记录移除
            let uninstall = builder::pip_uninstall(
                &ctx.build,
                PipScope::Venv(&paths),
                packages,
                &ctx.parsed.passthrough,
            );
            let result = ctx.executor.run(&uninstall, OutputMode::Streamed).await?;
            if !result.is_success() {
                return Ok(result.exit_code);
            }

            let remove = builder::uv_remove(&ctx.build, &paths, packages);
            let result = ctx.executor.run(&remove, OutputMode::Streamed).await?;
            if result.is_success() {
                output::print_success(&format!("软件包 {} 移除完成", packages.join(", ")));
            }
            return Ok(result.exit_code);
        }

        // 验证层保证走到这里时 --venv 已给出
        if !yes
            && !output::confirm(&format!(
                "确定要删除虚拟环境 {} 吗?",
                paths.root.display()
            ))
        {
            println!("已取消");
            return Ok(0);
        }

        let marker_to_clear = ctx
            .build
            .active_env
            .as_ref()
            .filter(|active| active.root == paths.root)
            .map(|_| ctx.marker_path.as_path());
        let invocation = builder::venv_remove_env(&paths, marker_to_clear);
        ctx.executor.run(&invocation, OutputMode::Streamed).await?;
        output::print_success("虚拟环境删除完成");
        Ok(0)
    }

    async fn list(
        &self,
        ctx: &CommandContext,
        packages: bool,
        deps: bool,
        outdated: bool,
        path: &Option<PathBuf>,
    ) -> Result<i32> {
        let paths = self.venv_paths(ctx, path);

        if packages {
            println!("\n已安装软件包:\n");
            let invocation = builder::pip_freeze(&ctx.build, PipScope::Venv(&paths));
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if !result.is_success() {
                return Ok(result.exit_code);
            }
        }
        if deps {
            println!("\n依赖树:\n");
            let invocation = builder::pip_tree(&ctx.build, PipScope::Venv(&paths));
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if !result.is_success() {
                return Ok(result.exit_code);
            }
        }
        if outdated {
            let invocation = builder::pip_list(&ctx.build, PipScope::Venv(&paths), true);
            let result = ctx.executor.run(&invocation, OutputMode::Captured).await?;
            if !result.is_success() {
                eprint!("{}", result.stderr);
                return Ok(result.exit_code);
            }
            output::print_outdated_table(&result.stdout);
        }
        Ok(0)
    }
}

/// 项目创建命令
pub struct ProjectCreateCommand;

#[async_trait]
impl Command for ProjectCreateCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::ProjectCreate { path } = &ctx.parsed.command {
            if path.exists() {
                return Err(UvkitError::Filesystem {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "目标目录已存在",
                    ),
                });
            }
            let invocation =
                builder::project_create(path, ctx.config.default_python.as_deref())?;
            ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            output::print_success(&format!("项目 {} 创建完成", path.display()));
        }
        Ok(0)
    }
}

/// 项目删除命令
pub struct ProjectDeleteCommand;

#[async_trait]
impl Command for ProjectDeleteCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::ProjectDelete { path, yes } = &ctx.parsed.command {
            if !path.exists() {
                return Err(UvkitError::Filesystem {
                    path: path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "目标目录不存在"),
                });
            }
            if !yes
                && !output::confirm(&format!("确定要删除项目 {} 吗?", path.display()))
            {
                println!("已取消");
                return Ok(0);
            }
            let invocation = builder::project_delete(path);
            ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            output::print_success(&format!("项目 {} 删除完成", path.display()));
        }
        Ok(0)
    }
}

/// 构建命令
pub struct BuildCommand;

#[async_trait]
impl Command for BuildCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::Build { sdist, wheel } = &ctx.parsed.command {
            let invocation =
                builder::build(&ctx.build, *sdist, *wheel, &ctx.parsed.passthrough);
            let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
            if result.is_success() {
                output::print_success("构建完成");
            }
            Ok(result.exit_code)
        } else {
            Ok(0)
        }
    }
}

/// 发布命令
pub struct PublishCommand;

#[async_trait]
impl Command for PublishCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if let Commands::Publish {
            test_pypi,
            pypi,
            all: _,
        } = &ctx.parsed.command
        {
            if *test_pypi {
                let invocation =
                    builder::publish(&ctx.build, Some("testpypi"), &ctx.parsed.passthrough);
                let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
                if !result.is_success() {
                    return Ok(result.exit_code);
                }
                output::print_success("已发布到 TestPyPI");
            }
            if *pypi {
                let invocation = builder::publish(&ctx.build, None, &ctx.parsed.passthrough);
                let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
                if !result.is_success() {
                    return Ok(result.exit_code);
                }
                output::print_success("已发布到 PyPI");
            }
        }
        Ok(0)
    }
}

/// 依赖检查命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let invocation = builder::pip_check(&ctx.build, PipScope::Default { python: None });
        let result = ctx.executor.run(&invocation, OutputMode::Streamed).await?;
        Ok(result.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_freeze_names() {
        let stdout = "requests==2.32.0\nurllib3==2.2.1\n-e /work/demo\n\n";
        let names = parse_freeze_names(stdout);
        assert_eq!(names, vec!["requests".to_string(), "urllib3".to_string()]);
    }

    #[test]
    fn test_parse_freeze_names_empty() {
        assert!(parse_freeze_names("").is_empty());
    }
}
