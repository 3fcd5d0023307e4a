//! 命令行参数定义与解析
//!
//! 手写语法解析器：识别子命令、匹配各命令的选项表、解码 `*`/`!`
//! 透传转义。单横线长选项（-py）与转义语法超出 clap 的参数模型，
//! 因此这里不使用派生解析。
//!
//! 解析输出是完整填充并验证过的命令变体，加上按原始顺序保留的
//! 透传参数列表。所有解析与验证错误都在构建任何调用之前返回。

use crate::error::ParseError;
use std::path::PathBuf;

/// 透传转义前缀：以此开头的参数原样转发给底层工具
pub const ESCAPE_SENTINEL: char = '*';
/// 转义参数中表示空格的占位符
pub const SPACE_PLACEHOLDER: char = '!';

/// 解析完成的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// 命令本体
    pub command: Commands,
    /// 透传参数，保持原始相对顺序，追加在结构化参数之后
    pub passthrough: Vec<String>,
}

/// 子命令定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// 安装软件包
    Install {
        packages: Vec<String>,
        python: Option<String>,
        requirements: Option<String>,
    },
    /// 卸载软件包
    Uninstall {
        packages: Vec<String>,
        python: Option<String>,
    },
    /// 升级软件包
    Update {
        packages: Vec<String>,
        python: Option<String>,
        all: bool,
    },
    /// 列出解释器与软件包（范围标志可组合）
    List {
        python: bool,
        internal: bool,
        external: bool,
        outdated: bool,
        all: bool,
    },
    /// 虚拟环境子命令
    Venv(VenvCommands),
    /// 创建项目骨架
    ProjectCreate { path: PathBuf },
    /// 删除项目目录
    ProjectDelete { path: PathBuf, yes: bool },
    /// 构建分发产物
    Build { sdist: bool, wheel: bool },
    /// 发布产物
    Publish {
        test_pypi: bool,
        pypi: bool,
        all: bool,
    },
    /// 依赖一致性检查
    Check,
}

/// 虚拟环境子命令定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenvCommands {
    /// 创建虚拟环境
    Create {
        path: Option<PathBuf>,
        python: Option<String>,
    },
    /// 添加软件包并写入依赖记录
    Add {
        packages: Vec<String>,
        path: Option<PathBuf>,
    },
    /// 升级环境内软件包
    Update {
        packages: Vec<String>,
        all: bool,
        path: Option<PathBuf>,
    },
    /// 激活虚拟环境
    Activate { path: Option<PathBuf> },
    /// 取消激活
    Deactivate,
    /// 移除软件包或整个环境
    Remove {
        packages: Vec<String>,
        venv: bool,
        yes: bool,
        path: Option<PathBuf>,
    },
    /// 列出环境内软件包、依赖树或过期软件包
    List {
        packages: bool,
        deps: bool,
        outdated: bool,
        all: bool,
        path: Option<PathBuf>,
    },
}

/// 判断参数是否为转义token
pub fn is_escaped(token: &str) -> bool {
    token.starts_with(ESCAPE_SENTINEL)
}

/// 解码透传token：去掉前缀并把每个占位符还原为一个空格
///
/// 解码结果是单个参数，不再按空白切分。
pub fn decode_escaped(token: &str) -> String {
    debug_assert!(is_escaped(token));
    token[ESCAPE_SENTINEL.len_utf8()..].replace(SPACE_PLACEHOLDER, " ")
}

/// 剩余参数游标
struct Tokens<'a> {
    items: &'a [String],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(items: &'a [String]) -> Self {
        Self { items, pos: 0 }
    }

    fn next(&mut self) -> Option<&'a String> {
        let token = self.items.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&'a String> {
        self.items.get(self.pos)
    }

    /// 取选项值：下一个非转义token；否则报缺少参数
    fn take_value(&mut self, option: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if !is_escaped(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            _ => Err(ParseError::MissingArgument {
                what: format!("选项 {option} 需要一个值"),
            }),
        }
    }
}

/// 解析完整参数列表（不含程序名）
pub fn parse(raw: &[String]) -> Result<ParsedCommand, ParseError> {
    let mut tokens = Tokens::new(raw);
    let first = tokens.next().ok_or_else(|| ParseError::MissingArgument {
        what: "子命令".to_string(),
    })?;

    let mut passthrough = Vec::new();
    let command = match first.as_str() {
        "install" => parse_install(&mut tokens, &mut passthrough)?,
        "uninstall" => {
            let (packages, python) = parse_package_args(&mut tokens, &mut passthrough)?;
            Commands::Uninstall { packages, python }
        }
        "update" => parse_update(&mut tokens, &mut passthrough)?,
        "list" => parse_list(&mut tokens, &mut passthrough)?,
        "venv" => parse_venv(&mut tokens, &mut passthrough)?,
        "create" => parse_project_create(&mut tokens, &mut passthrough)?,
        "delete" => parse_project_delete(&mut tokens, &mut passthrough)?,
        "build" => parse_build(&mut tokens, &mut passthrough)?,
        "publish" => parse_publish(&mut tokens, &mut passthrough)?,
        "check" => parse_check(&mut tokens, &mut passthrough)?,
        other => {
            return Err(ParseError::UnknownCommand {
                token: other.to_string(),
            })
        }
    };

    let command = command.normalized();
    validate(&command, &passthrough)?;
    Ok(ParsedCommand {
        command,
        passthrough,
    })
}

fn parse_install(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut packages = Vec::new();
    let mut python = None;
    let mut requirements = None;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            "-py" | "--python" => python = Some(tokens.take_value("-py/--python")?),
            "-r" | "--requirements" => {
                requirements = Some(tokens.take_value("-r/--requirements")?)
            }
            flag if flag.starts_with('-') => {
                return Err(ParseError::UnknownOption {
                    token: flag.to_string(),
                })
            }
            _ => packages.push(token.clone()),
        }
    }
    Ok(Commands::Install {
        packages,
        python,
        requirements,
    })
}

/// uninstall：软件包位置参数 + 版本选择器
fn parse_package_args(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<(Vec<String>, Option<String>), ParseError> {
    let mut packages = Vec::new();
    let mut python = None;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            "-py" | "--python" => python = Some(tokens.take_value("-py/--python")?),
            flag if flag.starts_with('-') => {
                return Err(ParseError::UnknownOption {
                    token: flag.to_string(),
                })
            }
            _ => packages.push(token.clone()),
        }
    }
    Ok((packages, python))
}

fn parse_update(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut packages = Vec::new();
    let mut python = None;
    let mut all = false;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            "-py" | "--python" => python = Some(tokens.take_value("-py/--python")?),
            "--all" => all = true,
            flag if flag.starts_with('-') => {
                return Err(ParseError::UnknownOption {
                    token: flag.to_string(),
                })
            }
            _ => packages.push(token.clone()),
        }
    }
    Ok(Commands::Update {
        packages,
        python,
        all,
    })
}

fn parse_list(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut python = false;
    let mut internal = false;
    let mut external = false;
    let mut outdated = false;
    let mut all = false;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            // list 中 -py 是范围标志而不是取值选项
            "-py" | "--python" => python = true,
            "--internal" => internal = true,
            "--external" => external = true,
            "--outdated" => outdated = true,
            "--all" => all = true,
            other => {
                return Err(ParseError::UnknownOption {
                    token: other.to_string(),
                })
            }
        }
    }
    Ok(Commands::List {
        python,
        internal,
        external,
        outdated,
        all,
    })
}

fn parse_venv(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let sub = tokens.next().ok_or_else(|| ParseError::MissingArgument {
        what: "venv 子命令".to_string(),
    })?;

    let command = match sub.as_str() {
        "create" => {
            let mut path = None;
            let mut python = None;
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                match token.as_str() {
                    "-p" | "--path" => path = Some(PathBuf::from(tokens.take_value("-p/--path")?)),
                    "-py" | "--python" => python = Some(tokens.take_value("-py/--python")?),
                    other => {
                        return Err(ParseError::UnknownOption {
                            token: other.to_string(),
                        })
                    }
                }
            }
            VenvCommands::Create { path, python }
        }
        "add" => {
            let mut packages = Vec::new();
            let mut path = None;
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                match token.as_str() {
                    "-p" | "--path" => path = Some(PathBuf::from(tokens.take_value("-p/--path")?)),
                    flag if flag.starts_with('-') => {
                        return Err(ParseError::UnknownOption {
                            token: flag.to_string(),
                        })
                    }
                    _ => packages.push(token.clone()),
                }
            }
            VenvCommands::Add { packages, path }
        }
        "update" => {
            let mut packages = Vec::new();
            let mut all = false;
            let mut path = None;
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                match token.as_str() {
                    "-p" | "--path" => path = Some(PathBuf::from(tokens.take_value("-p/--path")?)),
                    "--all" => all = true,
                    flag if flag.starts_with('-') => {
                        return Err(ParseError::UnknownOption {
                            token: flag.to_string(),
                        })
                    }
                    _ => packages.push(token.clone()),
                }
            }
            VenvCommands::Update {
                packages,
                all,
                path,
            }
        }
        "activate" => {
            let mut path = None;
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                match token.as_str() {
                    "-p" | "--path" => path = Some(PathBuf::from(tokens.take_value("-p/--path")?)),
                    other => {
                        return Err(ParseError::UnknownOption {
                            token: other.to_string(),
                        })
                    }
                }
            }
            VenvCommands::Activate { path }
        }
        "deactivate" => {
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                return Err(ParseError::UnknownOption {
                    token: token.to_string(),
                });
            }
            VenvCommands::Deactivate
        }
        "remove" => {
            let mut packages = Vec::new();
            let mut venv = false;
            let mut yes = false;
            let mut path = None;
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                match token.as_str() {
                    "-p" | "--path" => path = Some(PathBuf::from(tokens.take_value("-p/--path")?)),
                    "--venv" => venv = true,
                    "-y" | "--yes" => yes = true,
                    flag if flag.starts_with('-') => {
                        return Err(ParseError::UnknownOption {
                            token: flag.to_string(),
                        })
                    }
                    _ => packages.push(token.clone()),
                }
            }
            VenvCommands::Remove {
                packages,
                venv,
                yes,
                path,
            }
        }
        "list" => {
            let mut list_packages = false;
            let mut deps = false;
            let mut outdated = false;
            let mut all = false;
            let mut path = None;
            while let Some(token) = tokens.next() {
                if is_escaped(token) {
                    passthrough.push(decode_escaped(token));
                    continue;
                }
                match token.as_str() {
                    "-p" | "--path" => path = Some(PathBuf::from(tokens.take_value("-p/--path")?)),
                    "--packages" => list_packages = true,
                    "--deps" => deps = true,
                    "--outdated" => outdated = true,
                    "--all" => all = true,
                    other => {
                        return Err(ParseError::UnknownOption {
                            token: other.to_string(),
                        })
                    }
                }
            }
            VenvCommands::List {
                packages: list_packages,
                deps,
                outdated,
                all,
                path,
            }
        }
        other => {
            return Err(ParseError::UnknownCommand {
                token: other.to_string(),
            })
        }
    };

    Ok(Commands::Venv(command))
}

fn parse_project_create(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut path = None;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        if token.starts_with('-') || path.is_some() {
            return Err(ParseError::UnknownOption {
                token: token.to_string(),
            });
        }
        path = Some(PathBuf::from(token));
    }
    let path = path.ok_or_else(|| ParseError::MissingArgument {
        what: "目标路径".to_string(),
    })?;
    Ok(Commands::ProjectCreate { path })
}

fn parse_project_delete(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut path = None;
    let mut yes = false;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            "-y" | "--yes" => yes = true,
            other if other.starts_with('-') || path.is_some() => {
                return Err(ParseError::UnknownOption {
                    token: other.to_string(),
                })
            }
            other => path = Some(PathBuf::from(other)),
        }
    }
    let path = path.ok_or_else(|| ParseError::MissingArgument {
        what: "目标路径".to_string(),
    })?;
    Ok(Commands::ProjectDelete { path, yes })
}

fn parse_build(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut sdist = false;
    let mut wheel = false;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            "--sdist" => sdist = true,
            "--wheel" => wheel = true,
            other => {
                return Err(ParseError::UnknownOption {
                    token: other.to_string(),
                })
            }
        }
    }
    Ok(Commands::Build { sdist, wheel })
}

fn parse_publish(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    let mut test_pypi = false;
    let mut pypi = false;
    let mut all = false;
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        match token.as_str() {
            "--test-pypi" => test_pypi = true,
            "--pypi" => pypi = true,
            "--all" => all = true,
            other => {
                return Err(ParseError::UnknownOption {
                    token: other.to_string(),
                })
            }
        }
    }
    Ok(Commands::Publish {
        test_pypi,
        pypi,
        all,
    })
}

fn parse_check(
    tokens: &mut Tokens<'_>,
    passthrough: &mut Vec<String>,
) -> Result<Commands, ParseError> {
    while let Some(token) = tokens.next() {
        if is_escaped(token) {
            passthrough.push(decode_escaped(token));
            continue;
        }
        return Err(ParseError::UnknownOption {
            token: token.to_string(),
        });
    }
    Ok(Commands::Check)
}

impl Commands {
    /// 归一化：`--all` 展开为全部单项范围标志的并集
    fn normalized(mut self) -> Self {
        match &mut self {
            Commands::List {
                python,
                internal,
                external,
                outdated,
                all,
            } if *all => {
                *python = true;
                *internal = true;
                *external = true;
                *outdated = true;
            }
            Commands::Venv(VenvCommands::List {
                packages,
                deps,
                outdated,
                all,
                ..
            }) if *all => {
                *packages = true;
                *deps = true;
                *outdated = true;
            }
            Commands::Publish {
                test_pypi,
                pypi,
                all,
            } if *all => {
                *test_pypi = true;
                *pypi = true;
            }
            _ => {}
        }
        self
    }
}

/// 命令级验证：保证构建器只会见到可执行的命令
fn validate(command: &Commands, passthrough: &[String]) -> Result<(), ParseError> {
    match command {
        Commands::Install {
            packages,
            requirements,
            ..
        } => {
            if packages.is_empty() && requirements.is_none() && passthrough.is_empty() {
                return Err(ParseError::MissingArgument {
                    what: "软件包名称、-r 依赖文件或透传参数".to_string(),
                });
            }
        }
        Commands::Uninstall { packages, .. } => {
            if packages.is_empty() && passthrough.is_empty() {
                return Err(ParseError::MissingArgument {
                    what: "软件包名称或透传参数".to_string(),
                });
            }
        }
        Commands::Update { packages, all, .. } => {
            if packages.is_empty() && !all {
                return Err(ParseError::MissingArgument {
                    what: "软件包名称或 --all".to_string(),
                });
            }
        }
        Commands::List {
            python,
            internal,
            external,
            outdated,
            all,
        } => {
            if !(*python || *internal || *external || *outdated || *all) {
                return Err(ParseError::MissingArgument {
                    what: "至少一个范围选项 (-py/--internal/--external/--outdated/--all)"
                        .to_string(),
                });
            }
        }
        Commands::Venv(VenvCommands::Add { packages, .. }) => {
            if packages.is_empty() {
                return Err(ParseError::MissingArgument {
                    what: "软件包名称".to_string(),
                });
            }
        }
        Commands::Venv(VenvCommands::Update { packages, all, .. }) => {
            if packages.is_empty() && !all {
                return Err(ParseError::MissingArgument {
                    what: "软件包名称或 --all".to_string(),
                });
            }
        }
        Commands::Venv(VenvCommands::Remove { packages, venv, .. }) => {
            if packages.is_empty() && !venv {
                return Err(ParseError::MissingArgument {
                    what: "软件包名称或 --venv".to_string(),
                });
            }
        }
        Commands::Venv(VenvCommands::List {
            packages,
            deps,
            outdated,
            all,
            ..
        }) => {
            if !(*packages || *deps || *outdated || *all) {
                return Err(ParseError::MissingArgument {
                    what: "至少一个范围选项 (--packages/--deps/--outdated/--all)".to_string(),
                });
            }
        }
        Commands::Publish {
            test_pypi,
            pypi,
            all,
        } => {
            if !(*test_pypi || *pypi || *all) {
                return Err(ParseError::MissingArgument {
                    what: "--test-pypi、--pypi 或 --all".to_string(),
                });
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_command() {
        let error = parse(&raw(&["frobnicate"])).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnknownCommand {
                token: "frobnicate".to_string()
            }
        );
    }

    #[test]
    fn test_command_names_are_case_sensitive() {
        let error = parse(&raw(&["Install", "requests"])).unwrap_err();
        assert!(matches!(error, ParseError::UnknownCommand { .. }));
    }

    #[test]
    fn test_decode_escaped_replaces_placeholders() {
        assert_eq!(decode_escaped("*-e!."), "-e .");
        assert_eq!(decode_escaped("*a!b!c"), "a b c");
        assert_eq!(decode_escaped("*"), "");
    }

    #[test]
    fn test_install_with_escaped_token() {
        let parsed = parse(&raw(&["install", "*-e!.", "requests"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Install {
                packages: vec!["requests".to_string()],
                python: None,
                requirements: None,
            }
        );
        assert_eq!(parsed.passthrough, vec!["-e .".to_string()]);
    }

    #[test]
    fn test_install_without_arguments_is_missing_argument() {
        let error = parse(&raw(&["install"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_install_passthrough_only_is_valid() {
        let parsed = parse(&raw(&["install", "*-e!."])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Install {
                packages: Vec::new(),
                python: None,
                requirements: None,
            }
        );
        assert_eq!(parsed.passthrough, vec!["-e .".to_string()]);
    }

    #[test]
    fn test_install_python_selector_takes_value() {
        let parsed = parse(&raw(&["install", "requests", "-py", "3.12"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Install {
                packages: vec!["requests".to_string()],
                python: Some("3.12".to_string()),
                requirements: None,
            }
        );
    }

    #[test]
    fn test_install_requirements_reference() {
        let parsed = parse(&raw(&["install", "-r", "requirements.txt"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Install {
                packages: Vec::new(),
                python: None,
                requirements: Some("requirements.txt".to_string()),
            }
        );
    }

    #[test]
    fn test_python_selector_without_value_is_missing_argument() {
        let error = parse(&raw(&["install", "requests", "-py"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_unknown_option_reports_token() {
        let error = parse(&raw(&["install", "requests", "--frobnicate"])).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnknownOption {
                token: "--frobnicate".to_string()
            }
        );
    }

    #[test]
    fn test_escaped_token_never_matches_options() {
        // 转义后的 --all 是透传参数，不是 update 的结构化标志
        let parsed = parse(&raw(&["update", "requests", "*--all"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Update {
                packages: vec!["requests".to_string()],
                python: None,
                all: false,
            }
        );
        assert_eq!(parsed.passthrough, vec!["--all".to_string()]);
    }

    #[test]
    fn test_update_requires_packages_or_all() {
        let error = parse(&raw(&["update"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));

        let parsed = parse(&raw(&["update", "--all"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Update {
                packages: Vec::new(),
                python: None,
                all: true,
            }
        );
    }

    #[test]
    fn test_list_all_equals_every_scope_flag() {
        let all = parse(&raw(&["list", "--all"])).unwrap();
        let every = parse(&raw(&[
            "list",
            "-py",
            "--internal",
            "--external",
            "--outdated",
            "--all",
        ]))
        .unwrap();
        assert_eq!(all.command, every.command);
    }

    #[test]
    fn test_list_flags_are_combinable() {
        let parsed = parse(&raw(&["list", "--internal", "--outdated"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::List {
                python: false,
                internal: true,
                external: false,
                outdated: true,
                all: false,
            }
        );
    }

    #[test]
    fn test_list_without_scope_is_missing_argument() {
        let error = parse(&raw(&["list"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_venv_unknown_subcommand() {
        let error = parse(&raw(&["venv", "explode"])).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnknownCommand {
                token: "explode".to_string()
            }
        );
    }

    #[test]
    fn test_venv_without_subcommand() {
        let error = parse(&raw(&["venv"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_venv_create_with_path() {
        let parsed = parse(&raw(&["venv", "create", "-p", "env", "-py", "3.12"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Venv(VenvCommands::Create {
                path: Some(PathBuf::from("env")),
                python: Some("3.12".to_string()),
            })
        );
    }

    #[test]
    fn test_venv_create_path_without_value() {
        let error = parse(&raw(&["venv", "create", "-p"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_escaped_token_is_not_an_option_value() {
        let error = parse(&raw(&["venv", "create", "-p", "*env"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_venv_remove_whole_environment() {
        let parsed = parse(&raw(&["venv", "remove", "--venv"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Venv(VenvCommands::Remove {
                packages: Vec::new(),
                venv: true,
                yes: false,
                path: None,
            })
        );
    }

    #[test]
    fn test_venv_remove_packages() {
        let parsed = parse(&raw(&["venv", "remove", "requests", "urllib3"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Venv(VenvCommands::Remove {
                packages: vec!["requests".to_string(), "urllib3".to_string()],
                venv: false,
                yes: false,
                path: None,
            })
        );
    }

    #[test]
    fn test_venv_remove_without_target_is_missing_argument() {
        let error = parse(&raw(&["venv", "remove"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_venv_list_all_expands_scopes() {
        let all = parse(&raw(&["venv", "list", "--all"])).unwrap();
        assert_eq!(
            all.command,
            Commands::Venv(VenvCommands::List {
                packages: true,
                deps: true,
                outdated: true,
                all: true,
                path: None,
            })
        );
    }

    #[test]
    fn test_build_defaults_to_both_artifacts() {
        let parsed = parse(&raw(&["build"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Build {
                sdist: false,
                wheel: false,
            }
        );

        let sdist_only = parse(&raw(&["build", "--sdist"])).unwrap();
        assert_eq!(
            sdist_only.command,
            Commands::Build {
                sdist: true,
                wheel: false,
            }
        );
    }

    #[test]
    fn test_publish_all_implies_both_targets() {
        let parsed = parse(&raw(&["publish", "--all"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Publish {
                test_pypi: true,
                pypi: true,
                all: true,
            }
        );
    }

    #[test]
    fn test_publish_without_target_is_missing_argument() {
        let error = parse(&raw(&["publish"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_project_create_requires_path() {
        let error = parse(&raw(&["create"])).unwrap_err();
        assert!(matches!(error, ParseError::MissingArgument { .. }));

        let parsed = parse(&raw(&["create", "demo"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::ProjectCreate {
                path: PathBuf::from("demo"),
            }
        );
    }

    #[test]
    fn test_project_delete_with_confirmation_flag() {
        let parsed = parse(&raw(&["delete", "demo", "--yes"])).unwrap();
        assert_eq!(
            parsed.command,
            Commands::ProjectDelete {
                path: PathBuf::from("demo"),
                yes: true,
            }
        );
    }

    #[test]
    fn test_passthrough_preserves_relative_order() {
        let parsed = parse(&raw(&["install", "*--first", "requests", "*--second!x"])).unwrap();
        assert_eq!(
            parsed.passthrough,
            vec!["--first".to_string(), "--second x".to_string()]
        );
    }

    #[test]
    fn test_check_accepts_no_options() {
        let parsed = parse(&raw(&["check"])).unwrap();
        assert_eq!(parsed.command, Commands::Check);

        let error = parse(&raw(&["check", "--verbose"])).unwrap_err();
        assert!(matches!(error, ParseError::UnknownOption { .. }));
    }
}
