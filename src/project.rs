//! 项目脚手架模块
//!
//! 使用内嵌模板生成标准项目骨架。项目创建与删除是纯文件系统
//! 操作，不经过外部包管理器，也不访问网络。

use crate::error::{Result, UvkitError};
use crate::invoke::FsOp;
use handlebars::Handlebars;
use serde_json::json;
use std::path::Path;

/// pyproject.toml 模板
const PYPROJECT_TEMPLATE: &str = include_str!("../templates/pyproject.toml.hbs");
/// README 模板
const README_TEMPLATE: &str = include_str!("../templates/README.md.hbs");
/// 入口脚本模板
const MAIN_PY_TEMPLATE: &str = include_str!("../templates/main.py.hbs");

/// 未指定默认 Python 时骨架声明的最低版本
const FALLBACK_REQUIRES_PYTHON: &str = "3.9";

/// 生成项目创建计划
///
/// # 参数
/// * `project_dir` - 目标目录，目录名即项目名
/// * `default_python` - 骨架 requires-python 使用的版本选择器
pub fn create_plan(project_dir: &Path, default_python: Option<&str>) -> Result<Vec<FsOp>> {
    let name = project_name(project_dir);
    let data = json!({
        "name": name,
        "requires_python": default_python.unwrap_or(FALLBACK_REQUIRES_PYTHON),
    });

    let mut handlebars = Handlebars::new();
    // 生成的是TOML/Markdown/Python而不是HTML，关闭HTML转义
    handlebars.register_escape_fn(handlebars::no_escape);

    let render = |template: &str| -> Result<String> {
        handlebars
            .render_template(template, &data)
            .map_err(|e| UvkitError::Template(e.to_string()))
    };

    Ok(vec![
        FsOp::CreateDir(project_dir.to_path_buf()),
        FsOp::WriteFile {
            path: project_dir.join("pyproject.toml"),
            contents: render(PYPROJECT_TEMPLATE)?,
        },
        FsOp::WriteFile {
            path: project_dir.join("README.md"),
            contents: render(README_TEMPLATE)?,
        },
        FsOp::WriteFile {
            path: project_dir.join("main.py"),
            contents: render(MAIN_PY_TEMPLATE)?,
        },
    ])
}

/// 生成项目删除计划
pub fn delete_plan(project_dir: &Path) -> Vec<FsOp> {
    vec![FsOp::RemoveDirAll(project_dir.to_path_buf())]
}

/// 从目标目录推导项目名
fn project_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("project")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_create_plan_renders_project_name() {
        let plan = create_plan(Path::new("/work/demo-app"), Some("3.12")).unwrap();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0], FsOp::CreateDir(PathBuf::from("/work/demo-app")));

        match &plan[1] {
            FsOp::WriteFile { path, contents } => {
                assert_eq!(path, &PathBuf::from("/work/demo-app/pyproject.toml"));
                assert!(contents.contains("name = \"demo-app\""));
                assert!(contents.contains("requires-python = \">=3.12\""));
            }
            other => panic!("意外的操作: {other:?}"),
        }

        match &plan[3] {
            FsOp::WriteFile { path, contents } => {
                assert_eq!(path, &PathBuf::from("/work/demo-app/main.py"));
                assert!(contents.contains("Hello from demo-app!"));
            }
            other => panic!("意外的操作: {other:?}"),
        }
    }

    #[test]
    fn test_create_plan_fallback_python() {
        let plan = create_plan(Path::new("demo"), None).unwrap();
        match &plan[1] {
            FsOp::WriteFile { contents, .. } => {
                assert!(contents.contains(">=3.9"));
            }
            other => panic!("意外的操作: {other:?}"),
        }
    }

    #[test]
    fn test_delete_plan() {
        let plan = delete_plan(Path::new("/work/demo"));
        assert_eq!(plan, vec![FsOp::RemoveDirAll(PathBuf::from("/work/demo"))]);
    }
}
