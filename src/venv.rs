//! 虚拟环境模块
//!
//! 提供虚拟环境目录布局推导，以及"当前激活环境"标记文件的持久化。
//! 激活状态是跨进程的显式状态：每次运行读取一次标记文件，
//! 进程内不保留任何全局可变状态。

use crate::error::{Result, UvkitError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 标记文件目录环境变量（主要用于测试）
pub const STATE_DIR_ENV_VAR: &str = "UVKIT_STATE_DIR";

/// 虚拟环境目录布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvPaths {
    /// 虚拟环境根目录
    pub root: PathBuf,
    /// 可执行文件目录（Unix为bin，Windows为Scripts）
    pub bin_dir: PathBuf,
    /// 环境内的 Python 解释器
    pub python: PathBuf,
}

impl VenvPaths {
    /// 根据根目录推导环境布局
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let bin_dir = root.join(if cfg!(windows) { "Scripts" } else { "bin" });
        let python = bin_dir.join(if cfg!(windows) { "python.exe" } else { "python3" });
        Self {
            root,
            bin_dir,
            python,
        }
    }

    /// 虚拟环境目录是否存在
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// 已激活虚拟环境的标记状态
///
/// 以JSON形式持久化到标记文件，后续的软件包命令据此注入
/// VIRTUAL_ENV 与 PATH 环境变量。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveEnv {
    /// 虚拟环境根目录
    pub venv_path: PathBuf,
    /// 激活时间
    pub activated_at: DateTime<Utc>,
}

impl ActiveEnv {
    /// 创建新的激活状态
    pub fn new(venv_path: impl Into<PathBuf>) -> Self {
        Self {
            venv_path: venv_path.into(),
            activated_at: Utc::now(),
        }
    }

    /// 标记文件路径
    pub fn marker_path() -> PathBuf {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV_VAR) {
            return PathBuf::from(dir).join("active_env.json");
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::APP_NAME)
            .join("active_env.json")
    }

    /// 序列化为标记文件内容
    pub fn to_marker_contents(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 从标记文件加载激活状态
    ///
    /// 文件不存在返回None；内容损坏按错误返回，由调用方决定降级策略。
    pub fn load(marker: &Path) -> Result<Option<Self>> {
        if !marker.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(marker).map_err(|e| UvkitError::Filesystem {
            path: marker.to_path_buf(),
            source: e,
        })?;
        let state: Self = serde_json::from_str(&contents)?;
        Ok(Some(state))
    }

    /// 保存激活状态到标记文件
    pub fn save(&self, marker: &Path) -> Result<()> {
        if let Some(parent) = marker.parent() {
            std::fs::create_dir_all(parent).map_err(|e| UvkitError::Filesystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(marker, self.to_marker_contents()?).map_err(|e| UvkitError::Filesystem {
            path: marker.to_path_buf(),
            source: e,
        })
    }

    /// 删除标记文件，返回删除前是否存在
    pub fn clear(marker: &Path) -> Result<bool> {
        if !marker.exists() {
            return Ok(false);
        }
        std::fs::remove_file(marker).map_err(|e| UvkitError::Filesystem {
            path: marker.to_path_buf(),
            source: e,
        })?;
        Ok(true)
    }
}
