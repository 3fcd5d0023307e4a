//! 配置模块
//!
//! 提供TOML配置文件解析、环境变量替换和验证功能

use crate::error::{ConfigError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_ENV_VAR: &str = "UVKIT_CONFIG";

/// 工具配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    /// uv 可执行文件（默认按平台使用 uv / uv.exe，可配置绝对路径）
    #[serde(default = "default_uv_path")]
    pub uv_path: String,
    /// 默认 Python 版本选择器（如 "3.12"）
    pub default_python: Option<String>,
    /// 默认虚拟环境目录
    #[serde(default = "default_venv_dir")]
    pub venv_dir: String,
    /// 安装软件包时是否编译字节码
    #[serde(default = "default_compile_bytecode")]
    pub compile_bytecode: bool,
}

// 默认值函数
fn default_uv_path() -> String {
    if cfg!(windows) {
        "uv.exe".to_string()
    } else {
        "uv".to_string()
    }
}
fn default_venv_dir() -> String {
    ".venv".to_string()
}
fn default_compile_bytecode() -> bool {
    true
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            uv_path: default_uv_path(),
            default_python: None,
            venv_dir: default_venv_dir(),
            compile_bytecode: default_compile_bytecode(),
        }
    }
}

impl ToolConfig {
    /// 加载配置
    ///
    /// 查找顺序：UVKIT_CONFIG 环境变量指定的路径、默认配置目录。
    /// 配置文件不存在时使用默认配置。
    pub async fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            return Self::load_from_file(&path).await;
        }

        match get_default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path).await,
            _ => Ok(Self::default()),
        }
    }

    /// 从文件加载配置
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ConfigError::ParseError(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;
        Self::load_from_str(&content)
    }

    /// 从字符串加载配置
    pub fn load_from_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        let config: ToolConfig = toml::from_str(&processed)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.uv_path.trim().is_empty() {
            return Err(ConfigError::ValidationError("uv_path 不能为空".to_string()).into());
        }
        if self.venv_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError("venv_dir 不能为空".to_string()).into());
        }
        if let Some(ref version) = self.default_python {
            if !is_version_selector(version) {
                return Err(ConfigError::ValidationError(format!(
                    "default_python 不是合法的版本选择器: {version}"
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// 判断字符串是否为 Python 版本选择器（如 3、3.12、3.12.1）
pub fn is_version_selector(value: &str) -> bool {
    // 与版本选择器匹配的模式固定，编译失败属于程序缺陷
    let pattern = Regex::new(r"^\d+(\.\d+){0,2}[a-z]?$").expect("版本选择器正则无效");
    pattern.is_match(value)
}

/// 替换字符串中 ${VAR_NAME} 格式的环境变量
fn substitute_env_vars(content: &str) -> Result<String> {
    let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)))?;

    let mut result = content.to_string();

    for captures in env_var_regex.captures_iter(content) {
        let full_match = &captures[0];
        let var_name = &captures[1];

        match std::env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                return Err(ConfigError::ParseError(format!(
                    "环境变量未定义: {var_name}"
                ))
                .into());
            }
        }
    }

    Ok(result)
}

/// 获取默认配置文件路径
pub fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ToolConfig::load_from_str("").unwrap();
        assert_eq!(config.venv_dir, ".venv");
        assert!(config.compile_bytecode);
        assert!(config.default_python.is_none());
        if cfg!(windows) {
            assert_eq!(config.uv_path, "uv.exe");
        } else {
            assert_eq!(config.uv_path, "uv");
        }
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
uv_path = "/usr/local/bin/uv"
default_python = "3.12"
venv_dir = "env"
compile_bytecode = false
"#;
        let config = ToolConfig::load_from_str(content).unwrap();
        assert_eq!(config.uv_path, "/usr/local/bin/uv");
        assert_eq!(config.default_python.as_deref(), Some("3.12"));
        assert_eq!(config.venv_dir, "env");
        assert!(!config.compile_bytecode);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = ToolConfig::load_from_str("uv_path = [");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_python_selector_fails_validation() {
        let result = ToolConfig::load_from_str("default_python = \"python3\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_venv_dir_fails_validation() {
        let result = ToolConfig::load_from_str("venv_dir = \"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_version_selector_patterns() {
        assert!(is_version_selector("3"));
        assert!(is_version_selector("3.12"));
        assert!(is_version_selector("3.12.1"));
        assert!(is_version_selector("3.13.0a"));
        assert!(!is_version_selector("python3"));
        assert!(!is_version_selector("3.12-dev"));
        assert!(!is_version_selector(""));
    }
}
