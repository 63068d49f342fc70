//! 应用配置和持久化
//!
//! 提供目录地址、数据目录等设置的存储和读取。

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认的法术目录接口
pub const DEFAULT_CATALOG_URL: &str = "https://www.dnd5eapi.co/api/spells";

/// 收藏夹在存储中的键
pub const DEFAULT_FAVORITES_KEY: &str = "favorites";

/// 应用设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 法术目录接口地址
    pub catalog_url: String,
    /// 本地数据目录（收藏夹保存在这里）
    pub data_dir: PathBuf,
    /// 收藏夹的存储键
    pub favorites_key: String,
    /// 目录请求超时（秒），不设置则不超时
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// 日志面板初始级别 (error, warn, info, debug, trace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("spellbook"),
            favorites_key: DEFAULT_FAVORITES_KEY.to_string(),
            request_timeout_secs: None,
            log_level: None,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// 获取配置文件路径
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spellbook");
        config_dir.join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// 从指定路径加载设置，缺失或损坏时使用默认值
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(settings.favorites_key, "favorites");
        assert!(settings.request_timeout_secs.is_none());
        assert!(settings.log_level.is_none());
        assert!(settings.data_dir.ends_with("spellbook"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spellbook/settings.toml");

        let settings = AppSettings {
            catalog_url: "http://localhost:3000/api/spells".to_string(),
            request_timeout_secs: Some(10),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "verbose = true\n").unwrap();

        let settings = AppSettings::load_from(&path);
        assert!(settings.verbose);
        assert_eq!(settings.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "verbose = [").unwrap();

        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }
}
