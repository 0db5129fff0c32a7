use crate::error::{OutletForgeError, Result};
use outlet_forge_common::fallback::FALLBACK_DELAY_MS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// APIベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "OUTLET_FORGE_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// フォールバック結果を返すまでの待ち時間
    pub fallback_delay_ms: u64,
    /// 0 ならクライアント既定（明示的なタイムアウトなし）
    pub timeout_seconds: u64,
    /// 生成物の保存先（未設定ならカレント）
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| OutletForgeError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("outlet-forge").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            fallback_delay_ms: FALLBACK_DELAY_MS,
            timeout_seconds: 0,
            download_dir: None,
        }
    }

    /// 実際に使うAPIベースURL
    pub fn api_base_url(&self) -> String {
        // 環境変数を優先
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url.trim().trim_end_matches('/').to_string();
            }
        }

        self.api_base_url.trim().trim_end_matches('/').to_string()
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(OutletForgeError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.api_base_url = url;
        self.save()
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.fallback_delay(), Duration::from_millis(3000));
        assert!(config.timeout().is_none());
        assert_eq!(config.download_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"timeout_seconds": 30}"#).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.fallback_delay_ms, 3000);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
