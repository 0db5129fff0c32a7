//! リモートサービス共通
//!
//! 分類・生成・ヘルスチェックで同じクライアント設定とURL組み立てを使う。

use crate::config::Config;
use crate::error::Result;
use std::time::Duration;

pub const CLASSIFY_PATH: &str = "/api/classify";
pub const GENERATE_PATH: &str = "/api/generate";
pub const HEALTH_PATH: &str = "/api/health";

/// リモート接続の設定
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: String,
    timeout: Option<Duration>,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            ..Self::new(config.api_base_url())
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// パスまたはURLを絶対URLにする
    ///
    /// `http(s)://` で始まるものはそのまま、それ以外はベースURLに連結する。
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// HTTPクライアントを作成
    ///
    /// タイムアウト未指定ならクライアント既定のまま。
    pub fn client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("outlet-forge/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

/// ヘルスチェック結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Reachable(u16),
    Unreachable(String),
}

/// ヘルスエンドポイントに問い合わせる
pub async fn check_health(endpoint: &Endpoint) -> Result<Health> {
    let client = endpoint.client()?;
    let url = endpoint.url(HEALTH_PATH);
    tracing::debug!(%url, "health check");

    let health = match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            Health::Reachable(response.status().as_u16())
        }
        Ok(response) => Health::Unreachable(format!("HTTP {}", response.status())),
        Err(e) => Health::Unreachable(e.to_string()),
    };
    Ok(health)
}
