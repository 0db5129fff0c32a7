//! 生成クライアント
//!
//! カスタマイズ内容を生成エンドポイントへ送り、ダウンロード可能な生成物を受け取る。
//! 失敗時は形式だけ正しい代替STLを返す。

use crate::api::{Endpoint, GENERATE_PATH};
use crate::error::Result;
use async_trait::async_trait;
use outlet_forge_common::{
    fallback, parse_generate_response, ArtifactBody, CustomizationOptions, DownloadArtifact, Error,
    GenerateRequest, Provenance,
};

/// 生成器
///
/// 必ず生成物を返す。
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, options: &CustomizationOptions) -> DownloadArtifact;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Box<T> {
    async fn generate(&self, options: &CustomizationOptions) -> DownloadArtifact {
        (**self).generate(options).await
    }
}

/// HTTP生成クライアント
pub struct HttpGenerator {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl HttpGenerator {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let client = endpoint.client()?;
        Ok(Self { endpoint, client })
    }

    async fn request(&self, options: &CustomizationOptions) -> Result<DownloadArtifact> {
        let response = self
            .client
            .post(self.endpoint.url(GENERATE_PATH))
            .json(&GenerateRequest::from(options))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let descriptor = parse_generate_response(&body)?;

        let content = match descriptor.body {
            ArtifactBody::Bytes(bytes) => bytes,
            ArtifactBody::Reference(url) => self.fetch(&url).await?,
        };

        Ok(DownloadArtifact {
            filename: descriptor.filename,
            content,
            format: descriptor.format,
            source: Provenance::Remote,
        })
    }

    /// 参照URLから中身を取得
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.endpoint.url(url);
        tracing::debug!(%url, "fetching artifact");

        let bytes = self.client.get(&url).send().await?.error_for_status()?.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::Schema(format!("artifact at {} is empty", url)).into());
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, options: &CustomizationOptions) -> DownloadArtifact {
        match self.request(options).await {
            Ok(artifact) => {
                tracing::info!(
                    filename = %artifact.filename,
                    size = artifact.content.len(),
                    "artifact received"
                );
                artifact
            }
            Err(e) => {
                tracing::warn!("generation failed, using placeholder: {}", e);
                fallback::artifact(options)
            }
        }
    }
}

/// 常に代替STLを返す生成器（オフライン用）
pub struct OfflineGenerator;

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate(&self, options: &CustomizationOptions) -> DownloadArtifact {
        fallback::artifact(options)
    }
}
