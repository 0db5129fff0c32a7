//! 分類クライアント
//!
//! 画像を分類エンドポイントへ送り、失敗時は一定時間待ってから代替結果を返す。
//! 通信エラーは呼び出し元に返さない。結果の `source` で区別できる。

use crate::api::{Endpoint, CLASSIFY_PATH};
use crate::error::Result;
use async_trait::async_trait;
use outlet_forge_common::{fallback, parse_classify_response, ClassificationResult, UploadCandidate};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// 分類器
///
/// 必ず結果を返す。1セッションにつき同時に1件だけ呼ばれる。
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, candidate: &UploadCandidate) -> ClassificationResult;
}

#[async_trait]
impl<T: Classifier + ?Sized> Classifier for Box<T> {
    async fn classify(&self, candidate: &UploadCandidate) -> ClassificationResult {
        (**self).classify(candidate).await
    }
}

/// HTTP分類クライアント
pub struct HttpClassifier {
    endpoint: Endpoint,
    client: reqwest::Client,
    fallback_delay: Duration,
}

impl HttpClassifier {
    pub fn new(endpoint: Endpoint, fallback_delay: Duration) -> Result<Self> {
        let client = endpoint.client()?;
        Ok(Self {
            endpoint,
            client,
            fallback_delay,
        })
    }

    async fn request(&self, candidate: &UploadCandidate) -> Result<ClassificationResult> {
        let part = Part::bytes(candidate.bytes().to_vec())
            .file_name(candidate.file_name().to_string())
            .mime_str(candidate.mime().as_mime())?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.endpoint.url(CLASSIFY_PATH))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        Ok(parse_classify_response(&body)?)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, candidate: &UploadCandidate) -> ClassificationResult {
        match self.request(candidate).await {
            Ok(result) => {
                tracing::info!(
                    outlet_type = %result.outlet_type,
                    confidence = result.confidence.value(),
                    "classification received"
                );
                result
            }
            Err(e) => {
                tracing::warn!("classification failed, using fallback: {}", e);
                tokio::time::sleep(self.fallback_delay).await;
                fallback::classification()
            }
        }
    }
}

/// 常に代替結果を返す分類器（オフライン用）
pub struct OfflineClassifier {
    delay: Duration,
}

impl OfflineClassifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Classifier for OfflineClassifier {
    async fn classify(&self, _candidate: &UploadCandidate) -> ClassificationResult {
        tokio::time::sleep(self.delay).await;
        fallback::classification()
    }
}
