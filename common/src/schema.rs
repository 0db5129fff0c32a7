//! リモートAPIのリクエスト/レスポンス定義
//!
//! 分類・生成エンドポイントのペイロードを明示的な型で受け、
//! 境界で一度だけ検証する。以降のコードは検証済みの型だけを扱う。

use crate::catalog;
use crate::error::{Error, Result};
use crate::types::{
    Arrangement, ArtifactFormat, ClassificationResult, Color, Confidence, CustomizationOptions,
    OutletType, ProductRecord, Provenance,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ファイル名が得られない場合の既定名
pub const DEFAULT_ARTIFACT_NAME: &str = "outlet_model.stl";

// =============================================
// 分類エンドポイント
// =============================================

/// 分類APIレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    pub classification: ClassificationPayload,
    /// 製品が見つからない場合は null
    #[serde(default)]
    pub product: Option<ProductPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationPayload {
    pub outlet_type: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub voltage: String,
    #[serde(default)]
    pub current_rating: String,
    #[serde(default)]
    pub natural_image_url: Option<String>,
    #[serde(default)]
    pub product_image_url: Option<String>,
}

impl ClassifyResponse {
    /// 検証して `ClassificationResult` に変換
    pub fn into_result(self) -> Result<ClassificationResult> {
        let code = self.classification.outlet_type.trim();
        if code.is_empty() {
            return Err(Error::Schema("outlet_type is empty".into()));
        }
        let outlet_type = OutletType::new(code);
        let confidence = Confidence::new(self.classification.confidence)?;

        let product = match self.product {
            Some(p) => {
                let reference = catalog::reference_product(&outlet_type);
                ProductRecord {
                    name: p.name,
                    description: p.description,
                    voltage: p.voltage,
                    current_rating: p.current_rating,
                    natural_image_url: non_empty(p.natural_image_url)
                        .unwrap_or(reference.natural_image_url),
                    product_image_url: non_empty(p.product_image_url)
                        .unwrap_or(reference.product_image_url),
                }
            }
            None => catalog::reference_product(&outlet_type),
        };

        Ok(ClassificationResult {
            outlet_type,
            confidence,
            product,
            source: Provenance::Remote,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 分類APIのレスポンス本文をパース
pub fn parse_classify_response(body: &str) -> Result<ClassificationResult> {
    let response: ClassifyResponse = serde_json::from_str(body)?;
    response.into_result()
}

// =============================================
// 生成エンドポイント
// =============================================

/// 生成APIリクエスト
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub outlet_type: &'a str,
    pub color: Color,
    pub arrangement: Arrangement,
    pub custom_options: CustomOptions<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomOptions<'a> {
    pub wall_thickness: f64,
    pub depth: f64,
    pub notes: &'a str,
}

impl<'a> From<&'a CustomizationOptions> for GenerateRequest<'a> {
    fn from(options: &'a CustomizationOptions) -> Self {
        Self {
            outlet_type: options.outlet_type().as_str(),
            color: options.color(),
            arrangement: options.arrangement(),
            custom_options: CustomOptions {
                wall_thickness: options.wall_thickness_mm(),
                depth: options.depth_mm(),
                notes: options.notes(),
            },
        }
    }
}

/// 生成APIレスポンス
///
/// 中身をそのまま返す形式と、取得先URLだけを返す形式がある。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    Inline {
        #[serde(default)]
        filename: String,
        content: String,
    },
    Encoded {
        #[serde(default)]
        filename: String,
        content_base64: String,
    },
    Reference {
        #[serde(default)]
        filename: String,
        download_url: String,
    },
}

/// 生成結果の中身
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactBody {
    Bytes(Vec<u8>),
    /// 取得が必要なURL（相対URLの場合はAPIベースURLからの相対）
    Reference(String),
}

/// 検証済みの生成結果記述子
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDescriptor {
    pub filename: String,
    pub format: ArtifactFormat,
    pub body: ArtifactBody,
}

impl GenerateResponse {
    pub fn into_descriptor(self) -> Result<ArtifactDescriptor> {
        let (filename, body) = match self {
            GenerateResponse::Inline { filename, content } => {
                (filename, ArtifactBody::Bytes(content.into_bytes()))
            }
            GenerateResponse::Encoded { filename, content_base64 } => {
                let bytes = STANDARD
                    .decode(content_base64.trim())
                    .map_err(|e| Error::Schema(format!("content_base64: {}", e)))?;
                (filename, ArtifactBody::Bytes(bytes))
            }
            GenerateResponse::Reference { filename, download_url } => {
                if download_url.trim().is_empty() {
                    return Err(Error::Schema("download_url is empty".into()));
                }
                (filename, ArtifactBody::Reference(download_url.trim().to_string()))
            }
        };

        if let ArtifactBody::Bytes(bytes) = &body {
            if bytes.is_empty() {
                return Err(Error::Schema("artifact content is empty".into()));
            }
        }

        let format = ArtifactFormat::Stl;
        Ok(ArtifactDescriptor {
            filename: sanitize_filename(&filename, format),
            format,
            body,
        })
    }
}

/// 生成APIのレスポンス本文をパース
pub fn parse_generate_response(body: &str) -> Result<ArtifactDescriptor> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    response.into_descriptor()
}

/// リモートから受け取ったファイル名を保存可能な単一のファイル名にする
///
/// - パス区切りより前は捨てる
/// - `[A-Za-z0-9._-]` 以外は `_` に置換
/// - 拡張子は形式に合わせて強制
pub fn sanitize_filename(raw: &str, format: ArtifactFormat) -> String {
    lazy_static::lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
    }

    let last = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned = UNSAFE_RE.replace_all(last.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return DEFAULT_ARTIFACT_NAME.to_string();
    }

    let ext = format.extension();
    let has_ext = cleaned
        .rsplit_once('.')
        .map(|(stem, e)| !stem.is_empty() && e.eq_ignore_ascii_case(ext))
        .unwrap_or(false);

    if has_ext {
        cleaned.to_string()
    } else {
        format!("{}.{}", cleaned, ext)
    }
}
