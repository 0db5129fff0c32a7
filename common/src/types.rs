//! ドメイン型定義
//!
//! ワークフローの各ステージで受け渡される型:
//! - UploadCandidate: 送信待ちの画像
//! - ClassificationResult / ProductRecord: 分類結果と参照製品
//! - CustomizationOptions: 造形パラメータ
//! - DownloadArtifact: 生成済みファイル

use crate::error::{Error, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 結果の出所（リモート応答かフォールバック合成か）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Remote,
    Fallback,
}

impl Provenance {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Provenance::Fallback)
    }
}

/// 受け付ける画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageMime {
    /// 拡張子から判定（大文字小文字は区別しない）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageMime::Png),
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "gif" => Some(ImageMime::Gif),
            "bmp" => Some(ImageMime::Bmp),
            _ => None,
        }
    }

    /// MIME文字列から判定
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageMime::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageMime::Jpeg),
            "image/gif" => Some(ImageMime::Gif),
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => Some(ImageMime::Bmp),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Gif => "image/gif",
            ImageMime::Bmp => "image/bmp",
        }
    }
}

/// 送信待ちの画像
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    file_name: String,
    mime: ImageMime,
    bytes: Arc<[u8]>,
    /// プレビュー用Data URI（非同期デコード完了後に設定）
    preview: Option<String>,
}

impl UploadCandidate {
    pub(crate) fn new(file_name: String, mime: ImageMime, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            mime,
            bytes: bytes.into(),
            preview: None,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// プレビューを設定した新しい値を返す
    pub fn with_preview(&self, data_uri: String) -> Self {
        Self {
            preview: Some(data_uri),
            ..self.clone()
        }
    }
}

/// コンセント規格コード（例: NEMA_5-15R）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutletType(String);

impl OutletType {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 対応カタログに載っているコードか
    pub fn is_known(&self) -> bool {
        crate::catalog::describe(&self.0).is_some()
    }
}

impl fmt::Display for OutletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 分類の信頼度。常に [0,1] に収まる
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, Error> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::Schema(format!("confidence {} is outside [0, 1]", value)))
        }
    }

    /// 範囲内が分かっている定数用
    pub(crate) const fn trusted(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// 表示用パーセント（四捨五入）
    pub fn percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl TryFrom<f64> for Confidence {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Confidence::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// 分類結果に紐づく参照製品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub description: String,
    pub voltage: String,
    pub current_rating: String,
    pub natural_image_url: String,
    pub product_image_url: String,
}

/// 1枚の画像の分類結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub outlet_type: OutletType,
    pub confidence: Confidence,
    pub product: ProductRecord,
    #[serde(default)]
    pub source: Provenance,
}

/// 色（対応パレット）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    White,
    Black,
    Gray,
    Beige,
    Ivory,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Black,
        Color::Gray,
        Color::Beige,
        Color::Ivory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
            Color::Gray => "gray",
            Color::Beige => "beige",
            Color::Ivory => "ivory",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Color::White => "#FFFFFF",
            Color::Black => "#000000",
            Color::Gray => "#808080",
            Color::Beige => "#F5F5DC",
            Color::Ivory => "#FFFFF0",
        }
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Color::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted || (wanted == "grey" && *c == Color::Gray))
            .ok_or_else(|| ValidationError::UnknownColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 口数の並び方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Single,
    Horizontal,
    Grid,
}

/// 配置パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangementLayout {
    pub count: u8,
    pub spacing_mm: f64,
    pub kind: LayoutKind,
}

/// 口数（1〜4口）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    #[default]
    Single,
    Double,
    Triple,
    Quad,
}

impl Arrangement {
    pub const ALL: [Arrangement; 4] = [
        Arrangement::Single,
        Arrangement::Double,
        Arrangement::Triple,
        Arrangement::Quad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arrangement::Single => "single",
            Arrangement::Double => "double",
            Arrangement::Triple => "triple",
            Arrangement::Quad => "quad",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Arrangement::Single => "Single Outlet",
            Arrangement::Double => "Double Outlet",
            Arrangement::Triple => "Triple Outlet",
            Arrangement::Quad => "Quad Outlet",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Arrangement::Single => "One outlet",
            Arrangement::Double => "Two outlets side by side",
            Arrangement::Triple => "Three outlets in a row",
            Arrangement::Quad => "Four outlets in a grid",
        }
    }

    pub fn layout(&self) -> ArrangementLayout {
        match self {
            Arrangement::Single => ArrangementLayout {
                count: 1,
                spacing_mm: 0.0,
                kind: LayoutKind::Single,
            },
            Arrangement::Double => ArrangementLayout {
                count: 2,
                spacing_mm: 80.0,
                kind: LayoutKind::Horizontal,
            },
            Arrangement::Triple => ArrangementLayout {
                count: 3,
                spacing_mm: 60.0,
                kind: LayoutKind::Horizontal,
            },
            Arrangement::Quad => ArrangementLayout {
                count: 4,
                spacing_mm: 50.0,
                kind: LayoutKind::Grid,
            },
        }
    }
}

impl FromStr for Arrangement {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Arrangement::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownArrangement(s.to_string()))
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検証済みの造形パラメータ
///
/// `customize::collect` でのみ生成される。生成後は変更不可。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomizationOptions {
    outlet_type: OutletType,
    color: Color,
    arrangement: Arrangement,
    wall_thickness_mm: f64,
    depth_mm: f64,
    notes: String,
}

impl CustomizationOptions {
    pub(crate) fn new(
        outlet_type: OutletType,
        color: Color,
        arrangement: Arrangement,
        wall_thickness_mm: f64,
        depth_mm: f64,
        notes: String,
    ) -> Self {
        Self { outlet_type, color, arrangement, wall_thickness_mm, depth_mm, notes }
    }

    pub fn outlet_type(&self) -> &OutletType {
        &self.outlet_type
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    pub fn wall_thickness_mm(&self) -> f64 {
        self.wall_thickness_mm
    }

    pub fn depth_mm(&self) -> f64 {
        self.depth_mm
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// 生成前に表示するサマリー
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Outlet Type", self.outlet_type.to_string()),
            ("Color", self.color.to_string()),
            ("Arrangement", self.arrangement.to_string()),
            ("Specifications", format!("{}mm / {}mm", self.wall_thickness_mm, self.depth_mm)),
        ]
    }
}

/// 生成ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Stl,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Stl => "stl",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactFormat::Stl => "STL (Stereolithography)",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Stl => "text/plain",
        }
    }
}

/// 生成済みのダウンロード対象
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub content: Vec<u8>,
    pub format: ArtifactFormat,
    pub source: Provenance,
}
