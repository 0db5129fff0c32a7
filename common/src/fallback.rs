//! デモ（フォールバック）モード
//!
//! リモートサービスに到達できない場合でもワークフローを最後まで進めるための
//! 決定的な代替値。値には `Provenance::Fallback` を付ける。

use crate::catalog::{DEFAULT_NATURAL_IMAGE_URL, DEFAULT_PRODUCT_IMAGE_URL};
use crate::schema::sanitize_filename;
use crate::types::{
    ArtifactFormat, ClassificationResult, Confidence, CustomizationOptions, DownloadArtifact,
    OutletType, ProductRecord, Provenance,
};

pub const FALLBACK_OUTLET_TYPE: &str = "NEMA_5-15R";
pub const FALLBACK_CONFIDENCE: f64 = 0.85;
/// 実際の処理時間に似せた待ち時間（ミリ秒）
pub const FALLBACK_DELAY_MS: u64 = 3000;

/// 1面だけの最小STL
pub const PLACEHOLDER_STL: &str = "solid outlet
facet normal 0.0 0.0 1.0
  outer loop
    vertex 0.0 0.0 0.0
    vertex 1.0 0.0 0.0
    vertex 1.0 1.0 0.0
  endloop
endfacet
endsolid outlet";

/// 代替の分類結果
pub fn classification() -> ClassificationResult {
    ClassificationResult {
        outlet_type: OutletType::new(FALLBACK_OUTLET_TYPE),
        confidence: Confidence::trusted(FALLBACK_CONFIDENCE),
        product: ProductRecord {
            name: "NEMA 5-15R Standard Outlet".to_string(),
            description: "Standard US household outlet".to_string(),
            voltage: "120V".to_string(),
            current_rating: "15A".to_string(),
            natural_image_url: DEFAULT_NATURAL_IMAGE_URL.to_string(),
            product_image_url: DEFAULT_PRODUCT_IMAGE_URL.to_string(),
        },
        source: Provenance::Fallback,
    }
}

/// 代替の生成物（形式だけ正しいSTL）
pub fn artifact(options: &CustomizationOptions) -> DownloadArtifact {
    let format = ArtifactFormat::Stl;
    // "CEE_7/4" のような区切りを含むコードも1つの名前に収める
    let code = options.outlet_type().as_str().replace(|c: char| c == '/' || c == '\\', "-");
    let stem = format!(
        "{}_{}_{}",
        code,
        options.arrangement(),
        options.color()
    );

    DownloadArtifact {
        filename: sanitize_filename(&stem, format),
        content: PLACEHOLDER_STL.as_bytes().to_vec(),
        format,
        source: Provenance::Fallback,
    }
}
