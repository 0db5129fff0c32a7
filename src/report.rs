//! 画面表示用テキストの組み立て
//!
//! 分類結果、カスタマイズ内容、保存結果をCLIに出す行に整形する。

use chrono::Local;
use outlet_forge_common::catalog::OUTLET_TYPES;
use outlet_forge_common::ingest;
use outlet_forge_common::{
    ArtifactFormat, CustomizationOptions, DownloadArtifact, Provenance, ResultPresenter,
};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// 3Dプリントのヒント
pub const PRINTING_TIPS: [&str; 5] = [
    "Use PLA or ABS filament for best results",
    "Print at 0.2mm layer height for good detail",
    "Use 20% infill for strength and material efficiency",
    "Print with supports if needed for overhangs",
    "Sand lightly after printing for smooth finish",
];

const DEMO_NOTE: &str = "（デモモード: サービスに接続できなかったため代替値を表示しています）";

/// 分類結果の表示行
pub fn classification_lines(results: &ResultPresenter) -> Vec<String> {
    let (Some(result), Some(band)) = (results.result(), results.band()) else {
        return vec!["分類結果はありません".to_string()];
    };

    let mut lines = vec![
        format!("規格: {}", result.outlet_type),
        format!("信頼度: {}% ({})", result.confidence.percent(), band.label()),
    ];
    if !result.outlet_type.is_known() {
        lines.push("  ※ カタログにない規格です".to_string());
    }

    let product = &result.product;
    lines.push(format!("製品: {}", product.name));
    if !product.description.is_empty() {
        lines.push(format!("  {}", product.description));
    }
    if !product.voltage.is_empty() || !product.current_rating.is_empty() {
        lines.push(format!("  定格: {} / {}", product.voltage, product.current_rating));
    }
    lines.push(format!("  写真: {}", product.natural_image_url));
    lines.push(format!("  製品画像: {}", product.product_image_url));

    if result.source.is_fallback() {
        lines.push(DEMO_NOTE.to_string());
    }
    lines
}

/// 生成前のカスタマイズ確認
pub fn summary_lines(options: &CustomizationOptions) -> Vec<String> {
    let mut lines: Vec<String> = options
        .summary()
        .into_iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect();
    lines.push(format!("Color Code: {}", options.color().hex()));
    let layout = options.arrangement().layout();
    if layout.count > 1 {
        lines.push(format!(
            "Layout: {} ({} units, {}mm spacing)",
            options.arrangement().description(),
            layout.count,
            layout.spacing_mm
        ));
    } else {
        lines.push(format!("Layout: {}", options.arrangement().description()));
    }
    if !options.notes().is_empty() {
        lines.push(format!("Notes: {}", options.notes()));
    }
    lines
}

/// 対応規格一覧の表示行
pub fn outlet_type_lines() -> Vec<String> {
    OUTLET_TYPES
        .iter()
        .map(|e| {
            format!(
                "{:<12} {:<6} {} ({} / {})",
                e.code, e.region, e.description, e.voltage, e.current_rating
            )
        })
        .collect()
}

/// 取り込んだ画像のプレビュー情報
pub fn preview_line(preview: &str) -> String {
    let mime = ingest::extract_mime_from_data_uri(preview).unwrap_or("不明な形式");
    format!("プレビュー: {} ({})", mime, format_size(preview.len()))
}

/// 保存結果
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub filename: String,
    pub format: ArtifactFormat,
    pub size: usize,
    pub sha256: String,
    pub generated_at: String,
    pub source: Provenance,
}

impl DownloadReport {
    pub fn new(artifact: &DownloadArtifact, path: &Path) -> Self {
        let digest = Sha256::digest(&artifact.content);
        Self {
            path: path.to_path_buf(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| artifact.filename.clone()),
            format: artifact.format,
            size: artifact.content.len(),
            sha256: hex::encode(digest),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: artifact.source,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("ファイル名: {}", self.filename),
            format!("形式: {}", self.format.label()),
            format!("MIMEタイプ: {}", self.format.content_type()),
            format!("サイズ: {}", format_size(self.size)),
            format!("SHA-256: {}", self.sha256),
            format!("生成日時: {}", self.generated_at),
            format!("保存先: {}", self.path.display()),
        ];
        if self.source.is_fallback() {
            lines.push(DEMO_NOTE.to_string());
        }
        lines
    }
}

/// ヒントの番号付き表示行
pub fn tip_lines() -> Vec<String> {
    PRINTING_TIPS
        .iter()
        .enumerate()
        .map(|(i, tip)| format!("{}. {}", i + 1, tip))
        .collect()
}

pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
