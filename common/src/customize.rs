//! カスタマイズ値の収集と検証
//!
//! 画面の選択値（文字列・数値）を検証済みの `CustomizationOptions` に変換する。
//! 範囲外の値は丸めずに拒否する。

use crate::error::ValidationError;
use crate::types::{Arrangement, ClassificationResult, Color, CustomizationOptions};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// 壁厚の許容範囲（mm）
pub const WALL_THICKNESS_RANGE_MM: RangeInclusive<f64> = 1.0..=5.0;
/// 奥行きの許容範囲（mm）
pub const DEPTH_RANGE_MM: RangeInclusive<f64> = 10.0..=50.0;

pub const DEFAULT_WALL_THICKNESS_MM: f64 = 2.0;
pub const DEFAULT_DEPTH_MM: f64 = 20.0;

/// 未検証の選択値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selections {
    pub color: String,
    pub arrangement: String,
    pub wall_thickness: f64,
    pub depth: f64,
    pub notes: String,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            color: Color::default().to_string(),
            arrangement: Arrangement::default().to_string(),
            wall_thickness: DEFAULT_WALL_THICKNESS_MM,
            depth: DEFAULT_DEPTH_MM,
            notes: String::new(),
        }
    }
}

/// 選択値を検証し、分類結果の規格コードを付けた新しいレコードを作る
pub fn collect(
    selections: &Selections,
    classification: &ClassificationResult,
) -> Result<CustomizationOptions, ValidationError> {
    let color: Color = selections.color.parse()?;
    let arrangement: Arrangement = selections.arrangement.parse()?;

    // NaNはcontainsがfalseになるので同時に弾かれる
    if !WALL_THICKNESS_RANGE_MM.contains(&selections.wall_thickness) {
        return Err(ValidationError::WallThicknessOutOfRange(selections.wall_thickness));
    }
    if !DEPTH_RANGE_MM.contains(&selections.depth) {
        return Err(ValidationError::DepthOutOfRange(selections.depth));
    }

    Ok(CustomizationOptions::new(
        classification.outlet_type.clone(),
        color,
        arrangement,
        selections.wall_thickness,
        selections.depth,
        selections.notes.trim().to_string(),
    ))
}
