//! 対話式カスタマイズ入力

use crate::error::{OutletForgeError, Result};
use dialoguer::{Confirm, Input, Select};
use outlet_forge_common::customize::{DEPTH_RANGE_MM, WALL_THICKNESS_RANGE_MM};
use outlet_forge_common::{Arrangement, Color, Selections};
use std::ops::RangeInclusive;

/// 対話でカスタマイズ内容を選ぶ（初期値は `defaults`）
pub fn ask_selections(defaults: &Selections) -> Result<Selections> {
    let color_items: Vec<String> = Color::ALL
        .iter()
        .map(|c| format!("{} ({})", c, c.hex()))
        .collect();
    let color_default = Color::ALL
        .iter()
        .position(|c| c.as_str() == defaults.color)
        .unwrap_or(0);
    let color = Select::new()
        .with_prompt("色")
        .items(&color_items)
        .default(color_default)
        .interact()
        .map_err(dialog_error)?;

    let arrangement_items: Vec<String> = Arrangement::ALL
        .iter()
        .map(|a| format!("{} - {}", a.label(), a.description()))
        .collect();
    let arrangement_default = Arrangement::ALL
        .iter()
        .position(|a| a.as_str() == defaults.arrangement)
        .unwrap_or(0);
    let arrangement = Select::new()
        .with_prompt("口数")
        .items(&arrangement_items)
        .default(arrangement_default)
        .interact()
        .map_err(dialog_error)?;

    let wall_thickness = ask_mm("壁厚 (mm)", defaults.wall_thickness, WALL_THICKNESS_RANGE_MM)?;
    let depth = ask_mm("奥行き (mm)", defaults.depth, DEPTH_RANGE_MM)?;

    let notes: String = Input::new()
        .with_prompt("メモ（任意）")
        .default(defaults.notes.clone())
        .allow_empty(true)
        .interact_text()
        .map_err(dialog_error)?;

    Ok(Selections {
        color: Color::ALL[color].as_str().to_string(),
        arrangement: Arrangement::ALL[arrangement].as_str().to_string(),
        wall_thickness,
        depth,
        notes,
    })
}

fn ask_mm(prompt: &str, default: f64, range: RangeInclusive<f64>) -> Result<f64> {
    let label = format!("{} [{}-{}]", prompt, range.start(), range.end());
    Input::<f64>::new()
        .with_prompt(label)
        .default(default)
        .validate_with(|v: &f64| -> std::result::Result<(), String> {
            if range.contains(v) {
                Ok(())
            } else {
                Err(format!("{} から {} の範囲で入力してください", range.start(), range.end()))
            }
        })
        .interact_text()
        .map_err(dialog_error)
}

/// 表示した内容で生成に進むか
pub fn confirm_generate() -> Result<bool> {
    Confirm::new()
        .with_prompt("この内容で生成しますか？")
        .default(true)
        .interact()
        .map_err(dialog_error)
}

fn dialog_error(e: dialoguer::Error) -> OutletForgeError {
    OutletForgeError::Dialog(e.to_string())
}
