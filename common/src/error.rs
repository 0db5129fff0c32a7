//! エラー型定義

use crate::workflow::{Action, Stage};
use thiserror::Error;

/// 入力検証エラー
///
/// 検出したステージでそのまま表示される。自動リトライはしない。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No file selected")]
    NoFile,

    #[error("Only one file can be submitted at a time ({0} selected)")]
    TooManyFiles(usize),

    #[error("Unsupported file type: {0} (accepted: PNG, JPG, JPEG, GIF, BMP)")]
    UnsupportedType(String),

    #[error("File is too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("File is empty: {0}")]
    EmptyFile(String),

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Unknown arrangement: {0}")]
    UnknownArrangement(String),

    #[error("Wall thickness {0} mm is outside 1.0-5.0 mm")]
    WallThicknessOutOfRange(f64),

    #[error("Depth {0} mm is outside 10-50 mm")]
    DepthOutOfRange(f64),

    #[error("Outlet type {given} does not match classified type {expected}")]
    OutletTypeMismatch { expected: String, given: String },
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cannot {action} while in stage {stage}")]
    Transition { stage: Stage, action: Action },

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_constraint() {
        let err = ValidationError::TooLarge { size: 20_000_000, max: 16_777_216 };
        let display = err.to_string();
        assert!(display.contains("too large"));
        assert!(display.contains("16777216"));

        let err = ValidationError::UnsupportedType("notes.txt".into());
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_error_from_validation() {
        let error: Error = ValidationError::NoFile.into();
        assert!(matches!(error, Error::Validation(ValidationError::NoFile)));
        assert_eq!(error.to_string(), "Validation error: No file selected");
    }

    #[test]
    fn test_error_display_transition() {
        let error = Error::Transition { stage: Stage::Idle, action: Action::Generate };
        assert_eq!(error.to_string(), "Cannot generate while in stage idle");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
