//! 分類結果の保持と表示用アクセサ

use crate::types::{ClassificationResult, Confidence, OutletType, ProductRecord, Provenance};

/// 信頼度の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: Confidence) -> Self {
        let value = confidence.value();
        if value >= 0.8 {
            ConfidenceBand::High
        } else if value >= 0.6 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "High Confidence",
            ConfidenceBand::Medium => "Medium Confidence",
            ConfidenceBand::Low => "Low Confidence",
        }
    }
}

/// 分類結果ホルダー
///
/// 受け取った結果をそのまま次のステージへ渡す。加工はしない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPresenter {
    current: Option<ClassificationResult>,
}

impl ResultPresenter {
    pub fn present(&mut self, result: ClassificationResult) {
        self.current = Some(result);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        self.current.as_ref()
    }

    pub fn outlet_type(&self) -> Option<&OutletType> {
        self.current.as_ref().map(|r| &r.outlet_type)
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.current.as_ref().map(|r| r.confidence)
    }

    pub fn band(&self) -> Option<ConfidenceBand> {
        self.confidence().map(ConfidenceBand::from_confidence)
    }

    pub fn product(&self) -> Option<&ProductRecord> {
        self.current.as_ref().map(|r| &r.product)
    }

    pub fn source(&self) -> Option<Provenance> {
        self.current.as_ref().map(|r| r.source)
    }
}
