//! ワークフロー状態機械
//!
//! Idle → Uploading → Classifying → Results → Customizing → Generating → Downloaded
//!
//! 各遷移は現在の `WorkflowState` から新しい値を返す純粋関数で、
//! 状態を直接書き換えるコンポーネントは無い。非同期処理の結果は
//! 発行時の世代 (`Ticket`) と照合し、リスタート後に届いたものは捨てる。

use crate::error::{Error, Result, ValidationError};
use crate::presenter::ResultPresenter;
use crate::types::{
    ClassificationResult, CustomizationOptions, DownloadArtifact, UploadCandidate,
};
use std::fmt;

/// 分類中に表示するメッセージ
pub const CLASSIFYING_MESSAGE: &str = "We are recognizing your electrical socket...";
/// 生成中に表示するメッセージ
pub const GENERATING_MESSAGE: &str = "Generating your 3D model...";

/// ステージ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Uploading,
    Classifying,
    Results,
    Customizing,
    Generating,
    Downloaded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Uploading => "uploading",
            Stage::Classifying => "classifying",
            Stage::Results => "results",
            Stage::Customizing => "customizing",
            Stage::Generating => "generating",
            Stage::Downloaded => "downloaded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 遷移を引き起こす操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Preview,
    Classify,
    Resolve,
    Customize,
    Back,
    Generate,
    Download,
}

impl Action {
    /// 非同期処理を新しく始める操作か
    fn starts_work(&self) -> bool {
        matches!(self, Action::Submit | Action::Classify | Action::Generate)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Submit => "submit",
            Action::Preview => "update preview",
            Action::Classify => "classify",
            Action::Resolve => "resolve",
            Action::Customize => "customize",
            Action::Back => "go back",
            Action::Generate => "generate",
            Action::Download => "download",
        };
        f.write_str(s)
    }
}

/// セッション状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    stage: Stage,
    loading: bool,
    loading_message: String,
    error: Option<ValidationError>,
    candidate: Option<UploadCandidate>,
    /// 取り込んだ画像のプレビュー。候補を手放した後も結果画面で使う
    preview: Option<String>,
    results: ResultPresenter,
    customization: Option<CustomizationOptions>,
    artifact: Option<DownloadArtifact>,
}

impl WorkflowState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn loading_message(&self) -> &str {
        &self.loading_message
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.candidate.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn results(&self) -> &ResultPresenter {
        &self.results
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.results.result()
    }

    pub fn customization(&self) -> Option<&CustomizationOptions> {
        self.customization.as_ref()
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        self.artifact.as_ref()
    }

    fn guard(&self, expected: Stage, action: Action) -> Result<()> {
        if self.loading && action.starts_work() {
            return Err(Error::Busy);
        }
        if self.stage != expected {
            return Err(Error::Transition {
                stage: self.stage,
                action,
            });
        }
        Ok(())
    }

    /// 取り込み結果を反映（成功なら Uploading、失敗なら Idle のままエラー表示）
    pub fn submit(
        &self,
        outcome: std::result::Result<UploadCandidate, ValidationError>,
    ) -> Result<Self> {
        match outcome {
            Ok(candidate) => self.submitted(candidate),
            Err(error) => {
                self.guard(Stage::Idle, Action::Submit)?;
                self.rejected(error)
            }
        }
    }

    /// Idle → Uploading
    pub fn submitted(&self, candidate: UploadCandidate) -> Result<Self> {
        self.guard(Stage::Idle, Action::Submit)?;
        Ok(Self {
            stage: Stage::Uploading,
            error: None,
            candidate: Some(candidate),
            ..Self::initial()
        })
    }

    /// 検証エラーを現在のステージに表示する（ステージは進まない）
    pub fn rejected(&self, error: ValidationError) -> Result<Self> {
        match self.stage {
            Stage::Idle => Ok(Self {
                error: Some(error),
                ..Self::initial()
            }),
            Stage::Customizing => Ok(Self {
                error: Some(error),
                ..self.clone()
            }),
            stage => Err(Error::Transition { stage, action: Action::Submit }),
        }
    }

    /// プレビューのデコード完了を反映（ステージは変わらない）
    ///
    /// 分類より後に終わった場合でも、取り込み以降のどのステージでも反映できる。
    pub fn preview_decoded(&self, data_uri: String) -> Result<Self> {
        if self.stage == Stage::Idle {
            return Err(Error::Transition {
                stage: self.stage,
                action: Action::Preview,
            });
        }
        Ok(Self {
            candidate: self.candidate.as_ref().map(|c| c.with_preview(data_uri.clone())),
            preview: Some(data_uri),
            ..self.clone()
        })
    }

    /// Uploading → Classifying
    pub fn classifying(&self) -> Result<Self> {
        self.guard(Stage::Uploading, Action::Classify)?;
        Ok(Self {
            stage: Stage::Classifying,
            loading: true,
            loading_message: CLASSIFYING_MESSAGE.to_string(),
            ..self.clone()
        })
    }

    /// Classifying → Results（リモート/フォールバックどちらの結果も同じ扱い）
    pub fn classified(&self, result: ClassificationResult) -> Result<Self> {
        self.guard(Stage::Classifying, Action::Resolve)?;
        let mut results = ResultPresenter::default();
        results.present(result);
        Ok(Self {
            stage: Stage::Results,
            preview: self.preview.clone(),
            results,
            ..Self::initial()
        })
    }

    /// Results → Customizing
    pub fn customizing(&self) -> Result<Self> {
        self.guard(Stage::Results, Action::Customize)?;
        Ok(Self {
            stage: Stage::Customizing,
            error: None,
            ..self.clone()
        })
    }

    /// Customizing → Results
    pub fn back_to_results(&self) -> Result<Self> {
        self.guard(Stage::Customizing, Action::Back)?;
        Ok(Self {
            stage: Stage::Results,
            error: None,
            customization: None,
            ..self.clone()
        })
    }

    /// Customizing → Generating
    pub fn generating(&self, options: CustomizationOptions) -> Result<Self> {
        self.guard(Stage::Customizing, Action::Generate)?;
        let expected = self.results.outlet_type().ok_or(Error::Transition {
            stage: self.stage,
            action: Action::Generate,
        })?;
        if options.outlet_type() != expected {
            return Err(ValidationError::OutletTypeMismatch {
                expected: expected.to_string(),
                given: options.outlet_type().to_string(),
            }
            .into());
        }
        Ok(Self {
            stage: Stage::Generating,
            loading: true,
            loading_message: GENERATING_MESSAGE.to_string(),
            error: None,
            customization: Some(options),
            ..self.clone()
        })
    }

    /// Generating → Downloaded
    pub fn generated(&self, artifact: DownloadArtifact) -> Result<Self> {
        self.guard(Stage::Generating, Action::Resolve)?;
        Ok(Self {
            stage: Stage::Downloaded,
            loading: false,
            loading_message: String::new(),
            artifact: Some(artifact),
            ..self.clone()
        })
    }

    /// どのステージからでも初期状態へ
    pub fn restart(&self) -> Self {
        Self::initial()
    }
}

/// 非同期処理の発行世代
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// 非同期結果の反映結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// リスタート前に発行された結果なので捨てた
    Stale,
}

/// 状態と世代をまとめて持つセッション
///
/// 状態を更新できるのは `apply` / `resolve` / `restart` だけ。
#[derive(Debug, Clone)]
pub struct Session {
    state: WorkflowState,
    generation: u64,
    trail: Vec<Stage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::initial(),
            generation: 0,
            trail: vec![Stage::Idle],
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// 直近のリスタート以降に通過したステージ
    pub fn trail(&self) -> &[Stage] {
        &self.trail
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 現在の世代で非同期処理を発行する
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// 遷移関数を適用
    pub fn apply<F>(&mut self, transition: F) -> Result<&WorkflowState>
    where
        F: FnOnce(&WorkflowState) -> Result<WorkflowState>,
    {
        let next = transition(&self.state)?;
        if next.stage != self.state.stage {
            tracing::debug!(from = %self.state.stage, to = %next.stage, "stage transition");
            self.trail.push(next.stage);
        }
        self.state = next;
        Ok(&self.state)
    }

    /// 非同期結果を反映。古い世代の結果は状態に触れずに捨てる
    pub fn resolve<F>(&mut self, ticket: Ticket, transition: F) -> Result<Resolution>
    where
        F: FnOnce(&WorkflowState) -> Result<WorkflowState>,
    {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                generation = self.generation,
                "dropping stale result"
            );
            return Ok(Resolution::Stale);
        }
        self.apply(transition)?;
        Ok(Resolution::Applied)
    }

    /// 全エンティティを破棄して Idle に戻る
    pub fn restart(&mut self) {
        tracing::debug!(from = %self.state.stage, "restart");
        self.generation = self.generation.wrapping_add(1);
        self.state = self.state.restart();
        self.trail = vec![Stage::Idle];
    }
}
