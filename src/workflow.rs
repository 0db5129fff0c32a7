//! ワークフロー実行
//!
//! `Session` を唯一の状態として持ち、取り込み・分類・生成・保存を順に駆動する。
//! 非同期処理は「開始 → 実行 → 完了」の3段に分かれていて、
//! 完了時に発行世代を照合する。リスタート後に届いた結果は反映しない。

use crate::classifier::Classifier;
use crate::download::DownloadDispatcher;
use crate::error::{OutletForgeError, Result};
use crate::generator::Generator;
use crate::ingest;
use outlet_forge_common::workflow::Action;
use outlet_forge_common::{
    collect, ClassificationResult, CustomizationOptions, DownloadArtifact, Error, Resolution,
    Selections, Session, Stage, Ticket, UploadCandidate, WorkflowState,
};
use std::path::{Path, PathBuf};

/// 発行済みの分類処理
#[derive(Debug, Clone)]
pub struct PendingClassification {
    ticket: Ticket,
    candidate: UploadCandidate,
}

impl PendingClassification {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn candidate(&self) -> &UploadCandidate {
        &self.candidate
    }
}

/// 発行済みの生成処理
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    ticket: Ticket,
    options: CustomizationOptions,
}

impl PendingGeneration {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn options(&self) -> &CustomizationOptions {
        &self.options
    }
}

pub struct Workflow<C, G> {
    session: Session,
    classifier: C,
    generator: G,
    dispatcher: DownloadDispatcher,
}

impl<C: Classifier, G: Generator> Workflow<C, G> {
    pub fn new(classifier: C, generator: G, dispatcher: DownloadDispatcher) -> Self {
        Self {
            session: Session::new(),
            classifier,
            generator,
            dispatcher,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        self.session.state()
    }

    /// 直近のリスタート以降に通過したステージ
    pub fn trail(&self) -> &[Stage] {
        self.session.trail()
    }

    // =============================================
    // 取り込み
    // =============================================

    /// Idle → Uploading
    ///
    /// 検証エラーの場合は Idle のままエラーを状態に残し、同じエラーを返す。
    pub async fn submit(&mut self, paths: &[PathBuf]) -> Result<&WorkflowState> {
        if self.state().stage() != Stage::Idle {
            let stage = self.state().stage();
            return Err(Error::Transition {
                stage,
                action: Action::Submit,
            }
            .into());
        }

        match ingest::read_selection(paths).await {
            Ok(candidate) => Ok(self.session.apply(|s| s.submitted(candidate))?),
            Err(e) => {
                if let Some(validation) = e.validation() {
                    let validation = validation.clone();
                    self.session.apply(|s| s.rejected(validation))?;
                }
                Err(e)
            }
        }
    }

    /// 取り込みから分類結果の表示まで（Idle → Uploading → Classifying → Results）
    pub async fn upload(&mut self, paths: &[PathBuf]) -> Result<&WorkflowState> {
        self.submit(paths).await?;
        self.classify().await
    }

    // =============================================
    // 分類
    // =============================================

    /// Uploading → Classifying
    pub fn start_classification(&mut self) -> Result<PendingClassification> {
        let state = self.session.apply(|s| s.classifying())?;
        let candidate = state.candidate().cloned().ok_or(Error::Transition {
            stage: state.stage(),
            action: Action::Classify,
        })?;

        Ok(PendingClassification {
            ticket: self.session.ticket(),
            candidate,
        })
    }

    /// プレビューを生成（状態には触れない）
    pub async fn run_preview(&self, pending: &PendingClassification) -> String {
        ingest::decode_preview(pending.candidate.clone()).await
    }

    /// プレビューを反映（ステージは変わらない）
    pub fn complete_preview(
        &mut self,
        pending: &PendingClassification,
        preview: String,
    ) -> Result<Resolution> {
        apply_preview(&mut self.session, pending.ticket, preview)
    }

    /// 分類を実行（状態には触れない）
    pub async fn run_classification(
        &self,
        pending: &PendingClassification,
    ) -> ClassificationResult {
        self.classifier.classify(&pending.candidate).await
    }

    /// Classifying → Results
    pub fn complete_classification(
        &mut self,
        pending: PendingClassification,
        result: ClassificationResult,
    ) -> Result<Resolution> {
        Ok(self.session.resolve(pending.ticket, |s| s.classified(result))?)
    }

    /// Uploading → Classifying → Results
    ///
    /// プレビュー生成と分類を並行して実行し、先に終わった方から状態に反映する。
    pub async fn classify(&mut self) -> Result<&WorkflowState> {
        let pending = self.start_classification()?;
        let ticket = pending.ticket;

        let preview = ingest::decode_preview(pending.candidate.clone());
        let classification = self.classifier.classify(&pending.candidate);
        tokio::pin!(preview, classification);

        tokio::select! {
            preview = &mut preview => {
                apply_preview(&mut self.session, ticket, preview)?;
                let result = classification.await;
                self.session.resolve(ticket, |s| s.classified(result))?;
            }
            result = &mut classification => {
                self.session.resolve(ticket, |s| s.classified(result))?;
                let preview = preview.await;
                apply_preview(&mut self.session, ticket, preview)?;
            }
        }
        Ok(self.state())
    }

    // =============================================
    // カスタマイズ
    // =============================================

    /// Results → Customizing
    pub fn customize(&mut self) -> Result<&WorkflowState> {
        Ok(self.session.apply(|s| s.customizing())?)
    }

    /// Customizing → Results
    pub fn back_to_results(&mut self) -> Result<&WorkflowState> {
        Ok(self.session.apply(|s| s.back_to_results())?)
    }

    // =============================================
    // 生成
    // =============================================

    /// カスタマイズ入力を検証する（ステージは変わらない）
    ///
    /// 入力が不正な場合は Customizing のままエラーを状態に残し、同じエラーを返す。
    pub fn review(&mut self, selections: &Selections) -> Result<CustomizationOptions> {
        let state = self.state();
        if state.is_loading() {
            return Err(Error::Busy.into());
        }
        let classification = match (state.stage(), state.classification()) {
            (Stage::Customizing, Some(classification)) => classification,
            (stage, _) => {
                return Err(Error::Transition {
                    stage,
                    action: Action::Generate,
                }
                .into())
            }
        };

        match collect(selections, classification) {
            Ok(options) => Ok(options),
            Err(e) => {
                self.session.apply(|s| s.rejected(e.clone()))?;
                Err(e.into())
            }
        }
    }

    /// Customizing → Generating
    pub fn start_generation(&mut self, selections: &Selections) -> Result<PendingGeneration> {
        let options = self.review(selections)?;
        self.session.apply(|s| s.generating(options.clone()))?;
        Ok(PendingGeneration {
            ticket: self.session.ticket(),
            options,
        })
    }

    /// 生成を実行（状態には触れない）
    pub async fn run_generation(&self, pending: &PendingGeneration) -> DownloadArtifact {
        self.generator.generate(&pending.options).await
    }

    /// Generating → Downloaded
    pub fn complete_generation(
        &mut self,
        pending: PendingGeneration,
        artifact: DownloadArtifact,
    ) -> Result<Resolution> {
        Ok(self.session.resolve(pending.ticket, |s| s.generated(artifact))?)
    }

    /// Customizing → Generating → Downloaded
    pub async fn generate(&mut self, selections: &Selections) -> Result<&DownloadArtifact> {
        let pending = self.start_generation(selections)?;
        let artifact = self.run_generation(&pending).await;
        self.complete_generation(pending, artifact)?;
        self.state().artifact().ok_or(OutletForgeError::NoArtifact)
    }

    // =============================================
    // 保存
    // =============================================

    /// 生成物を保存（Downloaded でのみ可能、何度でも呼べる）
    pub fn download(&self) -> Result<PathBuf> {
        let state = self.state();
        match (state.stage(), state.artifact()) {
            (Stage::Downloaded, Some(artifact)) => self.dispatcher.deliver(artifact),
            (stage, _) => Err(Error::Transition {
                stage,
                action: Action::Download,
            }
            .into()),
        }
    }

    pub fn download_dir(&self) -> &Path {
        self.dispatcher.dir()
    }

    /// どのステージからでも Idle へ戻る
    pub fn restart(&mut self) {
        self.session.restart();
    }
}

/// 空のプレビュー（生成タスク自体の失敗）は反映しない
fn apply_preview(session: &mut Session, ticket: Ticket, preview: String) -> Result<Resolution> {
    if preview.is_empty() {
        return Ok(Resolution::Applied);
    }
    Ok(session.resolve(ticket, |s| s.preview_decoded(preview))?)
}
