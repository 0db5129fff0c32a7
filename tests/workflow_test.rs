//! ワークフロー全体の統合テスト
//!
//! 分類・生成サービスはテスト内の偽実装か、到達できないエンドポイントを使う。

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use outlet_forge::api::Endpoint;
use outlet_forge::classifier::{Classifier, HttpClassifier, OfflineClassifier};
use outlet_forge::download::DownloadDispatcher;
use outlet_forge::error::OutletForgeError;
use outlet_forge::generator::{Generator, HttpGenerator, OfflineGenerator};
use outlet_forge::Workflow;
use outlet_forge_common::workflow::GENERATING_MESSAGE;
use outlet_forge_common::{
    fallback, ArtifactFormat, ClassificationResult, Confidence, CustomizationOptions,
    DownloadArtifact, Error, OutletType, ProductRecord, Provenance, Resolution, Selections, Stage,
    UploadCandidate, ValidationError, WorkflowState,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

struct FakeClassifier {
    result: ClassificationResult,
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, _candidate: &UploadCandidate) -> ClassificationResult {
        self.result.clone()
    }
}

struct FakeGenerator {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, options: &CustomizationOptions) -> DownloadArtifact {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DownloadArtifact {
            filename: format!("{}_{}.stl", options.outlet_type(), options.arrangement()),
            content: b"solid remote\nendsolid remote".to_vec(),
            format: ArtifactFormat::Stl,
            source: Provenance::Remote,
        }
    }
}

type TestWorkflow = Workflow<FakeClassifier, FakeGenerator>;

fn uk_socket() -> ClassificationResult {
    ClassificationResult {
        outlet_type: OutletType::new("BS_1363"),
        confidence: Confidence::new(0.93).unwrap(),
        product: ProductRecord {
            name: "BS 1363 UK Socket".into(),
            description: "Standard UK three-pin wall socket".into(),
            voltage: "230V".into(),
            current_rating: "13A".into(),
            natural_image_url: "https://example.com/n.jpg".into(),
            product_image_url: "https://example.com/p.jpg".into(),
        },
        source: Provenance::Remote,
    }
}

fn fake_workflow(download_dir: &Path) -> (TestWorkflow, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let workflow = Workflow::new(
        FakeClassifier { result: uk_socket() },
        FakeGenerator { calls: calls.clone() },
        DownloadDispatcher::new(download_dir),
    );
    (workflow, calls)
}

/// 実在のJPEGの後ろを0で埋めて指定サイズにする
fn write_jpeg(path: &Path, size: usize) {
    let img = RgbImage::from_fn(64, 48, |x, y| image::Rgb([(x * 4) as u8, (y * 5) as u8, 90]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    assert!(buf.len() < size);
    buf.resize(size, 0);
    std::fs::write(path, buf).unwrap();
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255])).save(&path).unwrap();
    path
}

fn black_double() -> Selections {
    Selections {
        color: "black".into(),
        arrangement: "double".into(),
        wall_thickness: 2.5,
        depth: 25.0,
        notes: String::new(),
    }
}

/// 指定ステージまで進める（Classifying / Generating は発行だけして止める）
async fn drive_to(stage: Stage, dir: &Path) -> TestWorkflow {
    let image = write_png(dir, "socket.png");
    let (mut workflow, _) = fake_workflow(dir);
    if stage == Stage::Idle {
        return workflow;
    }

    workflow.submit(&[image]).await.unwrap();
    if stage == Stage::Uploading {
        return workflow;
    }

    let pending = workflow.start_classification().unwrap();
    if stage == Stage::Classifying {
        return workflow;
    }
    let result = workflow.run_classification(&pending).await;
    workflow.complete_classification(pending, result).unwrap();
    if stage == Stage::Results {
        return workflow;
    }

    workflow.customize().unwrap();
    if stage == Stage::Customizing {
        return workflow;
    }

    let pending = workflow.start_generation(&Selections::default()).unwrap();
    if stage == Stage::Generating {
        return workflow;
    }
    let artifact = workflow.run_generation(&pending).await;
    workflow.complete_generation(pending, artifact).unwrap();
    workflow
}

/// 2MBのJPEGで最後まで通す（サービスには到達できない）
#[tokio::test]
async fn test_end_to_end_with_unreachable_service() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("outlet.jpg");
    write_jpeg(&image, 2 * 1024 * 1024);

    let endpoint = Endpoint::new("http://127.0.0.1:9");
    let mut workflow = Workflow::new(
        HttpClassifier::new(endpoint.clone(), Duration::from_millis(20)).unwrap(),
        HttpGenerator::new(endpoint).unwrap(),
        DownloadDispatcher::new(dir.path()),
    );

    let state = workflow.upload(&[image]).await.unwrap();
    assert_eq!(state.stage(), Stage::Results);
    assert!(!state.is_loading());
    let classification = state.classification().expect("classification must be held");
    assert_eq!(classification.outlet_type.as_str(), "NEMA_5-15R");
    assert!(classification.source.is_fallback());
    assert_eq!(
        workflow.trail(),
        &[Stage::Idle, Stage::Uploading, Stage::Classifying, Stage::Results]
    );

    workflow.customize().unwrap();
    let artifact = workflow.generate(&black_double()).await.unwrap().clone();
    assert!(!artifact.filename.is_empty());
    assert_eq!(artifact.filename, "NEMA_5-15R_double_black.stl");
    assert_eq!(
        workflow.trail(),
        &[
            Stage::Idle,
            Stage::Uploading,
            Stage::Classifying,
            Stage::Results,
            Stage::Customizing,
            Stage::Generating,
            Stage::Downloaded,
        ]
    );

    let options = workflow.state().customization().unwrap();
    assert_eq!(options.wall_thickness_mm(), 2.5);
    assert_eq!(options.depth_mm(), 25.0);

    let path = workflow.download().unwrap();
    assert_eq!(std::fs::read(path).unwrap(), fallback::PLACEHOLDER_STL.as_bytes());
}

/// 偽サービスで最後まで通す
#[tokio::test]
async fn test_end_to_end_with_remote_results() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_png(dir.path(), "uk.png");
    let (mut workflow, calls) = fake_workflow(dir.path());

    workflow.upload(&[image]).await.unwrap();
    assert_eq!(workflow.state().classification(), Some(&uk_socket()));

    workflow.customize().unwrap();
    let artifact = workflow.generate(&black_double()).await.unwrap();
    assert_eq!(artifact.filename, "BS_1363_double.stl");
    assert_eq!(artifact.source, Provenance::Remote);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let first = workflow.download().unwrap();
    let second = workflow.download().unwrap();
    assert_ne!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(workflow.state().stage(), Stage::Downloaded);
}

/// どのステージからリスタートしても初期状態と一致する
#[tokio::test]
async fn test_restart_from_every_stage() {
    let stages = [
        Stage::Idle,
        Stage::Uploading,
        Stage::Classifying,
        Stage::Results,
        Stage::Customizing,
        Stage::Generating,
        Stage::Downloaded,
    ];

    for stage in stages {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut workflow = drive_to(stage, dir.path()).await;
        assert_eq!(workflow.state().stage(), stage);

        workflow.restart();
        assert_eq!(workflow.state(), &WorkflowState::initial(), "restart from {}", stage);
        assert_eq!(workflow.trail(), &[Stage::Idle]);
    }
}

/// リスタート後に届いた分類結果は反映されない
#[tokio::test]
async fn test_stale_classification_is_dropped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_png(dir.path(), "socket.png");
    let (mut workflow, _) = fake_workflow(dir.path());

    workflow.submit(&[image]).await.unwrap();
    let pending = workflow.start_classification().unwrap();
    let preview = workflow.run_preview(&pending).await;
    let result = workflow.run_classification(&pending).await;

    workflow.restart();
    let resolution = workflow.complete_preview(&pending, preview).unwrap();
    assert_eq!(resolution, Resolution::Stale);
    let resolution = workflow.complete_classification(pending, result).unwrap();

    assert_eq!(resolution, Resolution::Stale);
    assert_eq!(workflow.state(), &WorkflowState::initial());
}

/// 古い分類結果が新しいセッションの分類を上書きしない
#[tokio::test]
async fn test_stale_classification_does_not_touch_new_session() {
    let dir = tempdir().expect("Failed to create temp dir");
    let first_image = write_png(dir.path(), "first.png");
    let second_image = write_png(dir.path(), "second.png");
    let (mut workflow, _) = fake_workflow(dir.path());

    workflow.submit(&[first_image]).await.unwrap();
    let old = workflow.start_classification().unwrap();
    let old_preview = workflow.run_preview(&old).await;

    workflow.restart();
    workflow.submit(&[second_image]).await.unwrap();
    let current = workflow.start_classification().unwrap();
    let snapshot = workflow.state().clone();

    workflow.complete_preview(&old, old_preview).unwrap();
    let resolution = workflow
        .complete_classification(old, fallback::classification())
        .unwrap();
    assert_eq!(resolution, Resolution::Stale);
    assert_eq!(workflow.state(), &snapshot);
    assert_eq!(workflow.state().preview(), None);
    assert_eq!(workflow.state().candidate().unwrap().file_name(), "second.png");

    let result = workflow.run_classification(&current).await;
    let resolution = workflow.complete_classification(current, result).unwrap();
    assert_eq!(resolution, Resolution::Applied);
    assert_eq!(workflow.state().classification(), Some(&uk_socket()));
}

/// リスタート後に届いた生成物は反映されない
#[tokio::test]
async fn test_stale_generation_is_dropped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut workflow = drive_to(Stage::Customizing, dir.path()).await;

    let pending = workflow.start_generation(&black_double()).unwrap();
    assert_eq!(workflow.state().loading_message(), GENERATING_MESSAGE);
    let artifact = workflow.run_generation(&pending).await;

    workflow.restart();
    let resolution = workflow.complete_generation(pending, artifact).unwrap();
    assert_eq!(resolution, Resolution::Stale);
    assert!(workflow.state().artifact().is_none());
    assert!(workflow.download().is_err());
}

/// 対応していない形式は Idle のままエラー表示
#[tokio::test]
async fn test_unsupported_type_stays_idle() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("socket.webp");
    std::fs::write(&path, b"RIFF0000WEBP").unwrap();
    let (mut workflow, _) = fake_workflow(dir.path());

    let err = workflow.submit(&[path]).await.unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::UnsupportedType(_))));
    assert_eq!(workflow.state().stage(), Stage::Idle);
    assert!(workflow.state().error().is_some());
    assert!(workflow.state().candidate().is_none());
    assert_eq!(workflow.trail(), &[Stage::Idle]);

    let image = write_png(dir.path(), "socket.png");
    workflow.submit(&[image]).await.unwrap();
    assert_eq!(workflow.state().stage(), Stage::Uploading);
    assert!(workflow.state().error().is_none());
}

/// 複数ファイルはまとめて拒否される
#[tokio::test]
async fn test_multiple_files_rejected_as_batch() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = write_png(dir.path(), "a.png");
    let b = write_png(dir.path(), "b.png");
    let (mut workflow, _) = fake_workflow(dir.path());

    let err = workflow.upload(&[a, b]).await.unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationError::TooManyFiles(2)));
    assert_eq!(workflow.state().stage(), Stage::Idle);
    assert!(workflow.state().candidate().is_none());
}

/// 範囲外の寸法は Customizing のままエラー表示
#[tokio::test]
async fn test_invalid_customization_stays_customizing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut workflow, calls) = {
        let image = write_png(dir.path(), "socket.png");
        let (mut workflow, calls) = fake_workflow(dir.path());
        workflow.upload(&[image]).await.unwrap();
        workflow.customize().unwrap();
        (workflow, calls)
    };

    let selections = Selections {
        wall_thickness: 6.0,
        ..black_double()
    };
    let err = workflow.generate(&selections).await.unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationError::WallThicknessOutOfRange(6.0)));
    assert_eq!(workflow.state().stage(), Stage::Customizing);
    assert_eq!(workflow.state().error(), Some(&ValidationError::WallThicknessOutOfRange(6.0)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let selections = Selections {
        color: "purple".into(),
        ..black_double()
    };
    assert!(workflow.generate(&selections).await.is_err());
    assert_eq!(workflow.state().stage(), Stage::Customizing);

    workflow.generate(&black_double()).await.unwrap();
    assert_eq!(workflow.state().stage(), Stage::Downloaded);
    assert!(workflow.state().error().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// 処理中の二重実行は拒否される
#[tokio::test]
async fn test_duplicate_generation_is_busy() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut workflow = drive_to(Stage::Customizing, dir.path()).await;

    let _pending = workflow.start_generation(&black_double()).unwrap();
    let err = workflow.start_generation(&black_double()).unwrap_err();
    assert!(matches!(err, OutletForgeError::Common(Error::Busy)));
    assert_eq!(workflow.state().stage(), Stage::Generating);
}

/// 処理中の二重分類は拒否される
#[tokio::test]
async fn test_duplicate_classification_is_busy() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut workflow = drive_to(Stage::Classifying, dir.path()).await;

    let err = workflow.start_classification().unwrap_err();
    assert!(matches!(err, OutletForgeError::Common(Error::Busy)));
}

/// 生成前の保存は拒否される
#[tokio::test]
async fn test_download_requires_generation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let workflow = drive_to(Stage::Customizing, dir.path()).await;

    let err = workflow.download().unwrap_err();
    assert!(matches!(err, OutletForgeError::Common(Error::Transition { .. })));
}

/// カスタマイズから結果表示に戻っても分類結果は保持される
#[tokio::test]
async fn test_back_to_results_keeps_classification() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut workflow = drive_to(Stage::Customizing, dir.path()).await;

    let state = workflow.back_to_results().unwrap();
    assert_eq!(state.stage(), Stage::Results);
    assert_eq!(state.classification(), Some(&uk_socket()));

    workflow.customize().unwrap();
    assert_eq!(workflow.state().stage(), Stage::Customizing);
}

/// プレビューは分類の完了を待たずに反映され、結果表示でも保持される
#[tokio::test]
async fn test_preview_lands_while_classifying() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_png(dir.path(), "socket.png");
    let mut workflow = Workflow::new(
        OfflineClassifier::new(Duration::from_millis(300)),
        OfflineGenerator,
        DownloadDispatcher::new(dir.path()),
    );

    workflow.submit(&[image]).await.unwrap();
    let pending = workflow.start_classification().unwrap();

    let preview = workflow.run_preview(&pending).await;
    let resolution = workflow.complete_preview(&pending, preview).unwrap();
    assert_eq!(resolution, Resolution::Applied);

    let state = workflow.state();
    assert_eq!(state.stage(), Stage::Classifying);
    assert!(state.is_loading());
    let preview = state.preview().expect("preview while classifying").to_string();
    assert!(preview.starts_with("data:image/png;base64,"));
    assert_eq!(state.candidate().and_then(|c| c.preview()), Some(preview.as_str()));

    let result = workflow.run_classification(&pending).await;
    workflow.complete_classification(pending, result).unwrap();
    assert_eq!(workflow.state().stage(), Stage::Results);
    assert!(workflow.state().candidate().is_none());
    assert_eq!(workflow.state().preview(), Some(preview.as_str()));
}

/// 一括実行でも結果表示にプレビューが残る
#[tokio::test]
async fn test_classify_keeps_preview_for_results() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_png(dir.path(), "socket.png");
    let (mut workflow, _) = fake_workflow(dir.path());

    let state = workflow.upload(&[image]).await.unwrap();
    assert_eq!(state.stage(), Stage::Results);
    assert!(state
        .preview()
        .is_some_and(|p| p.starts_with("data:image/png;base64,")));

    workflow.customize().unwrap();
    workflow.generate(&black_double()).await.unwrap();
    assert!(workflow.state().preview().is_some());

    workflow.restart();
    assert_eq!(workflow.state().preview(), None);
}

/// 検証だけではステージが進まず、不正な入力は状態に残る
#[tokio::test]
async fn test_review_records_rejection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut workflow, calls) = {
        let image = write_png(dir.path(), "socket.png");
        let (mut workflow, calls) = fake_workflow(dir.path());
        workflow.upload(&[image]).await.unwrap();
        workflow.customize().unwrap();
        (workflow, calls)
    };

    let options = workflow.review(&black_double()).unwrap();
    assert_eq!(options.depth_mm(), 25.0);
    assert_eq!(workflow.state().stage(), Stage::Customizing);
    assert!(workflow.state().customization().is_none());

    let selections = Selections {
        depth: 60.0,
        ..black_double()
    };
    let err = workflow.review(&selections).unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationError::DepthOutOfRange(60.0)));
    assert_eq!(workflow.state().error(), Some(&ValidationError::DepthOutOfRange(60.0)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let pending = workflow.start_generation(&black_double()).unwrap();
    assert_eq!(pending.options(), &options);
    assert!(workflow.state().error().is_none());
}
