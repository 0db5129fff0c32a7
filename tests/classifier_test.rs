//! 分類・生成クライアントの統合テスト
//!
//! 到達できないエンドポイント（127.0.0.1:9）に対してフォールバックすることを確認する。

use outlet_forge::api::Endpoint;
use outlet_forge::classifier::{Classifier, HttpClassifier, OfflineClassifier};
use outlet_forge::generator::{Generator, HttpGenerator};
use outlet_forge::ingest;
use outlet_forge_common::{collect, fallback, Provenance, Selections};
use std::time::{Duration, Instant};
use tempfile::tempdir;

const UNREACHABLE: &str = "http://127.0.0.1:9";

async fn candidate() -> outlet_forge_common::UploadCandidate {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("socket.png");
    image::RgbImage::from_pixel(8, 8, image::Rgb([200, 200, 200])).save(&path).unwrap();
    ingest::read_selection(&[path]).await.unwrap()
}

/// 到達できない場合は待ち時間の後に決まった代替結果を返す
#[tokio::test]
async fn test_unreachable_classifier_falls_back() {
    let delay = Duration::from_millis(200);
    let classifier = HttpClassifier::new(Endpoint::new(UNREACHABLE), delay).unwrap();
    let candidate = candidate().await;

    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_secs(10), classifier.classify(&candidate))
        .await
        .expect("classification must resolve");

    assert!(started.elapsed() >= delay);
    assert_eq!(result.outlet_type.as_str(), "NEMA_5-15R");
    assert_eq!(result.confidence.value(), 0.85);
    assert_eq!(result.source, Provenance::Fallback);
    assert_eq!(result, fallback::classification());
}

/// オフライン分類器も同じ代替結果
#[tokio::test]
async fn test_offline_classifier() {
    let classifier = OfflineClassifier::new(Duration::from_millis(10));
    let result = classifier.classify(&candidate().await).await;
    assert_eq!(result, fallback::classification());
}

/// 到達できない場合は代替STLを返す
#[tokio::test]
async fn test_unreachable_generator_falls_back() {
    let generator = HttpGenerator::new(Endpoint::new(UNREACHABLE)).unwrap();
    let selections = Selections {
        color: "ivory".into(),
        arrangement: "quad".into(),
        ..Selections::default()
    };
    let options = collect(&selections, &fallback::classification()).unwrap();

    let artifact = tokio::time::timeout(Duration::from_secs(10), generator.generate(&options))
        .await
        .expect("generation must resolve");

    assert_eq!(artifact.filename, "NEMA_5-15R_quad_ivory.stl");
    assert_eq!(artifact.content, fallback::PLACEHOLDER_STL.as_bytes());
    assert!(artifact.source.is_fallback());
}
