//! 画像ファイルの取り込み
//!
//! ディスク上のパスを検証して `UploadCandidate` にし、プレビューを非同期で作る。
//! 検証ルール自体は `outlet_forge_common::ingest` にある。

use crate::error::{OutletForgeError, Result};
use image::{DynamicImage, ImageFormat};
use outlet_forge_common::ingest::{self, FileMeta};
use outlet_forge_common::{ImageMime, UploadCandidate};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// プレビューの最大辺（ピクセル）
pub const PREVIEW_MAX_EDGE: u32 = 400;

/// パスからメタデータを取得（中身は読まない）
pub async fn stat(path: &Path) -> Result<FileMeta> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| OutletForgeError::FileNotFound(path.display().to_string()))?;
    if !metadata.is_file() {
        return Err(OutletForgeError::FileNotFound(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(FileMeta {
        name,
        declared_mime: None,
        size: metadata.len(),
    })
}

/// 選択されたパスを検証して読み込む
///
/// 形式・サイズ・件数はすべて読み込み前に検証する。
pub async fn read_selection(paths: &[PathBuf]) -> Result<UploadCandidate> {
    let mut metas = Vec::with_capacity(paths.len());
    for path in paths {
        metas.push(stat(path).await?);
    }

    let mime = ingest::check(&metas)?;
    let (path, meta) = match (paths.first(), metas.into_iter().next()) {
        (Some(path), Some(meta)) => (path, meta),
        _ => return Err(outlet_forge_common::ValidationError::NoFile.into()),
    };

    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(file = %meta.name, size = bytes.len(), mime = mime.as_mime(), "image accepted");
    Ok(ingest::accept(meta, mime, bytes)?)
}

/// プレビュー用Data URIを作る
///
/// デコードはブロッキングスレッドで行う。デコードできない場合は元のバイト列をそのまま使う。
pub async fn decode_preview(candidate: UploadCandidate) -> String {
    let fallback_mime = candidate.mime();
    let task = tokio::task::spawn_blocking(move || {
        let data_uri = render_preview(candidate.bytes());
        (data_uri, candidate)
    });

    match task.await {
        Ok((Some(data_uri), _)) => data_uri,
        Ok((None, candidate)) => {
            tracing::debug!(file = candidate.file_name(), "preview decode failed, using raw bytes");
            ingest::to_data_uri(fallback_mime, candidate.bytes())
        }
        Err(e) => {
            tracing::warn!("preview task failed: {}", e);
            String::new()
        }
    }
}

fn render_preview(bytes: &[u8]) -> Option<String> {
    let image = image::load_from_memory(bytes).ok()?;
    let thumb = shrink(image);

    let mut buf = Vec::new();
    thumb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).ok()?;
    Some(ingest::to_data_uri(ImageMime::Png, &buf))
}

fn shrink(image: DynamicImage) -> DynamicImage {
    if image.width() > PREVIEW_MAX_EDGE || image.height() > PREVIEW_MAX_EDGE {
        image.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE)
    } else {
        image
    }
}
