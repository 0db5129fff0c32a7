//! 画像取り込みの検証
//!
//! 1回の送信で受け付けるのは1ファイルのみ。形式とサイズを検証し、
//! 通過したものだけを `UploadCandidate` にする。ネットワークには触れない。

use crate::error::ValidationError;
use crate::types::{ImageMime, UploadCandidate};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// 最大ファイルサイズ（16 MiB）
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// ユーザーが選択したファイルのメタデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    /// ブラウザやOSが申告したMIMEタイプ（無ければ拡張子で判定）
    pub declared_mime: Option<String>,
    pub size: u64,
}

impl FileMeta {
    fn mime(&self) -> Option<ImageMime> {
        if let Some(declared) = self.declared_mime.as_deref() {
            return ImageMime::from_mime(declared);
        }
        let (_, ext) = self.name.rsplit_once('.')?;
        ImageMime::from_extension(ext)
    }
}

/// 中身付きの選択ファイル
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub meta: FileMeta,
    pub bytes: Vec<u8>,
}

/// 選択内容を検証（中身を読む前に呼べる）
///
/// 複数ファイルはまとめて拒否する。先頭だけ取り出すことはしない。
pub fn check(files: &[FileMeta]) -> Result<ImageMime, ValidationError> {
    let meta = match files {
        [] => return Err(ValidationError::NoFile),
        [single] => single,
        many => return Err(ValidationError::TooManyFiles(many.len())),
    };

    let mime = meta
        .mime()
        .ok_or_else(|| ValidationError::UnsupportedType(meta.name.clone()))?;

    check_size(&meta.name, meta.size)?;
    Ok(mime)
}

fn check_size(name: &str, size: u64) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyFile(name.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size, max: MAX_UPLOAD_BYTES });
    }
    Ok(())
}

/// 検証済みメタデータと読み込んだ中身から候補を作る
///
/// 申告サイズと実サイズが違う場合に備えて、実サイズで再検証する。
pub fn accept(
    meta: FileMeta,
    mime: ImageMime,
    bytes: Vec<u8>,
) -> Result<UploadCandidate, ValidationError> {
    check_size(&meta.name, bytes.len() as u64)?;
    Ok(UploadCandidate::new(meta.name, mime, bytes))
}

/// 選択から候補を作る（検証 → 受理）
pub fn submit(mut files: Vec<SelectedFile>) -> Result<UploadCandidate, ValidationError> {
    let metas: Vec<FileMeta> = files.iter().map(|f| f.meta.clone()).collect();
    let mime = check(&metas)?;
    let file = files.remove(0);
    accept(file.meta, mime, file.bytes)
}

/// バイト列からData URIを組み立てる
pub fn to_data_uri(mime: ImageMime, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime.as_mime(), STANDARD.encode(bytes))
}

/// Data URIからBase64データ部分を抽出
pub fn extract_base64_from_data_uri(data_uri: &str) -> Option<&str> {
    data_uri.split_once(',').map(|(_, data)| data)
}

/// Data URIからMIMEタイプを抽出
pub fn extract_mime_from_data_uri(data_uri: &str) -> Option<&str> {
    data_uri
        .strip_prefix("data:")
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
}
