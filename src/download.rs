//! 生成物の保存
//!
//! 保存先フォルダ内の一時ファイルに書き込んでから最終名に確定する。
//! 一時ファイルは成功・失敗どちらでも必ず解放される。

use crate::error::{OutletForgeError, Result};
use outlet_forge_common::DownloadArtifact;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 同名ファイルがある場合に試す連番の上限
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// ダウンロード処理
#[derive(Debug, Clone)]
pub struct DownloadDispatcher {
    dir: PathBuf,
}

impl DownloadDispatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 生成物をファイルとして保存し、保存先のパスを返す
    ///
    /// 同じ生成物で何度呼んでもよい。既存ファイルは上書きせず `name (1).stl` のように別名で保存する。
    pub fn deliver(&self, artifact: &DownloadArtifact) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(OutletForgeError::FolderNotFound(self.dir.display().to_string()));
        }

        let mut staging = tempfile::Builder::new()
            .prefix(".outlet-forge-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staging.write_all(&artifact.content)?;
        staging.as_file().sync_all()?;

        self.persist(staging, &artifact.filename)
    }

    fn persist(&self, mut staging: NamedTempFile, filename: &str) -> Result<PathBuf> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = self.dir.join(numbered_name(filename, attempt));
            match staging.persist_noclobber(&target) {
                Ok(_) => {
                    tracing::debug!(path = %target.display(), "artifact saved");
                    return Ok(target);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => staging = e.file,
                Err(e) => return Err(e.error.into()),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("{} の保存先名を決められません", filename),
        )
        .into())
    }
}

/// `outlet.stl` → `outlet (2).stl`
fn numbered_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", filename, n),
    }
}
