use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutletForgeError {
    #[error(transparent)]
    Common(#[from] outlet_forge_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("保存先フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Dialog(String),

    #[error("ダウンロードできる生成物がありません")]
    NoArtifact,
}

impl From<outlet_forge_common::ValidationError> for OutletForgeError {
    fn from(e: outlet_forge_common::ValidationError) -> Self {
        OutletForgeError::Common(e.into())
    }
}

impl OutletForgeError {
    /// 入力検証エラーか（ワークフローは進まずその場で再入力できる）
    pub fn validation(&self) -> Option<&outlet_forge_common::ValidationError> {
        match self {
            OutletForgeError::Common(outlet_forge_common::Error::Validation(e)) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutletForgeError>;
