use thiserror::Error;

#[derive(Error, Debug)]
pub enum EssayGraderError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("HTTPクライアントエラー: {0}")]
    Http(String),

    #[error("結果画像のデコードに失敗: {0}")]
    OutputDecode(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Workflow(#[from] essay_grader_common::Error),
}

pub type Result<T> = std::result::Result<T, EssayGraderError>;
