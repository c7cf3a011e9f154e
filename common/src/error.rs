//! エラー型定義

use crate::stage::Stage;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// ネットワーク障害など、レスポンスを受け取れなかった場合
    #[error("Transport error: {0}")]
    Transport(String),

    /// 非2xx、またはエンベロープの code が 0 以外
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// レスポンスの形が想定と異なる
    #[error("Unexpected response: {0}")]
    Shape(String),

    #[error("Cannot {action} at stage {stage}")]
    InvalidTransition { stage: Stage, action: &'static str },

    #[error("File rejected: {name}: {reason}")]
    FileRejected { name: String, reason: String },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_remote() {
        let error = Error::Remote {
            status: 500,
            message: "OCR Error".to_string(),
        };
        assert_eq!(format!("{}", error), "Remote error (500): OCR Error");
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let error = Error::InvalidTransition {
            stage: Stage::Upload,
            action: "advance",
        };
        assert_eq!(format!("{}", error), "Cannot advance at stage upload");
    }

    #[test]
    fn test_error_display_file_rejected() {
        let error = Error::FileRejected {
            name: "big.jpg".to_string(),
            reason: "文件大小超过5MB限制".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("big.jpg"));
        assert!(display.contains("5MB"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }
}
