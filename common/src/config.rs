//! ワークフロー設定
//!
//! エンドポイント、処理ステージの挙動、アップロード制限をまとめる

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// 各ステージのエンドポイント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    pub base_url: String,
    pub locate: String,
    pub process: String,
    pub ocr: String,
    pub render: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl Endpoints {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            locate: "/locate".into(),
            process: "/process".into(),
            ocr: "/ocr/bee".into(),
            render: "/evaluate/render".into(),
        }
    }

    pub fn locate_url(&self) -> String {
        join_url(&self.base_url, &self.locate)
    }

    pub fn process_url(&self) -> String {
        join_url(&self.base_url, &self.process)
    }

    pub fn ocr_url(&self) -> String {
        join_url(&self.base_url, &self.ocr)
    }

    pub fn render_url(&self) -> String {
        join_url(&self.base_url, &self.render)
    }
}

/// ベースURLとパスを結合（絶対URLのパスはそのまま）
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        return format!("/{}", path);
    }
    format!("{}/{}", base, path)
}

/// 処理ステージの出力方針
///
/// 処理エンドポイントが画像を加工するのか、注釈だけなのかは
/// サーバー側の実装次第なので設定で切り替える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessMode {
    /// 処理済み画像で差し替え、分類ラベルは入力側を維持
    #[default]
    ReplaceImage,
    /// 呼び出しは行うが入力エントリをそのまま次へ渡す
    KeepOriginal,
}

impl fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessMode::ReplaceImage => write!(f, "replace-image"),
            ProcessMode::KeepOriginal => write!(f, "keep-original"),
        }
    }
}

impl FromStr for ProcessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace-image" | "replace" => Ok(ProcessMode::ReplaceImage),
            "keep-original" | "keep" => Ok(ProcessMode::KeepOriginal),
            _ => Err(format!(
                "Unknown process mode: {}. Use replace-image or keep-original",
                s
            )),
        }
    }
}

/// アップロード時のファイル制限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadPolicy {
    pub max_size_mb: u64,
    /// 受け付ける拡張子（小文字、ドット付き）。空なら全種類
    pub accept: Vec<String>,
    pub multiple: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 5,
            accept: vec![".jpg".into(), ".jpeg".into(), ".png".into()],
            multiple: true,
        }
    }
}

impl UploadPolicy {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    /// `<input accept=...>` 用の文字列
    pub fn accept_attr(&self) -> String {
        self.accept.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowConfig {
    pub endpoints: Endpoints,
    pub process_mode: ProcessMode,
    pub upload: UploadPolicy,
}
