//! ワークフローで受け渡す型の定義
//!
//! - UploadedFile: ユーザーが選択した作文画像
//! - ImageEntry: 定位・処理・渲染ステージの出力（画像 + 分類ラベル）
//! - OcrResult: OCRステージの出力（標題 + 正文）

use serde::{Deserialize, Serialize};

/// 標題領域の分類ラベル
pub const TITLE_CLASS: i64 = 0;
/// 正文領域の分類ラベル
pub const CONTENT_CLASS: i64 = 1;
/// 渲染結果に付与する固定ラベル
pub const RENDERED_CLASS: i64 = 2;

/// アップロード対象のファイル
///
/// 選択後は不変。ワークフローはアップロード成功ごとに集合ごと置き換える。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_type_for(&name).to_string();
        Self {
            size: content.len() as u64,
            name,
            mime_type,
            content,
        }
    }

    /// ファイル名の拡張子（小文字、ドット付き）
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_lowercase()))
    }

    /// MB単位のサイズ（表示用）
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

/// 拡張子からMIMEタイプを推定
pub fn mime_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// 画像 + 分類ラベル
///
/// `image` はbase64文字列（data URLの場合もある）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub image: String,
    pub class: i64,
}

impl ImageEntry {
    pub fn new(image: impl Into<String>, class: i64) -> Self {
        Self {
            image: image.into(),
            class,
        }
    }

    /// 分類ラベルの表示名
    pub fn class_label(&self) -> &'static str {
        match self.class {
            TITLE_CLASS => "标题",
            CONTENT_CLASS => "正文",
            RENDERED_CLASS => "批改结果",
            _ => "未知区域",
        }
    }
}

/// 定位ステージの出力
pub type LocateResult = ImageEntry;
/// 処理ステージの出力
pub type ProcessResult = ImageEntry;
/// 渲染ステージの出力
pub type FinalResult = ImageEntry;

/// OCRステージの出力
///
/// 必須フィールドのみ（欠落時はデシリアライズ失敗）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    pub title: String,
    pub content: String,
}

/// OCR結果の編集対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrField {
    Title,
    Content,
}

impl OcrResult {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn field(&self, field: OcrField) -> &str {
        match field {
            OcrField::Title => &self.title,
            OcrField::Content => &self.content,
        }
    }

    /// 1フィールドだけ差し替えた新しい値を返す
    pub fn with_field(&self, field: OcrField, value: impl Into<String>) -> Self {
        let mut edited = self.clone();
        match field {
            OcrField::Title => edited.title = value.into(),
            OcrField::Content => edited.content = value.into(),
        }
        edited
    }

    /// 正文を段落に分割（空行は除外）
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_file_new() {
        let file = UploadedFile::new("essay.JPG", vec![0u8; 2048]);
        assert_eq!(file.size, 2048);
        assert_eq!(file.mime_type, "image/jpeg");
        assert_eq!(file.extension().as_deref(), Some(".jpg"));
    }

    #[test]
    fn test_uploaded_file_without_extension() {
        let file = UploadedFile::new("scan", vec![1, 2, 3]);
        assert_eq!(file.extension(), None);
        assert_eq!(file.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_uploaded_file_content_not_serialized() {
        let file = UploadedFile::new("a.png", vec![9; 16]);
        let json = serde_json::to_string(&file).expect("シリアライズ失敗");
        assert!(json.contains("\"mimeType\":\"image/png\""));
        assert!(!json.contains("content"));
    }

    #[test]
    fn test_image_entry_deserialize() {
        let json = r#"[{"image": "aGVsbG8=", "class": 0}, {"image": "d29ybGQ=", "class": 1}]"#;
        let entries: Vec<ImageEntry> = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].class_label(), "标题");
        assert_eq!(entries[1].class_label(), "正文");
    }

    #[test]
    fn test_image_entry_missing_class_is_error() {
        let json = r#"{"image": "aGVsbG8="}"#;
        assert!(serde_json::from_str::<ImageEntry>(json).is_err());
    }

    #[test]
    fn test_ocr_result_requires_both_fields() {
        assert!(serde_json::from_str::<OcrResult>(r#"{"title": "T"}"#).is_err());
        let ocr: OcrResult = serde_json::from_str(r#"{"title": "T", "content": "C"}"#).unwrap();
        assert_eq!(ocr, OcrResult::new("T", "C"));
    }

    #[test]
    fn test_ocr_with_field_leaves_original() {
        let original = OcrResult::new("T", "C");
        let edited = original.with_field(OcrField::Title, "T2");
        assert_eq!(edited.title, "T2");
        assert_eq!(edited.content, "C");
        assert_eq!(original.title, "T");
    }

    #[test]
    fn test_ocr_paragraphs() {
        let ocr = OcrResult::new("春天", "第一段\n\n  第二段  \r\n第三段");
        assert_eq!(ocr.paragraphs(), vec!["第一段", "第二段", "第三段"]);
    }
}
