//! ステージ → 画面の対応と、表示用の純粋なロジック
//!
//! UIフレームワークに依存しないので、CLIとWebの両方から使える。

use crate::stage::Stage;
use crate::workflow::{transition_for, WorkflowState};

/// raw base64 を表示するときのMIMEタイプ
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// ステージごとの画面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageView {
    /// ファイル選択（アップロード済みファイル一覧つき）
    FileIntake,
    /// 画像列ビューア
    ImageSequence {
        title: &'static str,
        description: &'static str,
    },
    /// 標題・正文エディタ
    TextEditor,
}

/// 現在のステージに対応する画面（ステージだけで決まる）
pub fn view_for(stage: Stage) -> StageView {
    match stage {
        Stage::Upload => StageView::FileIntake,
        Stage::Locate => StageView::ImageSequence {
            title: "作文定位结果",
            description: "已从上传的图片中定位出标题和正文区域",
        },
        Stage::Process => StageView::ImageSequence {
            title: "图像处理结果",
            description: "处理后的区域图片，将用于文字识别",
        },
        Stage::Ocr => StageView::TextEditor,
        Stage::Result => StageView::ImageSequence {
            title: "批改结果",
            description: "根据识别文本生成的批改图片",
        },
    }
}

/// ナビゲーションボタンの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControls {
    pub can_retreat: bool,
    pub can_advance: bool,
    pub can_reset: bool,
    pub advance_label: &'static str,
}

pub fn controls_for(state: &WorkflowState) -> NavControls {
    let stage = state.stage();
    let idle = !state.is_loading();

    let advance_label = if state.is_loading() {
        "处理中..."
    } else {
        match stage {
            Stage::Locate => "开始处理",
            Stage::Process => "文字识别",
            Stage::Ocr => "生成批改",
            _ => "下一步",
        }
    };

    NavControls {
        can_retreat: idle && stage.previous().is_some(),
        can_advance: idle && transition_for(stage).is_some(),
        can_reset: idle && stage == Stage::Result,
        advance_label,
    }
}

/// 画像ビューアのインデックス管理（前後は端で折り返す）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// 範囲外は無視
    pub fn jump(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// 画像数が変わったときに位置を調整
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    /// "n / total"
    pub fn label(&self) -> String {
        if self.len == 0 {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.index + 1, self.len)
    }
}

/// 画像文字列を <img src> に使えるdata URLにする
pub fn to_data_url(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:{};base64,{}", DEFAULT_IMAGE_MIME, image)
    }
}

/// data URLからbase64部分を取り出す（raw base64はそのまま）
pub fn strip_data_url(image: &str) -> &str {
    if image.starts_with("data:") {
        image.split_once(',').map(|(_, data)| data).unwrap_or("")
    } else {
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageEntry, OcrResult, UploadedFile};
    use crate::workflow::StageOutput;

    fn state_at_ocr() -> WorkflowState {
        let mut state = WorkflowState::new();
        state
            .complete_upload(vec![UploadedFile::new("a.jpg", vec![1])], vec![ImageEntry::new("a", 0)])
            .unwrap();
        let pending = state.begin_advance().unwrap().unwrap();
        state
            .finish_advance(&pending, Ok(StageOutput::Processed(vec![ImageEntry::new("p", 0)])))
            .unwrap();
        let pending = state.begin_advance().unwrap().unwrap();
        state
            .finish_advance(&pending, Ok(StageOutput::Recognized(OcrResult::new("T", "C"))))
            .unwrap();
        state
    }

    #[test]
    fn test_view_for_each_stage() {
        assert_eq!(view_for(Stage::Upload), StageView::FileIntake);
        assert_eq!(view_for(Stage::Ocr), StageView::TextEditor);
        for stage in [Stage::Locate, Stage::Process, Stage::Result] {
            assert!(matches!(view_for(stage), StageView::ImageSequence { .. }));
        }
    }

    #[test]
    fn test_controls_at_upload() {
        let controls = controls_for(&WorkflowState::new());
        assert!(!controls.can_retreat);
        assert!(!controls.can_advance);
        assert!(!controls.can_reset);
    }

    #[test]
    fn test_controls_at_ocr() {
        let controls = controls_for(&state_at_ocr());
        assert!(controls.can_retreat);
        assert!(controls.can_advance);
        assert!(!controls.can_reset);
        assert_eq!(controls.advance_label, "生成批改");
    }

    #[test]
    fn test_controls_disabled_while_loading() {
        let mut state = state_at_ocr();
        state.begin_advance().unwrap();

        let controls = controls_for(&state);
        assert!(!controls.can_retreat);
        assert!(!controls.can_advance);
        assert_eq!(controls.advance_label, "处理中...");
    }

    #[test]
    fn test_carousel_wraps() {
        let mut carousel = Carousel::new(3);
        carousel.prev();
        assert_eq!(carousel.index(), 2);
        carousel.next();
        assert_eq!(carousel.index(), 0);
        assert_eq!(carousel.label(), "1 / 3");
    }

    #[test]
    fn test_carousel_jump_and_resize() {
        let mut carousel = Carousel::new(3);
        carousel.jump(2);
        assert_eq!(carousel.label(), "3 / 3");
        carousel.jump(5);
        assert_eq!(carousel.index(), 2);

        carousel.resize(1);
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_carousel_empty() {
        let mut carousel = Carousel::new(0);
        carousel.next();
        carousel.prev();
        assert!(carousel.is_empty());
        assert_eq!(carousel.label(), "0 / 0");
    }

    #[test]
    fn test_data_url() {
        assert_eq!(to_data_url("aGk="), "data:image/jpeg;base64,aGk=");
        assert_eq!(to_data_url("data:image/png;base64,aGk="), "data:image/png;base64,aGk=");
        assert_eq!(strip_data_url("data:image/png;base64,aGk="), "aGk=");
        assert_eq!(strip_data_url("aGk="), "aGk=");
    }
}
