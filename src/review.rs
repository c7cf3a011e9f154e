//! 対話式のOCR確認・再試行
//!
//! パイプラインは `Reviewer` 経由で利用者に判断を求める。
//! 非対話モードでは `AutoApprove` がすべて確定・再試行なしで応答する。

use crate::error::{EssayGraderError, Result};
use dialoguer::{Confirm, Editor, Input, Select};
use essay_grader_common::{Error as WorkflowError, OcrField, OcrResult, Stage};

/// OCR結果に対する利用者の判断
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// このまま批改へ進む
    Accept,
    /// 修正した結果を保存して再確認
    Edit(OcrResult),
    /// 処理済み画像から再度OCR
    Rerun,
}

pub trait Reviewer {
    fn review(&mut self, ocr: &OcrResult) -> Result<ReviewDecision>;

    /// ステージ失敗時に再試行するか
    fn retry(&mut self, stage: Stage, error: &WorkflowError) -> Result<bool>;
}

/// 確認なしで進める
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl Reviewer for AutoApprove {
    fn review(&mut self, _ocr: &OcrResult) -> Result<ReviewDecision> {
        Ok(ReviewDecision::Accept)
    }

    fn retry(&mut self, _stage: Stage, _error: &WorkflowError) -> Result<bool> {
        Ok(false)
    }
}

/// dialoguer で確認する
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptReviewer;

const ACTIONS: [&str; 4] = ["确认并生成批改", "修改标题", "修改正文", "重新识别"];

impl Reviewer for PromptReviewer {
    fn review(&mut self, ocr: &OcrResult) -> Result<ReviewDecision> {
        print_ocr(ocr);

        let choice = Select::new()
            .with_prompt("识别结果")
            .items(&ACTIONS)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        match choice {
            0 => Ok(ReviewDecision::Accept),
            1 => {
                let title: String = Input::new()
                    .with_prompt("标题")
                    .with_initial_text(ocr.title.clone())
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_error)?;
                Ok(ReviewDecision::Edit(ocr.with_field(OcrField::Title, title.trim())))
            }
            2 => {
                // エディタを保存せずに閉じた場合は元のまま
                let content = Editor::new()
                    .edit(&ocr.content)
                    .map_err(prompt_error)?
                    .unwrap_or_else(|| ocr.content.clone());
                Ok(ReviewDecision::Edit(ocr.with_field(OcrField::Content, content.trim_end())))
            }
            _ => Ok(ReviewDecision::Rerun),
        }
    }

    fn retry(&mut self, stage: Stage, error: &WorkflowError) -> Result<bool> {
        println!("  ✗ {}失败: {}", stage.label(), error);
        Confirm::new()
            .with_prompt("是否重试？")
            .default(true)
            .interact()
            .map_err(prompt_error)
    }
}

fn print_ocr(ocr: &OcrResult) {
    println!("---");
    println!("标题: {}", ocr.title);
    for (i, paragraph) in ocr.paragraphs().iter().enumerate() {
        println!("  [{}] {}", i + 1, paragraph);
    }
    println!("---");
}

fn prompt_error(e: dialoguer::Error) -> EssayGraderError {
    EssayGraderError::CliExecution(e.to_string())
}
