//! 全ステージの一括実行と結果の書き出し
//!
//! upload → locate → process → ocr → (確認) → result の順に共通エンジンを進める。

use crate::error::{EssayGraderError, Result};
use crate::review::{ReviewDecision, Reviewer};
use base64::Engine as _;
use essay_grader_common::{
    strip_data_url, Error as WorkflowError, Stage, Transport, UploadedFile, Workflow,
    WorkflowState,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 書き出したファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub results: Vec<PathBuf>,
    pub ocr: Option<PathBuf>,
    pub workflow: PathBuf,
}

/// 通信・レスポンス起因の失敗だけ再試行の対象にする
fn is_retryable(error: &WorkflowError) -> bool {
    matches!(
        error,
        WorkflowError::Transport(_) | WorkflowError::Remote { .. } | WorkflowError::Shape(_)
    )
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// ファイルを送信して locate まで進める
async fn upload_step<T: Transport, R: Reviewer>(
    workflow: &mut Workflow<T>,
    files: &[UploadedFile],
    reviewer: &mut R,
) -> Result<()> {
    loop {
        let bar = spinner(format!("[1/4] {}枚をアップロードして定位中...", files.len()));
        match workflow.upload(files.to_vec()).await {
            Ok(_) => {
                bar.finish_and_clear();
                println!(
                    "✔ 定位完了: {}領域",
                    workflow.state().locate_results().len()
                );
                return Ok(());
            }
            Err(e) => {
                bar.finish_and_clear();
                if !(is_retryable(&e) && reviewer.retry(Stage::Locate, &e)?) {
                    return Err(e.into());
                }
            }
        }
    }
}

/// 1ステージ進める（失敗時は Reviewer に再試行を確認）
async fn advance_step<T: Transport, R: Reviewer>(
    workflow: &mut Workflow<T>,
    reviewer: &mut R,
    step: usize,
) -> Result<Stage> {
    let target = workflow
        .state()
        .stage()
        .next()
        .unwrap_or(Stage::Result);

    loop {
        let bar = spinner(format!("[{}/4] {}中...", step, target.label()));
        match workflow.advance().await {
            Ok(Some(stage)) => {
                bar.finish_and_clear();
                println!("✔ {}完了", stage.label());
                return Ok(stage);
            }
            Ok(None) => {
                bar.finish_and_clear();
                return Ok(workflow.state().stage());
            }
            Err(e) => {
                bar.finish_and_clear();
                if !(is_retryable(&e) && reviewer.retry(target, &e)?) {
                    return Err(e.into());
                }
            }
        }
    }
}

/// 全ステージを実行する
///
/// 途中で失敗した場合もエンジンの状態は最後に成功したステージのまま残る。
pub async fn run_pipeline<T: Transport, R: Reviewer>(
    workflow: &mut Workflow<T>,
    files: &[UploadedFile],
    reviewer: &mut R,
) -> Result<()> {
    upload_step(workflow, files, reviewer).await?;
    advance_step(workflow, reviewer, 2).await?;
    advance_step(workflow, reviewer, 3).await?;

    loop {
        let ocr = workflow
            .state()
            .ocr_results()
            .cloned()
            .ok_or_else(|| EssayGraderError::CliExecution("OCR結果がありません".into()))?;

        match reviewer.review(&ocr)? {
            ReviewDecision::Accept => break,
            ReviewDecision::Edit(edited) => {
                workflow.save_ocr(edited)?;
                println!("✔ 修正を保存しました");
            }
            ReviewDecision::Rerun => {
                workflow.retreat()?;
                advance_step(workflow, reviewer, 3).await?;
            }
        }
    }

    advance_step(workflow, reviewer, 4).await?;
    Ok(())
}

/// 既定の出力フォルダ名
pub fn default_output_dir() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("essay-grader-{}", stamp))
}

/// 状態を出力フォルダに書き出す
///
/// - `result_N.jpg`: 批改画像（base64をデコード）
/// - `ocr.json`: OCR結果（修正後）
/// - `workflow.json`: ファイル情報とステージごとの結果
pub fn write_outputs(state: &WorkflowState, output_dir: &Path) -> Result<OutputFiles> {
    std::fs::create_dir_all(output_dir)?;

    let mut results = Vec::new();
    for (i, entry) in state.final_results().iter().enumerate() {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(strip_data_url(&entry.image).trim())
            .map_err(|e| EssayGraderError::OutputDecode(format!("result_{}: {}", i + 1, e)))?;
        let path = output_dir.join(format!("result_{}.jpg", i + 1));
        std::fs::write(&path, bytes)?;
        results.push(path);
    }

    let ocr = match state.ocr_results() {
        Some(ocr) => {
            let path = output_dir.join("ocr.json");
            std::fs::write(&path, serde_json::to_string_pretty(ocr)?)?;
            Some(path)
        }
        None => None,
    };

    let workflow = output_dir.join("workflow.json");
    std::fs::write(&workflow, serde_json::to_string_pretty(state)?)?;

    tracing::info!(dir = %output_dir.display(), results = results.len(), "outputs written");
    Ok(OutputFiles {
        results,
        ocr,
        workflow,
    })
}
