//! ワークフロー状態と遷移エンジン
//!
//! 状態は `WorkflowState` 1つに集約し、変更はこのモジュールの操作だけで行う。
//! 前進は「開始（begin_advance）→ アダプタ実行 → 確定（finish_advance）」に
//! 分かれており、UI側はリアクティブな状態を保持したまま非同期呼び出しを挟める。
//! ヘッドレス用途では `Workflow::advance` がこの3段をまとめて実行する。

use crate::adapters;
use crate::config::WorkflowConfig;
use crate::error::{Error, Result};
use crate::remote::Transport;
use crate::stage::Stage;
use crate::types::{FinalResult, ImageEntry, LocateResult, OcrResult, ProcessResult, UploadedFile};
use serde::{Deserialize, Serialize};

/// 前進に使うアダプタ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Process,
    Recognize,
    Render,
}

/// 遷移表: (現在のステージ, アダプタ, 次のステージ)
///
/// upload からの前進はアップロード完了ハンドラが担うため表に含めない。
const TRANSITIONS: [(Stage, Adapter, Stage); 3] = [
    (Stage::Locate, Adapter::Process, Stage::Process),
    (Stage::Process, Adapter::Recognize, Stage::Ocr),
    (Stage::Ocr, Adapter::Render, Stage::Result),
];

/// 現在のステージから (アダプタ, 次のステージ) を引く
pub fn transition_for(stage: Stage) -> Option<(Adapter, Stage)> {
    TRANSITIONS
        .iter()
        .find(|(from, _, _)| *from == stage)
        .map(|(_, adapter, to)| (*adapter, *to))
}

/// アダプタへの入力（現在ステージの結果の複製）
#[derive(Debug, Clone, PartialEq)]
pub enum StageRequest {
    Process(Vec<LocateResult>),
    Recognize(Vec<ProcessResult>),
    Render(OcrResult),
}

/// アダプタの出力
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Processed(Vec<ProcessResult>),
    Recognized(OcrResult),
    Rendered(Vec<FinalResult>),
}

impl StageRequest {
    /// アダプタを実行（状態には触れない）
    pub async fn execute<T: Transport>(
        &self,
        transport: &T,
        config: &WorkflowConfig,
    ) -> Result<StageOutput> {
        let endpoints = &config.endpoints;
        match self {
            StageRequest::Process(regions) => {
                adapters::process(transport, endpoints, config.process_mode, regions)
                    .await
                    .map(StageOutput::Processed)
            }
            StageRequest::Recognize(images) => adapters::recognize(transport, endpoints, images)
                .await
                .map(StageOutput::Recognized),
            StageRequest::Render(ocr) => adapters::render(transport, endpoints, ocr)
                .await
                .map(StageOutput::Rendered),
        }
    }
}

/// 実行中の前進
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAdvance {
    pub from: Stage,
    pub to: Stage,
    pub request: StageRequest,
}

/// ワークフロー全体の状態
///
/// 現在のステージに対応する結果だけが「表示中」で、それ以前の結果も
/// 戻る操作のために保持する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    stage: Stage,
    uploaded_files: Vec<UploadedFile>,
    locate_results: Vec<LocateResult>,
    process_results: Vec<ProcessResult>,
    ocr_results: Option<OcrResult>,
    final_results: Vec<FinalResult>,
    is_loading: bool,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn uploaded_files(&self) -> &[UploadedFile] {
        &self.uploaded_files
    }

    pub fn locate_results(&self) -> &[LocateResult] {
        &self.locate_results
    }

    pub fn process_results(&self) -> &[ProcessResult] {
        &self.process_results
    }

    pub fn ocr_results(&self) -> Option<&OcrResult> {
        self.ocr_results.as_ref()
    }

    pub fn final_results(&self) -> &[FinalResult] {
        &self.final_results
    }

    /// 現在のステージで表示する画像列（画像ステージ以外は空）
    pub fn current_images(&self) -> &[ImageEntry] {
        match self.stage {
            Stage::Locate => &self.locate_results,
            Stage::Process => &self.process_results,
            Stage::Result => &self.final_results,
            Stage::Upload | Stage::Ocr => &[],
        }
    }

    /// アップロード完了: ファイルと定位結果を同時に反映して locate へ進む
    ///
    /// 後続ステージの結果は別のファイルに対するものなので破棄する。
    /// アップロードを受け付けられるか（処理中は false、upload 以外はエラー）
    pub fn accepts_upload(&self) -> Result<bool> {
        if self.is_loading {
            tracing::debug!("upload ignored while a transition is in flight");
            return Ok(false);
        }
        if self.stage != Stage::Upload {
            return Err(Error::InvalidTransition {
                stage: self.stage,
                action: "complete upload",
            });
        }
        Ok(true)
    }

    pub fn complete_upload(
        &mut self,
        files: Vec<UploadedFile>,
        locate_results: Vec<LocateResult>,
    ) -> Result<Option<Stage>> {
        if !self.accepts_upload()? {
            return Ok(None);
        }

        tracing::info!(files = files.len(), regions = locate_results.len(), "upload completed");
        *self = Self {
            stage: Stage::Locate,
            uploaded_files: files,
            locate_results,
            ..Self::default()
        };
        Ok(Some(Stage::Locate))
    }

    /// 前進を開始する
    ///
    /// - 実行中なら何もせず `Ok(None)`
    /// - 遷移表にないステージなら `Error::InvalidTransition`
    /// - それ以外は `is_loading` を立て、入力の複製を返す
    pub fn begin_advance(&mut self) -> Result<Option<PendingAdvance>> {
        if self.is_loading {
            tracing::debug!(stage = %self.stage, "advance ignored: transition in flight");
            return Ok(None);
        }

        let Some((adapter, to)) = transition_for(self.stage) else {
            tracing::warn!(stage = %self.stage, "advance rejected: no forward transition");
            return Err(Error::InvalidTransition {
                stage: self.stage,
                action: "advance",
            });
        };

        let request = match adapter {
            Adapter::Process => StageRequest::Process(self.locate_results.clone()),
            Adapter::Recognize => StageRequest::Recognize(self.process_results.clone()),
            Adapter::Render => {
                let ocr = self.ocr_results.clone().ok_or_else(|| {
                    Error::Shape("no OCR result to render".into())
                })?;
                StageRequest::Render(ocr)
            }
        };

        self.is_loading = true;
        tracing::info!(from = %self.stage, to = %to, "advance started");
        Ok(Some(PendingAdvance {
            from: self.stage,
            to,
            request,
        }))
    }

    /// 前進を確定する
    ///
    /// 成功時のみ次ステージの結果とステージを更新する。失敗時はフラグだけを
    /// 下ろしてエラーを返すので、同じ入力で再度 `begin_advance` できる。
    /// この遷移を待っていない状態に届いた結果は無視する。
    pub fn finish_advance(
        &mut self,
        pending: &PendingAdvance,
        outcome: Result<StageOutput>,
    ) -> Result<Option<Stage>> {
        if !self.is_loading || self.stage != pending.from {
            tracing::debug!(from = %pending.from, "stale stage result ignored");
            return Ok(None);
        }
        self.is_loading = false;

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(from = %pending.from, error = %e, "advance failed");
                return Err(e);
            }
        };

        match (pending.to, output) {
            (Stage::Process, StageOutput::Processed(results)) => self.process_results = results,
            (Stage::Ocr, StageOutput::Recognized(ocr)) => self.ocr_results = Some(ocr),
            (Stage::Result, StageOutput::Rendered(results)) => self.final_results = results,
            (to, _) => {
                return Err(Error::Shape(format!("output does not match stage {}", to)));
            }
        }

        self.stage = pending.to;
        tracing::info!(stage = %self.stage, "advance committed");
        Ok(Some(self.stage))
    }

    /// 1つ前のステージへ戻る（通信なし、結果は保持）
    pub fn retreat(&mut self) -> Result<Option<Stage>> {
        if self.is_loading {
            return Ok(None);
        }
        let Some(previous) = self.stage.previous() else {
            return Err(Error::InvalidTransition {
                stage: self.stage,
                action: "retreat",
            });
        };
        self.stage = previous;
        Ok(Some(previous))
    }

    /// result ステージから初期状態へ戻す
    pub fn reset(&mut self) -> Result<Option<Stage>> {
        if self.is_loading {
            return Ok(None);
        }
        if self.stage != Stage::Result {
            return Err(Error::InvalidTransition {
                stage: self.stage,
                action: "reset",
            });
        }
        *self = Self::default();
        Ok(Some(Stage::Upload))
    }

    /// 手動修正したOCR結果を保存する（ocr ステージのみ）
    ///
    /// 値は丸ごと差し替える。送信済みの値は変更されない。
    pub fn save_ocr(&mut self, edited: OcrResult) -> Result<bool> {
        if self.is_loading {
            return Ok(false);
        }
        if self.stage != Stage::Ocr {
            return Err(Error::InvalidTransition {
                stage: self.stage,
                action: "edit OCR text",
            });
        }
        self.ocr_results = Some(edited);
        Ok(true)
    }
}

/// 状態・トランスポート・設定をまとめたヘッドレス用エンジン
pub struct Workflow<T> {
    state: WorkflowState,
    transport: T,
    config: WorkflowConfig,
}

impl<T: Transport> Workflow<T> {
    pub fn new(transport: T, config: WorkflowConfig) -> Self {
        Self {
            state: WorkflowState::new(),
            transport,
            config,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// ファイルを検証してアップロードし、locate へ進む
    pub async fn upload(&mut self, files: Vec<UploadedFile>) -> Result<Option<Stage>> {
        if !self.state.accepts_upload()? {
            return Ok(None);
        }
        let (accepted, rejected) = crate::validation::validate_files(files, &self.config.upload);
        if let Some(first) = rejected.into_iter().next() {
            return Err(Error::FileRejected {
                name: first.name,
                reason: first.reason,
            });
        }

        let regions =
            adapters::locate(&self.transport, &self.config.endpoints, &accepted).await?;
        self.state.complete_upload(accepted, regions)
    }

    pub async fn advance(&mut self) -> Result<Option<Stage>> {
        let Some(pending) = self.state.begin_advance()? else {
            return Ok(None);
        };
        let outcome = pending.request.execute(&self.transport, &self.config).await;
        self.state.finish_advance(&pending, outcome)
    }

    pub fn retreat(&mut self) -> Result<Option<Stage>> {
        self.state.retreat()
    }

    pub fn reset(&mut self) -> Result<Option<Stage>> {
        self.state.reset()
    }

    pub fn save_ocr(&mut self, edited: OcrResult) -> Result<bool> {
        self.state.save_ocr(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RawResponse, RemoteCall};
    use crate::types::RENDERED_CLASS;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 台本どおりに応答するトランスポート
    #[derive(Default)]
    struct Scripted {
        responses: Mutex<VecDeque<Result<RawResponse>>>,
        sent: Mutex<Vec<RemoteCall>>,
    }

    impl Scripted {
        fn reply(self, body: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(RawResponse::ok(body.to_string())));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(Error::Transport(message.to_string())));
            self
        }

        fn sent(&self) -> Vec<RemoteCall> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for Scripted {
        async fn send(&self, call: &RemoteCall) -> Result<RawResponse> {
            self.sent.lock().unwrap().push(call.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("no scripted response".into())))
        }
    }

    fn two_files() -> Vec<UploadedFile> {
        vec![
            UploadedFile::new("p1.jpg", vec![1; 8]),
            UploadedFile::new("p2.jpg", vec![2; 8]),
        ]
    }

    fn located() -> Value {
        json!({"code": 0, "payload": [{"image": "a", "class": 1}, {"image": "b", "class": 2}]})
    }

    async fn at_stage(transport: Scripted, stage: Stage) -> Workflow<Scripted> {
        let mut workflow = Workflow::new(transport, WorkflowConfig::default());
        workflow.upload(two_files()).await.unwrap();
        while workflow.state().stage() < stage {
            workflow.advance().await.unwrap();
        }
        workflow
    }

    // =============================================
    // 遷移表
    // =============================================

    #[test]
    fn test_transition_table() {
        assert_eq!(transition_for(Stage::Upload), None);
        assert_eq!(transition_for(Stage::Locate), Some((Adapter::Process, Stage::Process)));
        assert_eq!(transition_for(Stage::Process), Some((Adapter::Recognize, Stage::Ocr)));
        assert_eq!(transition_for(Stage::Ocr), Some((Adapter::Render, Stage::Result)));
        assert_eq!(transition_for(Stage::Result), None);
    }

    #[test]
    fn test_advance_rejected_outside_table() {
        let mut state = WorkflowState::new();
        let err = state.begin_advance().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition { stage: Stage::Upload, action: "advance" }
        ));
        assert_eq!(state, WorkflowState::new());
    }

    // =============================================
    // アップロード
    // =============================================

    #[test]
    fn test_complete_upload_sets_files_and_regions_together() {
        let mut state = WorkflowState::new();
        let regions = vec![ImageEntry::new("a", 1)];
        let stage = state.complete_upload(two_files(), regions.clone()).unwrap();

        assert_eq!(stage, Some(Stage::Locate));
        assert_eq!(state.stage(), Stage::Locate);
        assert_eq!(state.uploaded_files().len(), 2);
        assert_eq!(state.locate_results(), regions.as_slice());
        assert_eq!(state.current_images(), regions.as_slice());
    }

    #[test]
    fn test_complete_upload_only_at_upload_stage() {
        let mut state = WorkflowState::new();
        state.complete_upload(two_files(), vec![]).unwrap();
        assert!(state.complete_upload(two_files(), vec![]).is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_files_without_network() {
        let mut workflow = Workflow::new(Scripted::default(), WorkflowConfig::default());
        let err = workflow
            .upload(vec![UploadedFile::new("notes.txt", vec![0; 4])])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::FileRejected { .. }));
        assert!(workflow.transport().sent().is_empty());
        assert_eq!(workflow.state().stage(), Stage::Upload);
    }

    #[tokio::test]
    async fn test_upload_outside_upload_stage_sends_nothing() {
        let server = Scripted::default().reply(json!([{"image": "t", "class": 0}]));
        let mut workflow = Workflow::new(server, WorkflowConfig::default());
        workflow.upload(two_files()).await.unwrap();
        assert_eq!(workflow.transport().sent().len(), 1);

        let err = workflow.upload(two_files()).await.unwrap_err();

        assert!(matches!(err, Error::InvalidTransition { stage: Stage::Locate, .. }));
        assert_eq!(workflow.transport().sent().len(), 1);
        assert_eq!(workflow.state().locate_results().len(), 1);
    }

    // =============================================
    // 前進
    // =============================================

    #[tokio::test]
    async fn test_locate_to_process_scenario() {
        let transport = Scripted::default()
            .reply(located())
            .reply(json!({"code": 0, "payload": ["processed_a", "processed_b"]}));
        let mut workflow = at_stage(transport, Stage::Locate).await;

        let stage = workflow.advance().await.unwrap();
        assert_eq!(stage, Some(Stage::Process));
        assert_eq!(
            workflow.state().process_results(),
            &[ImageEntry::new("processed_a", 1), ImageEntry::new("processed_b", 2)]
        );
        assert!(!workflow.state().is_loading());
    }

    #[tokio::test]
    async fn test_failed_advance_keeps_state_and_allows_retry() {
        let transport = Scripted::default()
            .reply(located())
            .fail("connection refused")
            .reply(json!(["pa", "pb"]));
        let mut workflow = at_stage(transport, Stage::Locate).await;
        let before = workflow.state().clone();

        let err = workflow.advance().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(workflow.state(), &before);
        assert_eq!(workflow.state().stage(), Stage::Locate);
        assert!(!workflow.state().is_loading());

        // 同じ入力で再試行できる
        let stage = workflow.advance().await.unwrap();
        assert_eq!(stage, Some(Stage::Process));
        let sent = workflow.transport().sent();
        assert_eq!(sent[1].json_body(), sent[2].json_body());
        assert_eq!(sent[2].json_body(), Some(&json!({"images": ["a", "b"]})));
    }

    #[tokio::test]
    async fn test_malformed_response_does_not_commit() {
        let transport = Scripted::default()
            .reply(located())
            .reply(json!({"code": 0, "payload": ["only_one"]}));
        let mut workflow = at_stage(transport, Stage::Locate).await;

        assert!(matches!(workflow.advance().await, Err(Error::Shape(_))));
        assert_eq!(workflow.state().stage(), Stage::Locate);
        assert!(workflow.state().process_results().is_empty());
    }

    #[test]
    fn test_second_begin_while_loading_is_noop() {
        let mut state = WorkflowState::new();
        state
            .complete_upload(two_files(), vec![ImageEntry::new("a", 1)])
            .unwrap();

        let pending = state.begin_advance().unwrap();
        assert!(pending.is_some());
        assert!(state.is_loading());

        let snapshot = state.clone();
        assert_eq!(state.begin_advance().unwrap(), None);
        assert_eq!(state, snapshot);

        // 実行中は戻る・リセットも受け付けない
        assert_eq!(state.retreat().unwrap(), None);
        assert_eq!(state.reset().unwrap(), None);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_stale_result_ignored() {
        let mut state = WorkflowState::new();
        state
            .complete_upload(two_files(), vec![ImageEntry::new("a", 1)])
            .unwrap();
        let pending = state.begin_advance().unwrap().unwrap();

        let output = StageOutput::Processed(vec![ImageEntry::new("p", 1)]);
        assert_eq!(
            state.finish_advance(&pending, Ok(output.clone())).unwrap(),
            Some(Stage::Process)
        );

        // 2回目の確定は待機中でないので無視される
        let snapshot = state.clone();
        assert_eq!(state.finish_advance(&pending, Ok(output)).unwrap(), None);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_mismatched_output_not_committed() {
        let mut state = WorkflowState::new();
        state
            .complete_upload(two_files(), vec![ImageEntry::new("a", 1)])
            .unwrap();
        let pending = state.begin_advance().unwrap().unwrap();

        let outcome = Ok(StageOutput::Recognized(OcrResult::new("T", "C")));
        assert!(state.finish_advance(&pending, outcome).is_err());
        assert_eq!(state.stage(), Stage::Locate);
        assert!(!state.is_loading());
        assert!(state.ocr_results().is_none());
    }

    // =============================================
    // 戻る・リセット
    // =============================================

    #[tokio::test]
    async fn test_retreat_then_advance_reissues_call() {
        let transport = Scripted::default()
            .reply(located())
            .reply(json!(["first_a", "first_b"]))
            .reply(json!(["second_a", "second_b"]));
        let mut workflow = at_stage(transport, Stage::Process).await;

        assert_eq!(workflow.retreat().unwrap(), Some(Stage::Locate));
        // 離れたステージの結果は保持される
        assert_eq!(workflow.state().process_results()[0].image, "first_a");

        workflow.advance().await.unwrap();
        assert_eq!(workflow.transport().sent().len(), 3);
        assert_eq!(workflow.state().process_results()[0].image, "second_a");
    }

    #[test]
    fn test_retreat_at_upload_rejected() {
        let mut state = WorkflowState::new();
        assert!(matches!(
            state.retreat(),
            Err(Error::InvalidTransition { action: "retreat", .. })
        ));
    }

    #[tokio::test]
    async fn test_reset_from_result_returns_initial_state() {
        let transport = Scripted::default()
            .reply(located())
            .reply(json!(["pa", "pb"]))
            .reply(json!({"title": "T", "content": "C"}))
            .reply(json!({"code": 0, "payload": "rendered"}));
        let mut workflow = at_stage(transport, Stage::Result).await;
        assert_eq!(
            workflow.state().final_results(),
            &[ImageEntry::new("rendered", RENDERED_CLASS)]
        );

        assert_eq!(workflow.reset().unwrap(), Some(Stage::Upload));
        assert_eq!(workflow.state(), &WorkflowState::new());
    }

    #[test]
    fn test_reset_only_at_result() {
        let mut state = WorkflowState::new();
        assert!(state.reset().is_err());
    }

    // =============================================
    // OCR 手動修正
    // =============================================

    #[tokio::test]
    async fn test_edited_title_sent_to_render() {
        let transport = Scripted::default()
            .reply(located())
            .reply(json!(["pa", "pb"]))
            .reply(json!({"title": "T", "content": "C"}))
            .reply(json!("rendered"));
        let mut workflow = at_stage(transport, Stage::Ocr).await;

        let current = workflow.state().ocr_results().cloned().unwrap();
        let edited = current.with_field(crate::types::OcrField::Title, "T2");
        assert!(workflow.save_ocr(edited).unwrap());
        assert_eq!(workflow.state().ocr_results(), Some(&OcrResult::new("T2", "C")));

        workflow.advance().await.unwrap();
        let sent = workflow.transport().sent();
        assert_eq!(
            sent.last().unwrap().json_body(),
            Some(&json!({"title": "T2", "content": "C"}))
        );
        assert_eq!(workflow.state().stage(), Stage::Result);
    }

    #[test]
    fn test_save_ocr_outside_ocr_stage() {
        let mut state = WorkflowState::new();
        assert!(state.save_ocr(OcrResult::new("T", "C")).is_err());
    }
}
