//! メインアプリケーションコンポーネント
//!
//! ワークフロー状態は1つの `RwSignal` に持ち、変更は共通ライブラリの
//! 操作（complete_upload / begin_advance / finish_advance ...）経由でのみ行う。

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use essay_grader_common::{
    controls_for, view_for, Error, LocateResult, OcrResult, StageView, UploadedFile,
    WorkflowState,
};
use crate::api::FetchTransport;
use crate::components::{
    header::Header,
    image_viewer::ImageViewer,
    settings_panel::SettingsPanel,
    stage_indicator::StageIndicator,
    step_controls::StepControls,
    text_editor::TextEditor,
    upload_area::UploadArea,
};
use crate::settings_store;

/// エラーをコンソールとダイアログに出す
pub fn notify_error(context: &str, error: &Error) {
    let message = format!("{}: {}", context, error);
    web_sys::console::error_1(&message.clone().into());
    gloo::dialogs::alert(&message);
}

#[component]
pub fn App() -> impl IntoView {
    let state = RwSignal::new(WorkflowState::new());
    let config = RwSignal::new(settings_store::load_config());

    // 画面の切り替えはステージだけに依存させる
    let stage = Memo::new(move |_| state.with(|s| s.stage()));
    let is_loading = Signal::derive(move || state.with(|s| s.is_loading()));
    let controls = Signal::derive(move || state.with(controls_for));

    let on_upload_success = move |files: Vec<UploadedFile>, regions: Vec<LocateResult>| {
        if let Some(Err(e)) = state.try_update(|s| s.complete_upload(files, regions)) {
            notify_error("上传失败", &e);
        }
    };

    let on_upload_error = move |e: Error| notify_error("上传失败", &e);

    let on_advance = move |_: ()| {
        let pending = match state.try_update(|s| s.begin_advance()) {
            Some(Ok(Some(pending))) => pending,
            Some(Ok(None)) | None => return,
            Some(Err(e)) => {
                notify_error("无法继续", &e);
                return;
            }
        };

        let config = config.get_untracked();
        spawn_local(async move {
            let outcome = pending.request.execute(&FetchTransport, &config).await;
            if let Some(Err(e)) = state.try_update(|s| s.finish_advance(&pending, outcome)) {
                notify_error(&format!("{}失败", pending.to.label()), &e);
            }
        });
    };

    let on_retreat = move |_: ()| {
        if let Some(Err(e)) = state.try_update(|s| s.retreat()) {
            notify_error("无法返回", &e);
        }
    };

    let on_reset = move |_: ()| {
        if let Some(Err(e)) = state.try_update(|s| s.reset()) {
            notify_error("无法重置", &e);
        }
    };

    let on_save_ocr = move |edited: OcrResult| {
        if let Some(Err(e)) = state.try_update(|s| s.save_ocr(edited)) {
            notify_error("保存失败", &e);
        }
    };

    let uploaded = Signal::derive(move || state.with(|s| s.uploaded_files().to_vec()));
    let ocr = Signal::derive(move || state.with(|s| s.ocr_results().cloned().unwrap_or_default()));

    view! {
        <div class="container">
            <Header />

            <SettingsPanel config=config />

            <StageIndicator stage=stage is_loading=is_loading />

            <main class="stage-view">
                {move || match view_for(stage.get()) {
                    StageView::FileIntake => view! {
                        <UploadArea
                            config=config
                            uploaded=uploaded
                            on_success=on_upload_success
                            on_error=on_upload_error
                        />
                    }.into_any(),
                    StageView::ImageSequence { title, description } => {
                        let images = Signal::derive(move || state.with(|s| s.current_images().to_vec()));
                        view! {
                            <ImageViewer images=images title=title description=description />
                        }.into_any()
                    }
                    StageView::TextEditor => view! {
                        <TextEditor ocr=ocr on_save=on_save_ocr />
                    }.into_any(),
                }}
            </main>

            <StepControls
                controls=controls
                on_retreat=on_retreat
                on_advance=on_advance
                on_reset=on_reset
            />
        </div>
    }
}
