//! アップロードエリアコンポーネント
//!
//! 選択・ドロップされたファイルをその場で検証し、送信前の一覧に積む。
//! 「上传」で定位エンドポイントへ送り、成功時に (files, 定位結果) を親へ渡す。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{DragEvent, FileList, HtmlInputElement};
use essay_grader_common::{
    adapters, validation, Error, LocateResult, UploadedFile, WorkflowConfig,
};
use crate::api::FetchTransport;

#[component]
pub fn UploadArea<FS, FE>(
    config: RwSignal<WorkflowConfig>,
    uploaded: Signal<Vec<UploadedFile>>,
    on_success: FS,
    on_error: FE,
) -> impl IntoView
where
    FS: Fn(Vec<UploadedFile>, Vec<LocateResult>) + 'static + Clone + Send + Sync,
    FE: Fn(Error) + 'static + Clone + Send + Sync,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let (is_uploading, set_is_uploading) = signal(false);
    let selected = RwSignal::new(Vec::<UploadedFile>::new());
    let input_ref: NodeRef<leptos::html::Input> = NodeRef::new();

    let handle_files = move |files: FileList| {
        spawn_local(async move {
            let files = match read_files(&files).await {
                Ok(files) => files,
                Err(e) => {
                    web_sys::console::error_1(&e);
                    gloo::dialogs::alert("读取文件失败");
                    return;
                }
            };

            let policy = config.with_untracked(|c| c.upload.clone());
            let (accepted, rejected) = validation::validate_files(files, &policy);
            if !rejected.is_empty() {
                gloo::dialogs::alert(&validation::describe_rejections(&rejected));
            }
            if !accepted.is_empty() {
                selected.update(|current| {
                    *current = validation::merge_selection(current, accepted, &policy);
                });
            }
        });
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);
        if is_uploading.get_untracked() {
            return;
        }
        if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
            handle_files(files);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_dragleave = move |_: DragEvent| set_is_dragover.set(false);

    let on_click = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(files) = input.files() {
            handle_files(files);
        }
        // 同じファイルを続けて選べるように
        input.set_value("");
    };

    let on_upload = move |_| {
        let files = selected.get_untracked();
        if files.is_empty() || is_uploading.get_untracked() {
            return;
        }
        set_is_uploading.set(true);

        let endpoints = config.with_untracked(|c| c.endpoints.clone());
        let on_success = on_success.clone();
        let on_error = on_error.clone();
        spawn_local(async move {
            let result = adapters::locate(&FetchTransport, &endpoints, &files).await;
            set_is_uploading.set(false);
            match result {
                Ok(regions) => {
                    selected.set(Vec::new());
                    on_success(files, regions);
                }
                Err(e) => on_error(e),
            }
        });
    };

    let remove = move |index: usize| {
        selected.update(|files| {
            if index < files.len() {
                files.remove(index);
            }
        });
    };

    view! {
        <div class="upload-panel">
            <div
                class=move || {
                    let mut classes = vec!["upload-area"];
                    if is_dragover.get() {
                        classes.push("dragover");
                    }
                    if is_uploading.get() {
                        classes.push("disabled");
                    }
                    classes.join(" ")
                }
                on:drop=on_drop
                on:dragover=on_dragover
                on:dragleave=on_dragleave
                on:click=on_click
            >
                <input
                    type="file"
                    class="hidden"
                    node_ref=input_ref
                    accept=move || config.with(|c| c.upload.accept_attr())
                    multiple=move || config.with(|c| c.upload.multiple)
                    on:change=on_change
                />
                <div class="upload-icon">"📝"</div>
                <p>"拖拽作文图片到此处，或点击选择"</p>
                <p class="text-muted">
                    {move || config.with(|c| {
                        format!("支持 {}，单个文件不超过 {}MB", c.upload.accept.join(", "), c.upload.max_size_mb)
                    })}
                </p>
            </div>

            <Show when=move || selected.with(|files| !files.is_empty())>
                <ul class="file-list">
                    {move || {
                        selected
                            .get()
                            .into_iter()
                            .enumerate()
                            .map(|(index, file)| view! {
                                <li class="file-item">
                                    <span class="file-name">{file.name.clone()}</span>
                                    <span class="text-muted">{format_size(file.size)}</span>
                                    <button
                                        class="btn btn-small btn-tertiary"
                                        disabled=move || is_uploading.get()
                                        on:click=move |_| remove(index)
                                    >
                                        "移除"
                                    </button>
                                </li>
                            })
                            .collect_view()
                    }}
                </ul>
                <div class="api-actions">
                    <button
                        class="btn btn-tertiary"
                        disabled=move || is_uploading.get()
                        on:click=move |_| selected.set(Vec::new())
                    >
                        "清空"
                    </button>
                    <button
                        class="btn btn-primary"
                        disabled=move || is_uploading.get()
                        on:click=on_upload.clone()
                    >
                        {move || if is_uploading.get() { "上传中..." } else { "上传" }}
                    </button>
                </div>
            </Show>

            <Show when=move || uploaded.with(|files| !files.is_empty())>
                <div class="uploaded-files">
                    <h4>"已上传文件"</h4>
                    <ul class="file-list">
                        {move || {
                            uploaded
                                .get()
                                .into_iter()
                                .map(|file| view! {
                                    <li class="file-item">
                                        <span class="file-name">{file.name.clone()}</span>
                                        <span class="text-muted">{format_size(file.size)}</span>
                                    </li>
                                })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </Show>
        </div>
    }
}

/// FileList を読み込んで UploadedFile にする（順序は維持）
async fn read_files(list: &FileList) -> Result<Vec<UploadedFile>, JsValue> {
    let mut files = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        let Some(file) = list.get(i) else {
            continue;
        };
        let buffer = JsFuture::from(file.array_buffer()).await?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

        let mut uploaded = UploadedFile::new(file.name(), bytes);
        let mime_type = file.type_();
        if !mime_type.is_empty() {
            uploaded.mime_type = mime_type;
        }
        files.push(uploaded);
    }
    Ok(files)
}

/// バイト数を表示用に整形
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.2} MB", bytes / (KB * KB))
    }
}
