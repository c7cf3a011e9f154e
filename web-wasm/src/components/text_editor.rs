//! OCR結果の表示・編集コンポーネント
//!
//! 編集中の文字列はフィールドごとのローカル状態に持ち、
//! 「保存」を押したときだけ `on_save` に {title, content} 全体を渡す。

use leptos::prelude::*;
use essay_grader_common::{OcrField, OcrResult};

#[component]
pub fn TextEditor<F>(ocr: Signal<OcrResult>, on_save: F) -> impl IntoView
where
    F: Fn(OcrResult) + 'static + Clone + Send + Sync,
{
    view! {
        <div class="text-editor">
            <h3>"文字识别结果"</h3>
            <p class="text-muted">"可分别修改标题和正文，保存后用于生成批改"</p>
            <FieldEditor ocr=ocr field=OcrField::Title label="标题" on_save=on_save.clone() />
            <FieldEditor ocr=ocr field=OcrField::Content label="正文" on_save=on_save />
        </div>
    }
}

#[component]
fn FieldEditor<F>(
    ocr: Signal<OcrResult>,
    field: OcrField,
    label: &'static str,
    on_save: F,
) -> impl IntoView
where
    F: Fn(OcrResult) + 'static + Clone + Send + Sync,
{
    let (editing, set_editing) = signal(false);
    let draft = RwSignal::new(String::new());

    let start_edit = move |_| {
        draft.set(ocr.with_untracked(|o| o.field(field).to_string()));
        set_editing.set(true);
    };

    let cancel = move |_| set_editing.set(false);

    let save = move |_| {
        // 最新の値を基にするので、もう一方のフィールドの保存内容は失われない
        let edited = ocr.with_untracked(|o| o.with_field(field, draft.get_untracked()));
        on_save(edited);
        set_editing.set(false);
    };

    let display = move || match field {
        OcrField::Title => view! {
            <h4 class="ocr-title">{move || ocr.with(|o| o.title.clone())}</h4>
        }
        .into_any(),
        OcrField::Content => view! {
            <div class="ocr-content">
                {move || {
                    ocr.with(|o| {
                        o.paragraphs()
                            .into_iter()
                            .map(|p| view! { <p>{p.to_string()}</p> })
                            .collect_view()
                    })
                }}
            </div>
        }
        .into_any(),
    };

    let input = move || match field {
        OcrField::Title => view! {
            <input
                type="text"
                prop:value=move || draft.get()
                on:input=move |ev| draft.set(event_target_value(&ev))
            />
        }
        .into_any(),
        OcrField::Content => view! {
            <textarea
                rows="12"
                prop:value=move || draft.get()
                on:input=move |ev| draft.set(event_target_value(&ev))
            />
        }
        .into_any(),
    };

    view! {
        <section class="ocr-field">
            <div class="ocr-field-header">
                <span class="ocr-field-label">{label}</span>
                <Show when=move || !editing.get()>
                    <button class="btn btn-small btn-secondary" on:click=start_edit>"修改"</button>
                </Show>
            </div>
            <Show when=move || editing.get() fallback=display>
                {input}
                <div class="api-actions">
                    <button class="btn btn-small btn-primary" on:click=save.clone()>"保存"</button>
                    <button class="btn btn-small btn-tertiary" on:click=cancel>"取消"</button>
                </div>
            </Show>
        </section>
    }
}
