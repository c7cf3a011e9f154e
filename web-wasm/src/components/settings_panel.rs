//! 設定パネルコンポーネント

use leptos::prelude::*;
use essay_grader_common::{ProcessMode, WorkflowConfig};
use crate::settings_store;

#[component]
pub fn SettingsPanel(config: RwSignal<WorkflowConfig>) -> impl IntoView {
    let (status, set_status) = signal(String::new());

    let on_save = move |_| {
        let message = match config.with_untracked(settings_store::save_config) {
            Ok(()) => "已保存".to_string(),
            Err(e) => e,
        };
        set_status.set(message);
    };

    let on_restore = move |_| {
        settings_store::clear_config();
        config.set(settings_store::default_config());
        set_status.set("已恢复默认设置".to_string());
    };

    view! {
        <details class="settings-panel">
            <summary>"服务设置"</summary>
            <div class="settings-grid">
                <div class="form-group">
                    <label for="base-url">"服务地址"</label>
                    <input
                        type="text"
                        id="base-url"
                        placeholder="http://127.0.0.1:5000"
                        prop:value=move || config.with(|c| c.endpoints.base_url.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            config.update(|c| c.endpoints.base_url = value.trim().to_string());
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="process-mode">"处理结果"</label>
                    <select
                        id="process-mode"
                        on:change=move |ev| {
                            if let Ok(mode) = event_target_value(&ev).parse::<ProcessMode>() {
                                config.update(|c| c.process_mode = mode);
                            }
                        }
                    >
                        <option
                            value="replace-image"
                            selected=move || config.with(|c| c.process_mode == ProcessMode::ReplaceImage)
                        >
                            "使用处理后的图片"
                        </option>
                        <option
                            value="keep-original"
                            selected=move || config.with(|c| c.process_mode == ProcessMode::KeepOriginal)
                        >
                            "保留定位图片"
                        </option>
                    </select>
                </div>

                <div class="form-group">
                    <div class="api-actions">
                        <button class="btn btn-primary btn-small" on:click=on_save>"保存"</button>
                        <button class="btn btn-tertiary btn-small" on:click=on_restore>"恢复默认"</button>
                    </div>
                    <div class="api-key-status">{move || status.get()}</div>
                </div>
            </div>
        </details>
    }
}
