//! ステージ表示コンポーネント

use leptos::prelude::*;
use essay_grader_common::Stage;

#[component]
pub fn StageIndicator(
    #[prop(into)] stage: Signal<Stage>,
    is_loading: Signal<bool>,
) -> impl IntoView {
    let percent = move || {
        let last = (Stage::ALL.len() - 1) as f32;
        stage.get().index() as f32 / last * 100.0
    };

    view! {
        <div class="progress-container">
            <ol class="stage-steps">
                {Stage::ALL
                    .into_iter()
                    .map(|step| {
                        let status = move || {
                            let current = stage.get();
                            if step < current {
                                "done"
                            } else if step == current {
                                "current"
                            } else {
                                "pending"
                            }
                        };
                        view! {
                            <li class=move || format!("stage-step {}", status())>
                                <span class="stage-number">{step.index() + 1}</span>
                                <span class="stage-label">{step.label()}</span>
                            </li>
                        }
                    })
                    .collect_view()}
            </ol>
            <div class="progress-bar">
                <div class="progress-fill" style=move || format!("width: {:.0}%", percent()) />
            </div>
            <Show when=move || is_loading.get()>
                <p class="progress-text">
                    {move || format!("{}中...", stage.get().label())}
                </p>
            </Show>
        </div>
    }
}
