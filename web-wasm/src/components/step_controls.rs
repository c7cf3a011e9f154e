//! 前へ / 次へ / やり直し ボタン

use leptos::prelude::*;
use essay_grader_common::NavControls;

#[component]
pub fn StepControls<FR, FA, FZ>(
    controls: Signal<NavControls>,
    on_retreat: FR,
    on_advance: FA,
    on_reset: FZ,
) -> impl IntoView
where
    FR: Fn(()) + 'static + Clone + Send + Sync,
    FA: Fn(()) + 'static + Clone + Send + Sync,
    FZ: Fn(()) + 'static + Clone + Send + Sync,
{
    view! {
        <div class="step-controls">
            <button
                class="btn btn-secondary"
                disabled=move || !controls.get().can_retreat
                on:click={
                    let on_retreat = on_retreat.clone();
                    move |_| on_retreat(())
                }
            >
                "上一步"
            </button>

            <Show
                when=move || controls.get().can_reset
                fallback={
                    let on_advance = on_advance.clone();
                    move || {
                        let on_advance = on_advance.clone();
                        view! {
                            <button
                                class="btn btn-primary"
                                disabled=move || !controls.get().can_advance
                                on:click=move |_| on_advance(())
                            >
                                {move || controls.get().advance_label}
                            </button>
                        }
                    }
                }
            >
                <button
                    class="btn btn-primary"
                    on:click={
                        let on_reset = on_reset.clone();
                        move |_| on_reset(())
                    }
                >
                    "重新开始"
                </button>
            </Show>
        </div>
    }
}
