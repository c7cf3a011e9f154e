//! 画像ビューアコンポーネント
//!
//! 前後ボタンは端で折り返す。表示位置はこのコンポーネント内だけで持つ。

use leptos::prelude::*;
use essay_grader_common::{to_data_url, Carousel, ImageEntry};

#[component]
pub fn ImageViewer(
    #[prop(into)] images: Signal<Vec<ImageEntry>>,
    title: &'static str,
    description: &'static str,
) -> impl IntoView {
    let carousel = RwSignal::new(Carousel::new(images.with_untracked(Vec::len)));

    // 画像数が変わったら位置を合わせ直す
    Effect::new(move |_| {
        let len = images.with(Vec::len);
        if carousel.with_untracked(Carousel::len) != len {
            carousel.update(|c| c.resize(len));
        }
    });

    let total = move || carousel.with(Carousel::len);
    let current = move || carousel.with(|c| c.index());
    let entry = move || images.with(|list| list.get(current()).cloned());

    view! {
        <div class="image-viewer">
            <h3>{title}</h3>
            {(!description.is_empty()).then(|| view! { <p class="text-muted">{description}</p> })}

            <div class="viewer-frame">
                {move || match entry() {
                    Some(entry) => view! {
                        <img
                            src=to_data_url(&entry.image)
                            alt=format!("{} {}", entry.class_label(), current() + 1)
                        />
                        <span class="class-badge">{entry.class_label()}</span>
                    }.into_any(),
                    None => view! {
                        <p class="text-muted">"没有可显示的图片"</p>
                    }.into_any(),
                }}

                <Show when=move || (total() > 1)>
                    <button
                        class="nav-btn prev"
                        aria-label="上一张"
                        on:click=move |_| carousel.update(|c| c.prev())
                    >
                        "‹"
                    </button>
                    <button
                        class="nav-btn next"
                        aria-label="下一张"
                        on:click=move |_| carousel.update(|c| c.next())
                    >
                        "›"
                    </button>
                </Show>
            </div>

            <div class="viewer-counter">
                {move || format!("图片 {}", carousel.with(|c| c.label()))}
            </div>

            <Show when=move || (total() > 1)>
                <div class="viewer-dots">
                    {move || {
                        (0..total())
                            .map(|i| view! {
                                <button
                                    class="dot"
                                    class:active=move || current() == i
                                    aria-label=format!("跳转到图片 {}", i + 1)
                                    on:click=move |_| carousel.update(|c| c.jump(i))
                                />
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </div>
    }
}
