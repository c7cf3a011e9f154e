//! ステージアダプタ
//!
//! 各ステージのリモート呼び出しと、レスポンスを次ステージの入力形式へ
//! 整形する処理。失敗時に空データで代替することはしない。
//!
//! | 遷移 | 送信 | 整形 |
//! |---|---|---|
//! | upload→locate | multipart `images` | `[{image, class}]` をそのまま |
//! | locate→process | `{images: [image]}` | 入力側の class と位置で再ペア |
//! | process→ocr | `{images: [{image, class}]}` | `{title, content}` をそのまま |
//! | ocr→result | `{title, content}` | 1枚の画像を `RENDERED_CLASS` で包む |

use crate::config::{Endpoints, ProcessMode};
use crate::error::{Error, Result};
use crate::remote::{call, RemoteCall, Transport};
use crate::types::{
    FinalResult, ImageEntry, LocateResult, OcrResult, ProcessResult, UploadedFile, RENDERED_CLASS,
};
use serde_json::{json, Value};

/// upload→locate: 画像をアップロードして作文領域を取得
pub async fn locate<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    files: &[UploadedFile],
) -> Result<Vec<LocateResult>> {
    let request = RemoteCall::upload(endpoints.locate_url(), files.to_vec());
    let payload = call(transport, &request).await?;
    parse_locate_results(payload)
}

/// locate→process: 領域画像を処理エンドポイントへ送る
pub async fn process<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    mode: ProcessMode,
    input: &[LocateResult],
) -> Result<Vec<ProcessResult>> {
    let images: Vec<&str> = input.iter().map(|entry| entry.image.as_str()).collect();
    let request = RemoteCall::post_json(endpoints.process_url(), json!({ "images": images }));
    let payload = call(transport, &request).await?;
    let processed = parse_image_list(payload)?;
    pair_processed(input, processed, mode)
}

/// process→ocr: 分類付きの画像からOCR結果を取得
pub async fn recognize<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    input: &[ProcessResult],
) -> Result<OcrResult> {
    let request = RemoteCall::post_json(endpoints.ocr_url(), json!({ "images": input }));
    let payload = call(transport, &request).await?;
    parse_ocr_result(payload)
}

/// ocr→result: （編集済みの）OCR結果から批改画像を渲染
pub async fn render<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    ocr: &OcrResult,
) -> Result<Vec<FinalResult>> {
    let request = RemoteCall::post_json(
        endpoints.render_url(),
        json!({ "title": ocr.title, "content": ocr.content }),
    );
    let payload = call(transport, &request).await?;
    parse_rendered(payload)
}

/// 定位レスポンスをパース（`[{image, class}]` 以外はエラー）
pub fn parse_locate_results(payload: Value) -> Result<Vec<LocateResult>> {
    if !payload.is_array() {
        return Err(Error::Shape(format!(
            "locate: expected an array of regions, got {}",
            kind_of(&payload)
        )));
    }
    serde_json::from_value(payload).map_err(|e| Error::Shape(format!("locate: {}", e)))
}

/// 処理済み画像の配列を取り出す
///
/// 文字列の配列、または `{image, ...}` の配列を受け付ける。
/// サーバーが返す class は使わない。
pub fn parse_image_list(payload: Value) -> Result<Vec<String>> {
    let Value::Array(items) = payload else {
        return Err(Error::Shape(format!(
            "process: expected an array of images, got {}",
            kind_of(&payload)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(image) => Ok(image),
            Value::Object(mut map) => match map.remove("image") {
                Some(Value::String(image)) => Ok(image),
                _ => Err(Error::Shape(format!("process: entry {} has no image", i))),
            },
            other => Err(Error::Shape(format!(
                "process: entry {} is {}, expected an image",
                i,
                kind_of(&other)
            ))),
        })
        .collect()
}

/// 処理済み画像を入力の分類ラベルと位置で再ペアする
pub fn pair_processed(
    input: &[LocateResult],
    processed: Vec<String>,
    mode: ProcessMode,
) -> Result<Vec<ProcessResult>> {
    if processed.len() != input.len() {
        return Err(Error::Shape(format!(
            "process: sent {} images but received {}",
            input.len(),
            processed.len()
        )));
    }

    let paired = match mode {
        ProcessMode::ReplaceImage => input
            .iter()
            .zip(processed)
            .map(|(original, image)| ImageEntry::new(image, original.class))
            .collect(),
        ProcessMode::KeepOriginal => input.to_vec(),
    };
    Ok(paired)
}

pub fn parse_ocr_result(payload: Value) -> Result<OcrResult> {
    serde_json::from_value(payload).map_err(|e| Error::Shape(format!("ocr: {}", e)))
}

/// 渲染結果（画像1枚）を `FinalResult` の1要素配列にする
pub fn parse_rendered(payload: Value) -> Result<Vec<FinalResult>> {
    let image = match payload {
        Value::String(image) if !image.is_empty() => image,
        Value::Object(ref map) => match map.get("image") {
            Some(Value::String(image)) if !image.is_empty() => image.clone(),
            _ => return Err(Error::Shape("render: response has no image".into())),
        },
        other => {
            return Err(Error::Shape(format!(
                "render: expected an image, got {}",
                kind_of(&other)
            )))
        }
    };
    Ok(vec![ImageEntry::new(image, RENDERED_CLASS)])
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
