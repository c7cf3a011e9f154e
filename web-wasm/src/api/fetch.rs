//! fetch API による `Transport` 実装
//!
//! JSONはそのまま文字列で、ファイルは FormData + Blob で送る。

use essay_grader_common::{Error, RawResponse, RemoteCall, RequestBody, Result, Transport, UploadedFile};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Request, RequestInit, RequestMode, Response};

/// ブラウザの fetch で送信するトランスポート
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, call: &RemoteCall) -> Result<RawResponse> {
        send_request(call).await.map_err(js_error)
    }
}

async fn send_request(call: &RemoteCall) -> std::result::Result<RawResponse, JsValue> {
    let opts = RequestInit::new();
    opts.set_method(call.method.as_str());
    opts.set_mode(RequestMode::Cors);

    match &call.body {
        RequestBody::Empty => {}
        RequestBody::Json(value) => {
            opts.set_body(&JsValue::from_str(&value.to_string()));
        }
        // Content-Type（boundary付き）はブラウザに任せる
        RequestBody::Multipart { field, files } => {
            let form = build_form_data(field, files)?;
            opts.set_body(&form);
        }
    }

    let request = Request::new_with_str_and_init(&call.url, &opts)?;
    for (name, value) in &call.headers {
        request.headers().set(name, value)?;
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    let text = JsFuture::from(resp.text()?).await?;
    Ok(RawResponse {
        status: resp.status(),
        status_text: resp.status_text(),
        body: text.as_string().unwrap_or_default(),
    })
}

fn build_form_data(field: &str, files: &[UploadedFile]) -> std::result::Result<FormData, JsValue> {
    let form = FormData::new()?;
    for file in files {
        let bytes = js_sys::Uint8Array::from(file.content.as_slice());
        let parts = js_sys::Array::of1(&bytes);

        let options = BlobPropertyBag::new();
        options.set_type(&file.mime_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

        form.append_with_blob_and_filename(field, &blob, &file.name)?;
    }
    Ok(form)
}

/// JsValue のエラーを共通エラーへ
fn js_error(value: JsValue) -> Error {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value));
    Error::Transport(message)
}
