//! 汎用リモート呼び出し
//!
//! 実際の送信は `Transport` 実装（CLIはreqwest、Webはfetch）に任せ、
//! ステータス判定・エンベロープ展開はここで共通化する。

use crate::error::{Error, Result};
use crate::types::UploadedFile;
use serde_json::Value;

/// マルチパートで使うフィールド名
pub const UPLOAD_FIELD: &str = "images";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart {
        field: String,
        files: Vec<UploadedFile>,
    },
}

/// 1回分のリモート呼び出し `{url, method, body, headers}`
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub url: String,
    pub method: Method,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl RemoteCall {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            body: RequestBody::Json(body),
            headers: Vec::new(),
        }
        .with_header("Content-Type", "application/json")
    }

    pub fn upload(url: impl Into<String>, files: Vec<UploadedFile>) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            body: RequestBody::Multipart {
                field: UPLOAD_FIELD.to_string(),
                files,
            },
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// JSONボディ（テストや検証用）
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// 送信結果（解釈前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP送信の抽象
///
/// 送信自体に失敗した場合のみ `Error::Transport` を返す。
/// ステータスの解釈は `interpret_response` が行う。
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, call: &RemoteCall) -> Result<RawResponse>;
}

/// 送信してレスポンスを解釈する
pub async fn call<T: Transport>(transport: &T, request: &RemoteCall) -> Result<Value> {
    tracing::debug!(url = %request.url, method = request.method.as_str(), "remote call");
    let response = transport.send(request).await?;
    interpret_response(&response)
}

/// レスポンスを解釈
///
/// - 非2xx: サーバーのメッセージ（message / msg）、なければステータスから生成
/// - `code` が 0 以外（文字列も含む）: サーバー側の業務エラー
/// - 成功: `payload` があればそれ、なければボディ全体
pub fn interpret_response(response: &RawResponse) -> Result<Value> {
    if !response.is_success() {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| server_message(&body))
            .unwrap_or_else(|| {
                format!("请求失败: {} {}", response.status, response.status_text)
                    .trim_end()
                    .to_string()
            });
        return Err(Error::Remote {
            status: response.status,
            message,
        });
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|e| Error::Shape(format!("response is not JSON: {}", e)))?;

    if let Some(code) = body.get("code").filter(|code| is_failure_code(code)) {
        let mut message = server_message(&body).unwrap_or_else(|| format!("error code {}", code));
        // fail(None, "no images") のように code 側に説明が入ることがある
        let details = [Some(code), body.get("payload")];
        for detail in details
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            message = format!("{}: {}", message, detail);
        }
        return Err(Error::Remote {
            status: response.status,
            message,
        });
    }

    Ok(extract_payload(body))
}

/// `payload` が真値なら取り出し、そうでなければボディ全体を返す
pub fn extract_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("payload") {
            Some(payload) if is_truthy(&payload) => payload,
            Some(payload) => {
                map.insert("payload".to_string(), payload);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// `code` が存在し 0 以外ならエラー
fn is_failure_code(code: &Value) -> bool {
    match code {
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "msg"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
