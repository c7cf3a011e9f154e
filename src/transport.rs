//! reqwest による `Transport` 実装

use crate::error::{EssayGraderError, Result};
use essay_grader_common::{
    Error as WorkflowError, Method, RawResponse, RemoteCall, RequestBody, Transport,
};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| EssayGraderError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    fn build_request(&self, call: &RemoteCall) -> essay_grader_common::Result<reqwest::RequestBuilder> {
        let mut request = match call.method {
            Method::Get => self.client.get(&call.url),
            Method::Post => self.client.post(&call.url),
        };

        for (name, value) in &call.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let request = match &call.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart { field, files } => {
                let mut form = Form::new();
                for file in files {
                    let part = Part::bytes(file.content.clone())
                        .file_name(file.name.clone())
                        .mime_str(&file.mime_type)
                        .map_err(|e| WorkflowError::Transport(format!("{}: {}", file.name, e)))?;
                    form = form.part(field.clone(), part);
                }
                request.multipart(form)
            }
        };
        Ok(request)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, call: &RemoteCall) -> essay_grader_common::Result<RawResponse> {
        let response = self
            .build_request(call)?
            .send()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
