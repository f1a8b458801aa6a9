//! Gemini / Veo REST transport.

use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, RequestBuilder as HttpRequest};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::{json, Map, Value};
use studio_contracts::requests::{ContentPart, ImageEditCall, VideoCall};
use studio_contracts::{Credential, ServiceError, StudioError};
use tracing::debug;

use crate::config::StudioConfig;
use crate::service::{ContentResponse, FetchedBody, GenerativeService, Operation, ResponsePart};

pub struct GeminiClient {
    api_base: String,
    http: HttpClient,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            http: HttpClient::new(),
            request_timeout: config.request_timeout,
            download_timeout: config.download_timeout,
        }
    }

    fn model_endpoint(&self, model: &str, method: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:{method}", self.api_base, model_path)
    }

    fn operation_endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.api_base, name.trim().trim_start_matches('/'))
    }

    fn send_json(&self, label: &str, request: HttpRequest) -> Result<Value, StudioError> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .map_err(|err| StudioError::Transport(format!("{label}: {}", without_url(err))))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| {
                StudioError::Transport(format!("{label} body read failed: {}", without_url(err)))
            })?;
        debug!(label, status = status.as_u16(), "service responded");
        if !status.is_success() {
            return Err(service_error_from_body(status.as_u16(), &body).into());
        }
        serde_json::from_str(&body)
            .map_err(|err| StudioError::Protocol(format!("{label} returned invalid JSON: {err}")))
    }
}

impl GenerativeService for GeminiClient {
    fn generate_content(
        &self,
        credential: &Credential,
        call: &ImageEditCall,
    ) -> Result<ContentResponse, StudioError> {
        let endpoint = self.model_endpoint(&call.model, "generateContent");
        let request = self
            .http
            .post(&endpoint)
            .query(&[("key", credential.expose())])
            .json(&image_edit_payload(call));
        let payload = self.send_json("generateContent", request)?;
        Ok(parse_content_response(&payload))
    }

    fn generate_videos(
        &self,
        credential: &Credential,
        call: &VideoCall,
    ) -> Result<Operation, StudioError> {
        let endpoint = self.model_endpoint(&call.model, "predictLongRunning");
        let request = self
            .http
            .post(&endpoint)
            .query(&[("key", credential.expose())])
            .json(&video_payload(call));
        let payload = self.send_json("predictLongRunning", request)?;
        parse_operation(&payload)
    }

    fn get_operation(
        &self,
        credential: &Credential,
        operation: &Operation,
    ) -> Result<Operation, StudioError> {
        let request = self
            .http
            .get(self.operation_endpoint(&operation.name))
            .query(&[("key", credential.expose())]);
        let payload = self.send_json("getOperation", request)?;
        parse_operation(&payload)
    }

    fn fetch(&self, url: &Url) -> Result<FetchedBody, StudioError> {
        let response = self
            .http
            .get(url.clone())
            .timeout(self.download_timeout)
            .send()
            .map_err(|err| StudioError::Download(without_url(err).to_string()))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .map_err(|err| StudioError::Download(without_url(err).to_string()))?
            .to_vec();
        Ok(FetchedBody {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            bytes,
        })
    }

    fn check_credential(&self, credential: &Credential) -> Result<(), StudioError> {
        let request = self
            .http
            .get(format!("{}/models", self.api_base))
            .query(&[("pageSize", "1"), ("key", credential.expose())]);
        self.send_json("listModels", request).map(|_| ())
    }
}

// The download URL carries the key; keep it out of error text.
fn without_url(err: reqwest::Error) -> reqwest::Error {
    err.without_url()
}

pub(crate) fn image_edit_payload(call: &ImageEditCall) -> Value {
    let parts: Vec<Value> = call
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => json!({ "text": text }),
            ContentPart::Image(image) => json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data,
                }
            }),
        })
        .collect();
    json!({
        "contents": [{
            "role": "user",
            "parts": parts,
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE"],
            "imageConfig": {
                "aspectRatio": call.aspect_ratio,
            },
        },
    })
}

pub(crate) fn video_payload(call: &VideoCall) -> Value {
    let mut instance = Map::new();
    instance.insert("prompt".to_string(), Value::String(call.prompt.clone()));
    if let Some(reference) = call.reference.as_ref() {
        instance.insert(
            "image".to_string(),
            json!({
                "bytesBase64Encoded": reference.data,
                "mimeType": reference.mime_type,
            }),
        );
    }
    json!({
        "instances": [Value::Object(instance)],
        "parameters": {
            "aspectRatio": call.aspect_ratio,
            "resolution": call.resolution,
            "sampleCount": call.number_of_videos,
        },
    })
}

pub(crate) fn parse_content_response(payload: &Value) -> ContentResponse {
    let parts = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let parts = parts
        .iter()
        .filter_map(|part| {
            let inline = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(Value::as_object);
            if let Some(inline) = inline {
                let data = inline
                    .get("data")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let mime_type = inline
                    .get("mimeType")
                    .or_else(|| inline.get("mime_type"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                return Some(ResponsePart::InlineData {
                    mime_type,
                    data: data.to_string(),
                });
            }
            part.get("text")
                .and_then(Value::as_str)
                .map(|text| ResponsePart::Text(text.to_string()))
        })
        .collect();
    ContentResponse { parts }
}

pub(crate) fn parse_operation(payload: &Value) -> Result<Operation, StudioError> {
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| StudioError::Protocol("operation payload has no name".to_string()))?;
    let done = payload
        .get("done")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let error = payload.get("error").map(operation_error);
    let video_uri = payload.get("response").and_then(video_uri_from_response);

    Ok(Operation {
        name: name.to_string(),
        done,
        video_uri,
        error,
    })
}

fn video_uri_from_response(response: &Value) -> Option<String> {
    let samples = response
        .pointer("/generateVideoResponse/generatedSamples")
        .or_else(|| response.get("generatedVideos"))
        .and_then(Value::as_array)?;
    samples
        .first()?
        .pointer("/video/uri")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
}

fn operation_error(error: &Value) -> ServiceError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("video generation failed");
    // Operation errors carry google.rpc codes, not HTTP statuses.
    let code = error
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.get("code").map(|code| code.to_string()));
    ServiceError {
        status: None,
        code,
        message: message.to_string(),
    }
}

/// Builds a [`ServiceError`] from a Google error envelope
/// `{"error": {"code", "message", "status"}}`, falling back to the raw body.
pub(crate) fn service_error_from_body(status: u16, body: &str) -> ServiceError {
    let envelope = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").cloned());
    let message = envelope
        .as_ref()
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("request failed with HTTP {status}")
            } else {
                truncate_text(trimmed, 512)
            }
        });
    let code = envelope
        .as_ref()
        .and_then(|error| error.get("status"))
        .and_then(Value::as_str)
        .map(str::to_string);
    ServiceError {
        status: Some(status),
        code,
        message,
    }
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
