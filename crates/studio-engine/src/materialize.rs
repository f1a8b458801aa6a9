use reqwest::Url;
use studio_contracts::requests::OutputKind;
use studio_contracts::{Credential, ObjectStore, ObjectUrl, StudioError};
use tracing::info;

use crate::service::{ContentResponse, GenerativeService, ResponsePart};

const DEFAULT_IMAGE_MIME: &str = "image/png";
const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Output of a generation. Video handles must be released by the caller
/// (dropping them also releases).
#[derive(Debug)]
pub enum GenerationResult {
    /// Directly renderable `data:` URI.
    Image(String),
    Video(ObjectUrl),
}

impl GenerationResult {
    pub fn kind(&self) -> OutputKind {
        match self {
            GenerationResult::Image(_) => OutputKind::Image,
            GenerationResult::Video(_) => OutputKind::Video,
        }
    }

    /// Address of the result: the data URI or the object handle URL.
    pub fn url(&self) -> &str {
        match self {
            GenerationResult::Image(data_uri) => data_uri,
            GenerationResult::Video(handle) => handle.as_str(),
        }
    }

    pub fn release(self) {
        if let GenerationResult::Video(handle) = self {
            handle.release();
        }
    }
}

pub fn materialize_image(response: &ContentResponse) -> Result<GenerationResult, StudioError> {
    let (mime_type, data) = response
        .parts
        .iter()
        .find_map(|part| match part {
            ResponsePart::InlineData { mime_type, data } if !data.is_empty() => {
                Some((mime_type.as_deref(), data))
            }
            _ => None,
        })
        .ok_or(StudioError::NoImage)?;
    let mime_type = mime_type.unwrap_or(DEFAULT_IMAGE_MIME);
    Ok(GenerationResult::Image(format!(
        "data:{mime_type};base64,{data}"
    )))
}

/// Result URI with the credential appended as `key`.
pub fn authorized_download_url(uri: &str, credential: &Credential) -> Result<Url, StudioError> {
    let mut url = Url::parse(uri.trim())
        .map_err(|err| StudioError::Protocol(format!("invalid video URI: {err}")))?;
    url.query_pairs_mut().append_pair("key", credential.expose());
    Ok(url)
}

pub fn materialize_video(
    service: &dyn GenerativeService,
    objects: &ObjectStore,
    credential: &Credential,
    uri: &str,
) -> Result<GenerationResult, StudioError> {
    let url = authorized_download_url(uri, credential)?;
    let body = service.fetch(&url)?;
    if !body.is_success() {
        let reason = if body.status_text.is_empty() {
            format!("HTTP {}", body.status)
        } else {
            body.status_text.clone()
        };
        return Err(StudioError::Download(reason));
    }
    let mime_type = body
        .content_type
        .as_deref()
        .filter(|value| value.starts_with("video/"))
        .unwrap_or(DEFAULT_VIDEO_MIME);
    info!(bytes = body.bytes.len(), mime_type, "video downloaded");
    Ok(GenerationResult::Video(objects.create(body.bytes, mime_type)))
}
