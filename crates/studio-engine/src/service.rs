//! Contract of the remote generation service.

use reqwest::Url;
use studio_contracts::requests::{ImageEditCall, VideoCall};
use studio_contracts::{Credential, ServiceError, StudioError};

/// One segment of a generate-content response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    InlineData { mime_type: Option<String>, data: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResponse {
    pub parts: Vec<ResponsePart>,
}

/// Handle of an in-flight video job. `done` only changes through
/// [`GenerativeService::get_operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub done: bool,
    pub video_uri: Option<String>,
    pub error: Option<ServiceError>,
}

impl Operation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            video_uri: None,
            error: None,
        }
    }
}

/// Raw result of a plain GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait GenerativeService: Send + Sync {
    fn generate_content(
        &self,
        credential: &Credential,
        call: &ImageEditCall,
    ) -> Result<ContentResponse, StudioError>;

    fn generate_videos(
        &self,
        credential: &Credential,
        call: &VideoCall,
    ) -> Result<Operation, StudioError>;

    fn get_operation(
        &self,
        credential: &Credential,
        operation: &Operation,
    ) -> Result<Operation, StudioError>;

    /// Unauthenticated GET; the caller puts any key into `url` itself.
    fn fetch(&self, url: &Url) -> Result<FetchedBody, StudioError>;

    /// Cheap authenticated round trip confirming the key is accepted.
    fn check_credential(&self, credential: &Credential) -> Result<(), StudioError>;
}
