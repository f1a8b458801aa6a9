//! Request builders for the three studio features.
//!
//! Builders validate their inputs and compose a provider-agnostic
//! [`GenerationRequest`]; nothing here talks to the network.

mod outfit;
mod poster;
mod video;

use std::fmt;

use serde::Serialize;

pub use outfit::OutfitSwap;
pub use poster::ProductPoster;
pub use video::VideoPrompt;

use crate::assets::ImageAsset;
use crate::credential::Credential;
use crate::errors::StudioError;
use crate::models::{ModelSelector, ModelSpec};

pub const VIDEO_RESOLUTION: &str = "720p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    OutfitSwap,
    ProductPoster,
    Video,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::OutfitSwap => "outfit_swap",
            Feature::ProductPoster => "product_poster",
            Feature::Video => "video",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Image,
    Video,
}

/// Bare base64 image payload plus its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn from_asset(asset: &ImageAsset) -> Self {
        Self {
            mime_type: asset.mime_type().to_string(),
            data: asset.payload().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(InlineImage),
}

/// Multi-segment image edit call. Segment order is significant: the
/// instruction text refers to images as "first", "second", "third".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditCall {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub aspect_ratio: &'static str,
}

impl ImageEditCall {
    pub fn instruction(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            ContentPart::Text(text) => Some(text.as_str()),
            ContentPart::Image(_) => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, ContentPart::Image(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCall {
    pub model: String,
    pub prompt: String,
    pub reference: Option<InlineImage>,
    pub aspect_ratio: &'static str,
    pub resolution: &'static str,
    pub number_of_videos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    ImageEdit(ImageEditCall),
    Video(VideoCall),
}

impl ServiceCall {
    pub fn output_kind(&self) -> OutputKind {
        match self {
            ServiceCall::ImageEdit(_) => OutputKind::Image,
            ServiceCall::Video(_) => OutputKind::Video,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ServiceCall::ImageEdit(call) => &call.model,
            ServiceCall::Video(call) => &call.model,
        }
    }
}

/// Everything needed for one invocation. Built fresh per call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub credential: Credential,
    pub feature: Feature,
    pub call: ServiceCall,
    /// Set when a requested model was unavailable and the default was used.
    pub model_note: Option<String>,
    /// Fingerprints of the attached images, in segment order.
    pub inputs: Vec<String>,
}

pub trait RequestBuilder {
    fn feature(&self) -> Feature;

    fn build(&self, credential: Credential) -> Result<GenerationRequest, StudioError>;
}

fn select_model(
    requested: Option<&str>,
    capability: &str,
) -> Result<(ModelSpec, Option<String>), StudioError> {
    let selection = ModelSelector::new(None)
        .select(requested, capability)
        .map_err(StudioError::Configuration)?;
    Ok((selection.model, selection.fallback_reason))
}

fn fingerprints<'a>(assets: impl IntoIterator<Item = &'a ImageAsset>) -> Vec<String> {
    assets
        .into_iter()
        .map(|asset| asset.fingerprint().to_string())
        .collect()
}
