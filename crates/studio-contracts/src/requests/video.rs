use crate::assets::ImageAsset;
use crate::credential::Credential;
use crate::errors::StudioError;
use crate::models::{ModelSpec, VIDEO};
use crate::params::AspectRatio;

use super::{
    fingerprints, select_model, Feature, GenerationRequest, InlineImage, RequestBuilder,
    ServiceCall, VideoCall, VIDEO_RESOLUTION,
};

const STYLE_DIRECTIVE: &str = "Style: cinematic, photorealistic, high detail, natural motion, professional lighting and color grading.";

/// Text-to-video job, optionally seeded with a reference image.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoPrompt<'a> {
    pub prompt: &'a str,
    pub reference: Option<&'a ImageAsset>,
    pub ratio: AspectRatio,
    pub model: Option<&'a str>,
}

impl VideoPrompt<'_> {
    pub fn enhanced_prompt(&self) -> String {
        format!(
            "{}\n\n{STYLE_DIRECTIVE}\nComposition: frame the shot for a {} aspect ratio.",
            self.prompt.trim(),
            self.ratio.video_ratio().composition_phrase()
        )
    }
}

impl RequestBuilder for VideoPrompt<'_> {
    fn feature(&self) -> Feature {
        Feature::Video
    }

    fn build(&self, credential: Credential) -> Result<GenerationRequest, StudioError> {
        if self.prompt.trim().is_empty() {
            return Err(StudioError::MissingInput("a video prompt is required"));
        }
        let (model, model_note) = select_model(self.model, VIDEO)?;
        ensure_resolution(&model, VIDEO_RESOLUTION)?;

        Ok(GenerationRequest {
            credential,
            feature: self.feature(),
            call: ServiceCall::Video(VideoCall {
                model: model.name,
                prompt: self.enhanced_prompt(),
                reference: self.reference.map(InlineImage::from_asset),
                aspect_ratio: self.ratio.video_code(),
                resolution: VIDEO_RESOLUTION,
                number_of_videos: 1,
            }),
            model_note,
            inputs: fingerprints(self.reference),
        })
    }
}

fn ensure_resolution(model: &ModelSpec, resolution: &str) -> Result<(), StudioError> {
    if model.renders(resolution) {
        return Ok(());
    }
    Err(StudioError::Configuration(format!(
        "model '{}' does not render {resolution} (available: {})",
        model.name,
        model.resolutions.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::png_asset;
    use crate::objects::ObjectStore;

    fn credential() -> Credential {
        Credential::new("test-key-123456").unwrap()
    }

    #[test]
    fn prompt_gains_style_and_composition_directives() -> anyhow::Result<()> {
        let request = VideoPrompt {
            prompt: "dog running",
            ratio: AspectRatio::Story,
            ..Default::default()
        }
        .build(credential())?;

        let ServiceCall::Video(call) = request.call else {
            anyhow::bail!("expected a video call");
        };
        assert_eq!(call.model, "veo-3.1-fast-generate-preview");
        assert_eq!(call.aspect_ratio, "9:16");
        assert_eq!(call.resolution, "720p");
        assert_eq!(call.number_of_videos, 1);
        assert!(call.prompt.starts_with("dog running"));
        assert!(call.prompt.contains(STYLE_DIRECTIVE));
        assert!(call.prompt.contains("vertical full screen (9:16)"));
        assert!(call.reference.is_none());
        Ok(())
    }

    #[test]
    fn square_request_composes_for_the_wide_frame_it_renders() {
        let prompt = VideoPrompt {
            prompt: "waves",
            ratio: AspectRatio::Square,
            ..Default::default()
        }
        .enhanced_prompt();
        assert!(prompt.contains("cinematic landscape (16:9)"));
    }

    #[test]
    fn reference_image_is_attached_without_prefix() -> anyhow::Result<()> {
        let store = ObjectStore::new();
        let reference = png_asset(&store);
        let request = VideoPrompt {
            prompt: "spin the bottle",
            reference: Some(&reference),
            ..Default::default()
        }
        .build(credential())?;
        let ServiceCall::Video(call) = request.call else {
            anyhow::bail!("expected a video call");
        };
        let attached = call
            .reference
            .ok_or_else(|| anyhow::anyhow!("missing reference"))?;
        assert_eq!(attached.mime_type, "image/png");
        assert!(!attached.data.starts_with("data:"));
        Ok(())
    }

    #[test]
    fn resolution_must_be_offered_by_the_selected_model() {
        let model = ModelSpec {
            name: "veo-lowres".to_string(),
            provider: "gemini".to_string(),
            capabilities: vec![VIDEO.to_string()],
            resolutions: vec!["480p".to_string()],
        };
        let err = ensure_resolution(&model, VIDEO_RESOLUTION).unwrap_err();
        assert!(matches!(err, StudioError::Configuration(_)));
        assert!(err.to_string().contains("veo-lowres"));

        let hd = ModelSpec {
            resolutions: vec!["720p".to_string(), "1080p".to_string()],
            ..model
        };
        assert!(ensure_resolution(&hd, VIDEO_RESOLUTION).is_ok());
    }

    #[test]
    fn reference_fingerprint_is_recorded() -> anyhow::Result<()> {
        let store = ObjectStore::new();
        let reference = png_asset(&store);
        let request = VideoPrompt {
            prompt: "spin the bottle",
            reference: Some(&reference),
            ..Default::default()
        }
        .build(credential())?;
        assert_eq!(request.inputs, vec![reference.fingerprint().to_string()]);
        Ok(())
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let err = VideoPrompt {
            prompt: "  ",
            ..Default::default()
        }
        .build(credential())
        .unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));
    }
}
