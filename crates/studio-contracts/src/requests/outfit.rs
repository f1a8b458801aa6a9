use crate::assets::ImageAsset;
use crate::credential::Credential;
use crate::errors::StudioError;
use crate::models::IMAGE_EDIT;
use crate::params::{AspectRatio, Pose};

use super::{
    fingerprints, select_model, ContentPart, Feature, GenerationRequest, ImageEditCall,
    InlineImage, RequestBuilder, ServiceCall,
};

pub(crate) const IDENTITY_CLAUSE: &str = "STRICTLY maintain the identity, face, expression, and body proportions of the person in the first image.";
pub(crate) const POSE_CHANGE_PREFIX: &str = "CHANGE the character's pose to:";

/// Dress the person in the first image in the outfit from the second,
/// optionally placing a product from a third image in their hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutfitSwap<'a> {
    pub character: Option<&'a ImageAsset>,
    pub outfit: Option<&'a ImageAsset>,
    pub handheld: Option<&'a ImageAsset>,
    pub pose: Pose,
    pub ratio: AspectRatio,
    pub model: Option<&'a str>,
}

impl OutfitSwap<'_> {
    pub fn instruction(&self) -> String {
        let has_handheld = self.handheld.is_some();
        let mut requirements = Vec::new();

        match self.pose.instruction() {
            Some(pose) => {
                requirements.push(IDENTITY_CLAUSE.to_string());
                requirements.push(format!(
                    "{POSE_CHANGE_PREFIX} {pose}. Keep the identity unchanged, make the anatomy natural and let the clothes drape realistically for this new pose."
                ));
            }
            None => requirements.push(format!(
                "{IDENTITY_CLAUSE} Keep the person's original pose."
            )),
        }
        requirements.push(
            "The new outfit must look photorealistic, following the body curvature, lighting, and shadows of the scene."
                .to_string(),
        );
        requirements.push(format!(
            "Composition: Ensure the subject is framed perfectly for a {} aspect ratio. Keep the subject in the main focus area.",
            self.ratio.composition_phrase()
        ));
        requirements.push("Output ONLY the modified image.".to_string());
        if has_handheld {
            requirements.push(
                [
                    "HANDHELD ITEM: A third image (product) is provided. You MUST place this product in the character's hand.",
                    "   - Adjust the character's fingers and grip to hold the object naturally and realistically.",
                    "   - Ensure the product's scale is appropriate relative to the character.",
                    "   - Match the lighting and shadows of the product to the scene.",
                    "   - If the pose was changed, ensure the product is held naturally within the new pose.",
                ]
                .join("\n"),
            );
        }

        let mut text = String::from(
            "You are a professional fashion editor and visual effects artist.\n\
             Task: Replace the clothes of the person in the first image with the outfit shown in the second image.\n",
        );
        if has_handheld {
            text.push_str("Also, integrate the product from the third image into the character's hand.\n");
        }
        text.push_str("\nRequirements:\n");
        for (idx, requirement) in requirements.iter().enumerate() {
            text.push_str(&format!("{}. {requirement}\n", idx + 1));
        }
        text
    }
}

impl RequestBuilder for OutfitSwap<'_> {
    fn feature(&self) -> Feature {
        Feature::OutfitSwap
    }

    fn build(&self, credential: Credential) -> Result<GenerationRequest, StudioError> {
        let character = self
            .character
            .ok_or(StudioError::MissingInput("a character image is required"))?;
        let outfit = self
            .outfit
            .ok_or(StudioError::MissingInput("an outfit image is required"))?;
        let (model, model_note) = select_model(self.model, IMAGE_EDIT)?;

        let mut parts = vec![
            ContentPart::Text(self.instruction()),
            ContentPart::Image(InlineImage::from_asset(character)),
            ContentPart::Image(InlineImage::from_asset(outfit)),
        ];
        if let Some(handheld) = self.handheld {
            parts.push(ContentPart::Image(InlineImage::from_asset(handheld)));
        }

        Ok(GenerationRequest {
            credential,
            feature: self.feature(),
            call: ServiceCall::ImageEdit(ImageEditCall {
                model: model.name,
                parts,
                aspect_ratio: self.ratio.image_code(),
            }),
            model_note,
            inputs: fingerprints([character, outfit].into_iter().chain(self.handheld)),
        })
    }
}
