use crate::assets::ImageAsset;
use crate::credential::Credential;
use crate::errors::StudioError;
use crate::models::IMAGE_EDIT;
use crate::params::AspectRatio;

use super::{
    fingerprints, select_model, ContentPart, Feature, GenerationRequest, ImageEditCall,
    InlineImage, RequestBuilder, ServiceCall,
};

/// Place a product on a newly described background, optionally branded
/// with a logo.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductPoster<'a> {
    pub product: Option<&'a ImageAsset>,
    pub theme: &'a str,
    pub logo: Option<&'a ImageAsset>,
    pub ratio: AspectRatio,
    pub model: Option<&'a str>,
}

impl ProductPoster<'_> {
    pub fn instruction(&self) -> String {
        let mut steps = vec![
            "Keep the product EXACTLY as it is (do not distort shape, label, or details).".to_string(),
            format!(
                "Remove the original background and replace it with a background described as: \"{}\".",
                self.theme
            ),
            "Ensure the lighting on the product matches the new environment naturally.".to_string(),
            format!(
                "Composition: Optimize the layout for a {} format. The product should be the central focus, balanced with negative space and background elements.",
                self.ratio.composition_phrase()
            ),
        ];
        if self.logo.is_some() {
            steps.push(
                "Incorporate the second image (logo) into the poster design. Place it professionally (e.g., in a corner or balanced position) as a branding element. Do not distort the logo text or shape."
                    .to_string(),
            );
        }

        let mut text = String::from(
            "You are a world-class product photographer and marketing designer.\n\
             Task: Create a high-end commercial poster for the product in the first image.\n",
        );
        if self.logo.is_some() {
            text.push_str("The second image provided is the brand logo.\n");
        }
        text.push_str("\nInstructions:\n");
        for (idx, step) in steps.iter().enumerate() {
            text.push_str(&format!("{}. {step}\n", idx + 1));
        }
        text
    }
}

impl RequestBuilder for ProductPoster<'_> {
    fn feature(&self) -> Feature {
        Feature::ProductPoster
    }

    fn build(&self, credential: Credential) -> Result<GenerationRequest, StudioError> {
        let product = self
            .product
            .ok_or(StudioError::MissingInput("a product image is required"))?;
        if self.theme.trim().is_empty() {
            return Err(StudioError::MissingInput("a theme description is required"));
        }
        let (model, model_note) = select_model(self.model, IMAGE_EDIT)?;

        let mut parts = vec![
            ContentPart::Text(self.instruction()),
            ContentPart::Image(InlineImage::from_asset(product)),
        ];
        if let Some(logo) = self.logo {
            parts.push(ContentPart::Image(InlineImage::from_asset(logo)));
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
            inputs: fingerprints(std::iter::once(product).chain(self.logo)),
        })
    }
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
    fn theme_is_injected_verbatim_with_ratio_phrase() -> anyhow::Result<()> {
        let store = ObjectStore::new();
        let product = png_asset(&store);
        let request = ProductPoster {
            product: Some(&product),
            theme: "marble podium",
            ratio: AspectRatio::Landscape,
            ..Default::default()
        }
        .build(credential())?;

        let ServiceCall::ImageEdit(call) = request.call else {
            anyhow::bail!("expected an image edit call");
        };
        assert_eq!(call.parts.len(), 2);
        assert_eq!(call.aspect_ratio, "16:9");
        let text = call.instruction().unwrap_or_default();
        assert!(text.contains("\"marble podium\""));
        assert!(text.contains("cinematic landscape (16:9)"));
        assert!(!text.contains("logo"));
        Ok(())
    }

    #[test]
    fn logo_is_second_image_with_branding_clause() -> anyhow::Result<()> {
        let store = ObjectStore::new();
        let product = png_asset(&store);
        let logo = png_asset(&store);
        let request = ProductPoster {
            product: Some(&product),
            theme: "neon city",
            logo: Some(&logo),
            ratio: AspectRatio::Classic,
            model: None,
        }
        .build(credential())?;

        let ServiceCall::ImageEdit(call) = request.call else {
            anyhow::bail!("expected an image edit call");
        };
        assert_eq!(call.image_count(), 2);
        assert_eq!(call.aspect_ratio, "4:3");
        assert!(call
            .instruction()
            .unwrap_or_default()
            .contains("Do not distort the logo"));
        Ok(())
    }

    #[test]
    fn missing_product_or_theme_fails_synchronously() {
        let store = ObjectStore::new();
        let product = png_asset(&store);

        let no_product = ProductPoster {
            theme: "beach",
            ..Default::default()
        }
        .build(credential())
        .unwrap_err();
        assert!(matches!(no_product, StudioError::MissingInput(_)));

        let blank_theme = ProductPoster {
            product: Some(&product),
            theme: "   ",
            ..Default::default()
        }
        .build(credential())
        .unwrap_err();
        assert!(matches!(blank_theme, StudioError::MissingInput(_)));
    }
}
