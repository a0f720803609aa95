//! Orchestration for story and image generation.
//!
//! Within one request the story is generated before any images, bounding
//! the number of simultaneous outbound calls; the three image variants
//! then run concurrently and are joined. A failure of any variant fails
//! the whole batch with no partial results.

use std::sync::Arc;

use chrono::Utc;

use crate::clients::{GenError, GenerativeService};
use crate::models::{GenerationInputs, GenerationResult, ImageData, SessionUser};

pub struct GenerationService {
    backend: Arc<dyn GenerativeService>,
}

impl GenerationService {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerativeService>) -> Self {
        Self { backend }
    }

    /// Runs the full flow for one form submission: story, then (when
    /// requested) the three professional photo variants.
    pub async fn generate(
        &self,
        inputs: &GenerationInputs,
        artisan: Option<&SessionUser>,
    ) -> Result<GenerationResult, GenError> {
        let story_prompt = build_story_prompt(inputs, artisan);
        let story = self
            .backend
            .generate_text_with_image(&inputs.image, &story_prompt)
            .await?;

        let images = if inputs.generate_images {
            self.generate_professional_images(inputs).await?
        } else {
            Vec::new()
        };

        Ok(GenerationResult {
            story,
            images,
            inputs: inputs.clone(),
            created_at: Utc::now(),
        })
    }

    /// Issues the three professional-photo prompts in parallel and waits
    /// for all of them.
    pub async fn generate_professional_images(
        &self,
        inputs: &GenerationInputs,
    ) -> Result<Vec<ImageData>, GenError> {
        let [base, angle, lighting] = image_prompts(inputs);

        let (a, b, c) = futures::try_join!(
            self.backend.generate_image(&inputs.image, &base),
            self.backend.generate_image(&inputs.image, &angle),
            self.backend.generate_image(&inputs.image, &lighting),
        )?;

        Ok(vec![a, b, c])
    }

    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, GenError> {
        let prompt = build_translation_prompt(text, target_language);
        self.backend.generate_text(&prompt).await
    }
}

fn build_story_prompt(inputs: &GenerationInputs, artisan: Option<&SessionUser>) -> String {
    let mut artisan_info = String::new();
    if let Some(user) = artisan {
        artisan_info.push_str(
            "\nHere is some information about the artisan to help inform the tone and voice of the story:",
        );
        artisan_info.push_str(&format!("\n- Artisan Name/Brand: '{}'", user.name));
        if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
            artisan_info.push_str(&format!("\n- About the Artisan: '{bio}'"));
        }
    }

    format!(
        "You are an expert storyteller for artisanal products. An artisan has provided an image \
of their product and some details. Your task is to write a short, captivating story about this product.

The story and hashtags MUST be tailored for the '{platform}' platform.
- For Instagram/TikTok: Use a more visual, engaging, and slightly informal tone. Emojis are great. Keep it concise.
- For Facebook: A slightly longer, more community-focused story can work well.
- For Pinterest: Focus on aesthetic, DIY, and inspirational aspects. The description should be keyword-rich.
- For Etsy: Focus on the craftsmanship, materials, and the unique story of the item for a marketplace audience.
- For General / Blog: A more traditional, slightly longer narrative format is appropriate.

The story should be about 150 words, evoke emotion, and highlight the craftsmanship. Make it \
sound authentic and personal, as if the artisan themself is speaking.{artisan_info}

Here are the product details:
- Product Details: '{description}'
- Target Audience: '{audience}'

After the story, on two new lines, provide 5-7 relevant social media hashtags specifically \
optimized for '{platform}'. The hashtags should be space-separated and each must start with #. For example:

#Handmade #ArtisanCraft #SupportSmallBusiness",
        platform = inputs.platform,
        description = inputs.description,
        audience = inputs.audience,
    )
}

fn image_prompts(inputs: &GenerationInputs) -> [String; 3] {
    let base = format!(
        "Using the provided image of a product described as '{}', transform it into a \
professional product photograph that would appeal to '{}'. The specific style requested is: '{}'.",
        inputs.description, inputs.audience, inputs.aesthetic,
    );

    [
        base.clone(),
        format!("{base} Capture it from a slightly different angle."),
        format!("{base} Use alternate, dramatic lighting."),
    ]
}

fn build_translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text into {target_language}.
It is a product story for an artisanal good. It's crucial to preserve the original tone, meaning, \
and captivating, personal style.
IMPORTANT: You MUST NOT translate any hashtags (words starting with #). The hashtags must be \
preserved exactly as they are in the original text.
Do not add any extra commentary, just provide the translation.

Text to translate:
---
{text}
---
"
    )
}

/// Prompt for the vertical video ad; wraps the user's creative brief.
#[must_use]
pub fn build_video_prompt(brief: &str) -> String {
    format!(
        "Create a short, engaging vertical format (9:16 aspect ratio) video ad suitable for \
social media like Instagram Reels, TikTok, or YouTube Shorts. The video should be visually \
appealing and grab attention within the first 3 seconds. Here is the creative brief: \"{brief}\""
    )
}
