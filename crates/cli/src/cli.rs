use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use studio_core::catalog::{self, CatalogEntry, CHANNELS, DEFAULT_CHAT_MODEL_ID, DEFAULT_IMAGE_MODEL_ID, HEROES};
use studio_core::error::CoreError;
use studio_core::generation::{
    self, ControlNetType, GenerationRequest, DEFAULT_DIMENSION, DEFAULT_GUIDANCE_SCALE,
    DEFAULT_NUM_IMAGES,
};
use studio_core::story::StoryRequest;

use crate::data_url;

#[derive(Parser)]
#[command(name = "studio")]
#[command(author, version, about = "Generate images and stories through the Prompt Studio proxy")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Proxy base URL including `/api` (overrides STUDIO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit an image generation and wait for the result
    Generate(GenerateArgs),

    /// Generate a short story
    Story(StoryArgs),

    /// List models, heroes and channels
    #[command(alias = "ls")]
    Models,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What to generate
    #[arg(long, short)]
    pub prompt: String,

    /// What to avoid
    #[arg(long)]
    pub negative_prompt: Option<String>,

    /// Image model id (see `studio models`)
    #[arg(long, short, default_value = DEFAULT_IMAGE_MODEL_ID)]
    pub model: String,

    /// Width in pixels, rounded to a multiple of 64 within 64..=2048
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    pub width: u32,

    /// Height in pixels, rounded to a multiple of 64 within 64..=2048
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    pub height: u32,

    /// Number of images, 1..=8
    #[arg(long, short = 'n', default_value_t = DEFAULT_NUM_IMAGES)]
    pub num_images: u32,

    /// Prompt adherence, 1..=20
    #[arg(long, default_value_t = DEFAULT_GUIDANCE_SCALE)]
    pub guidance_scale: u32,

    /// Fixed seed
    #[arg(long, conflicts_with = "random_seed")]
    pub seed: Option<u64>,

    /// Pick a random seed locally
    #[arg(long)]
    pub random_seed: bool,

    /// Enhanced-fidelity mode
    #[arg(long)]
    pub alchemy: bool,

    /// Photorealistic mode
    #[arg(long)]
    pub photo_real: bool,

    /// ControlNet conditioning: CANNY, POSE or DEPTH
    #[arg(long)]
    pub controlnet_type: Option<ControlNetType>,

    /// ControlNet reference: an image file, URL or provider image id
    #[arg(long, requires = "controlnet_type")]
    pub controlnet_image: Option<String>,

    /// Resume polling this many times after a failed status check
    #[arg(long, default_value_t = 0)]
    pub poll_retries: u32,
}

impl GenerateArgs {
    /// Clamp the form values into range and build a validated request.
    pub fn to_request(&self) -> anyhow::Result<GenerationRequest> {
        let seed = if self.random_seed {
            Some(generation::random_seed())
        } else {
            self.seed
        };

        let mut request = GenerationRequest::new(self.prompt.clone())
            .with_model(self.model.clone())
            .with_size(
                generation::clamp_dimension(self.width),
                generation::clamp_dimension(self.height),
            )
            .with_num_images(generation::clamp_num_images(self.num_images))
            .with_guidance_scale(generation::clamp_guidance_scale(self.guidance_scale))
            .with_seed(seed)
            .with_alchemy(self.alchemy)
            .with_photo_real(self.photo_real);

        if let Some(negative_prompt) = &self.negative_prompt {
            request = request.with_negative_prompt(negative_prompt.clone());
        }
        if let Some(kind) = self.controlnet_type {
            let image = self
                .controlnet_image
                .as_deref()
                .map(data_url::resolve_image)
                .transpose()?;
            request = request.with_controlnet(kind, image);
        }

        request.check()?;
        Ok(request)
    }
}

#[derive(Args, Debug)]
pub struct StoryArgs {
    /// Story idea
    #[arg(long, short)]
    pub prompt: String,

    /// Chat model id (see `studio models`)
    #[arg(long, short, default_value = DEFAULT_CHAT_MODEL_ID)]
    pub model: String,

    /// Main character (hero1, hero2, hero3)
    #[arg(long)]
    pub hero: Option<String>,

    /// Publishing channel (youtube, instagram, tiktok)
    #[arg(long)]
    pub channel: Option<String>,

    /// Product image file to feature in the story
    #[arg(long)]
    pub product_image: Option<PathBuf>,
}

impl StoryArgs {
    pub fn to_request(&self) -> anyhow::Result<StoryRequest> {
        if let Some(hero) = &self.hero {
            check_catalog_id(HEROES, "hero", hero)?;
        }
        if let Some(channel) = &self.channel {
            check_catalog_id(CHANNELS, "channel", channel)?;
        }

        let mut request = StoryRequest::new(self.prompt.clone());
        request.model = self.model.clone();
        request.hero = self.hero.clone();
        request.channel = self.channel.clone();
        request.product_image = self
            .product_image
            .as_deref()
            .map(data_url::from_file)
            .transpose()?;

        request.validate()?;
        Ok(request)
    }
}

/// Reject ids missing from a catalog with the list of valid ones.
pub fn check_catalog_id(
    entries: &'static [CatalogEntry],
    kind: &str,
    id: &str,
) -> Result<(), CoreError> {
    if catalog::find(entries, id).is_some() {
        return Ok(());
    }
    let valid: Vec<&str> = entries.iter().map(|entry| entry.id).collect();
    Err(CoreError::Validation(format!(
        "Unknown {kind} '{id}' (expected one of: {})",
        valid.join(", ")
    )))
}
