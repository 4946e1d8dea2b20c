//! Image generation request model, form bounds, and provider payload shaping.
//!
//! [`GenerationRequest`] is the immutable parameter bundle a Submission
//! Source hands to the tracker. Its serialized form is the flat object the
//! proxy forwards to the image provider, so field names follow the
//! provider's wire names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::catalog::DEFAULT_IMAGE_MODEL_ID;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Form bounds and defaults
// ---------------------------------------------------------------------------

pub const MIN_DIMENSION: u32 = 64;
pub const MAX_DIMENSION: u32 = 2048;
/// Width and height must be multiples of this step.
pub const DIMENSION_STEP: u32 = 64;
pub const DEFAULT_DIMENSION: u32 = 1024;

pub const MIN_NUM_IMAGES: u32 = 1;
pub const MAX_NUM_IMAGES: u32 = 8;
pub const DEFAULT_NUM_IMAGES: u32 = 1;

pub const MIN_GUIDANCE_SCALE: u32 = 1;
pub const MAX_GUIDANCE_SCALE: u32 = 20;
pub const DEFAULT_GUIDANCE_SCALE: u32 = 7;

/// Upper bound (exclusive) for seeds produced by [`random_seed`].
pub const MAX_RANDOM_SEED: u64 = 9_999_999_999;

// ---------------------------------------------------------------------------
// ControlNet conditioning
// ---------------------------------------------------------------------------

/// Auxiliary conditioning applied to a reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlNetType {
    /// Edge detection.
    Canny,
    /// OpenPose skeleton.
    Pose,
    Depth,
}

impl ControlNetType {
    pub const ALL: [ControlNetType; 3] = [Self::Canny, Self::Pose, Self::Depth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canny => "CANNY",
            Self::Pose => "POSE",
            Self::Depth => "DEPTH",
        }
    }
}

impl fmt::Display for ControlNetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlNetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid ControlNet type '{s}'. Must be one of: CANNY, POSE, DEPTH"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// Parameters for one image generation job.
///
/// Range checks are the Submission Source's job: call [`check`](Self::check)
/// before handing the request to the tracker. The tracker itself only
/// insists on a non-empty prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    #[serde(rename = "modelId")]
    #[validate(length(min = 1, message = "Model id is required"))]
    pub model_id: String,

    #[validate(range(min = 64, max = 2048))]
    pub width: u32,

    #[validate(range(min = 64, max = 2048))]
    pub height: u32,

    #[validate(range(min = 1, max = 8))]
    pub num_images: u32,

    #[validate(range(min = 1, max = 20))]
    pub guidance_scale: u32,

    /// `None` lets the provider pick a random seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Enhanced-fidelity mode.
    #[serde(default)]
    pub alchemy: bool,

    #[serde(rename = "photoReal", default)]
    pub photo_real: bool,

    #[serde(rename = "controlNetType", default, skip_serializing_if = "Option::is_none")]
    pub controlnet_type: Option<ControlNetType>,

    /// Reference image for ControlNet conditioning (URL, data URL or
    /// provider image id).
    #[serde(rename = "controlNetImage", default, skip_serializing_if = "Option::is_none")]
    pub controlnet_image: Option<String>,
}

impl GenerationRequest {
    /// Create a request for `prompt` with the studio's defaults for every
    /// other field.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            model_id: DEFAULT_IMAGE_MODEL_ID.to_string(),
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            num_images: DEFAULT_NUM_IMAGES,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            seed: None,
            alchemy: false,
            photo_real: false,
            controlnet_type: None,
            controlnet_image: None,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        let negative_prompt = negative_prompt.into();
        self.negative_prompt = (!negative_prompt.is_empty()).then_some(negative_prompt);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_num_images(mut self, num_images: u32) -> Self {
        self.num_images = num_images;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: u32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_alchemy(mut self, alchemy: bool) -> Self {
        self.alchemy = alchemy;
        self
    }

    pub fn with_photo_real(mut self, photo_real: bool) -> Self {
        self.photo_real = photo_real;
        self
    }

    pub fn with_controlnet(mut self, kind: ControlNetType, image: Option<String>) -> Self {
        self.controlnet_type = Some(kind);
        self.controlnet_image = image;
        self
    }

    /// Whether the prompt carries any non-whitespace text.
    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    /// Full form validation: every bound plus the dimension step.
    pub fn check(&self) -> Result<(), CoreError> {
        if !self.has_prompt() {
            return Err(CoreError::Validation("Prompt is required".to_string()));
        }
        self.validate()?;
        validate_dimension_step("width", self.width)?;
        validate_dimension_step("height", self.height)?;
        if self.controlnet_image.is_some() && self.controlnet_type.is_none() {
            return Err(CoreError::Validation(
                "A ControlNet image requires a ControlNet type".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation and clamping helpers
// ---------------------------------------------------------------------------

/// Validate that a dimension is a multiple of [`DIMENSION_STEP`].
pub fn validate_dimension_step(field: &str, value: u32) -> Result<(), CoreError> {
    if value % DIMENSION_STEP == 0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field} must be a multiple of {DIMENSION_STEP} (got {value})"
        )))
    }
}

/// Round a dimension to the nearest step and clamp it into the allowed range.
pub fn clamp_dimension(value: u32) -> u32 {
    let rounded = (value.saturating_add(DIMENSION_STEP / 2) / DIMENSION_STEP) * DIMENSION_STEP;
    rounded.clamp(MIN_DIMENSION, MAX_DIMENSION)
}

pub fn clamp_num_images(value: u32) -> u32 {
    value.clamp(MIN_NUM_IMAGES, MAX_NUM_IMAGES)
}

pub fn clamp_guidance_scale(value: u32) -> u32 {
    value.clamp(MIN_GUIDANCE_SCALE, MAX_GUIDANCE_SCALE)
}

/// Pick a seed the way the studio's "randomize" button does.
pub fn random_seed() -> u64 {
    let bytes = *uuid::Uuid::new_v4().as_bytes();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(head) % MAX_RANDOM_SEED
}

// ---------------------------------------------------------------------------
// Provider payload
// ---------------------------------------------------------------------------

/// Build the image provider payload from a client request body.
///
/// Starts from the provider defaults (`modelId`, 1024x1024, one image) and
/// overlays every field of `body` verbatim. An empty or null `modelId`
/// keeps the default model.
pub fn provider_payload(body: &Map<String, Value>) -> Map<String, Value> {
    let model_id = match body.get("modelId") {
        Some(Value::String(id)) if !id.is_empty() => Value::String(id.clone()),
        _ => Value::String(DEFAULT_IMAGE_MODEL_ID.to_string()),
    };

    let mut payload = Map::new();
    payload.insert(
        "prompt".to_string(),
        body.get("prompt").cloned().unwrap_or(Value::Null),
    );
    payload.insert("modelId".to_string(), model_id);
    payload.insert("width".to_string(), Value::from(DEFAULT_DIMENSION));
    payload.insert("height".to_string(), Value::from(DEFAULT_DIMENSION));
    payload.insert("num_images".to_string(), Value::from(DEFAULT_NUM_IMAGES));

    for (key, value) in body {
        if key != "prompt" && key != "modelId" {
            payload.insert(key.clone(), value.clone());
        }
    }
    payload
}

/// Extract a non-empty prompt from a raw request body.
pub fn prompt_from_body(body: &Map<String, Value>) -> Result<&str, CoreError> {
    match body.get("prompt") {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => Ok(prompt),
        _ => Err(CoreError::Validation("Prompt is required.".to_string())),
    }
}
