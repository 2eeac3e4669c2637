use serde::{Deserialize, Serialize};

use crate::ImageRef;

pub const STRENGTH_RANGE: (f32, f32) = (0.1, 1.0);
pub const GUIDANCE_RANGE: (f32, f32) = (1.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    #[default]
    Generation,
    ObjectRemoval,
    Inpainting,
    StyleTransfer,
    VideoGeneration,
    #[serde(rename = "3d_generation")]
    ThreeDGeneration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    #[default]
    Photorealistic,
    Modern,
    Luxury,
    Minimalist,
    Scandinavian,
    Industrial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Standard,
    #[default]
    High,
    Ultra,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No source image selected")]
    MissingSource,

    #[error("Instruction must not be empty")]
    EmptyInstruction,

    #[error("No images selected for batch processing")]
    NoImages,
}

/// Parameters of one transformation. Values are clamped into their valid
/// ranges when set; presence checks happen in [`EditRequest::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(rename = "sourceImageRef")]
    source: Option<ImageRef>,
    instruction: String,
    edit_type: EditType,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_instruction: Option<String>,
    strength: f32,
    guidance: f32,
    style_preset: StylePreset,
    quality_preset: QualityPreset,
    #[serde(rename = "maskRef", skip_serializing_if = "Option::is_none")]
    mask: Option<ImageRef>,
}

impl Default for EditRequest {
    fn default() -> Self {
        Self {
            source: None,
            instruction: String::new(),
            edit_type: EditType::default(),
            negative_instruction: None,
            strength: 0.75,
            guidance: 7.5,
            style_preset: StylePreset::default(),
            quality_preset: QualityPreset::default(),
            mask: None,
        }
    }
}

impl EditRequest {
    pub fn new(source: impl Into<ImageRef>, instruction: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    /// A request without source image, used as batch template.
    pub fn template(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<ImageRef>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_edit_type(mut self, edit_type: EditType) -> Self {
        self.edit_type = edit_type;
        self
    }

    pub fn with_negative_instruction(mut self, negative: impl Into<String>) -> Self {
        let negative = negative.into();
        self.negative_instruction = (!negative.trim().is_empty()).then_some(negative);
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = clamp(strength, STRENGTH_RANGE);
        self
    }

    pub fn with_guidance(mut self, guidance: f32) -> Self {
        self.guidance = clamp(guidance, GUIDANCE_RANGE);
        self
    }

    pub fn with_style(mut self, style: StylePreset) -> Self {
        self.style_preset = style;
        self
    }

    pub fn with_quality(mut self, quality: QualityPreset) -> Self {
        self.quality_preset = quality;
        self
    }

    pub fn with_mask(mut self, mask: impl Into<ImageRef>) -> Self {
        self.mask = Some(mask.into());
        self
    }

    pub fn source(&self) -> Option<&ImageRef> {
        self.source.as_ref()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn edit_type(&self) -> EditType {
        self.edit_type
    }

    pub fn negative_instruction(&self) -> Option<&str> {
        self.negative_instruction.as_deref()
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn guidance(&self) -> f32 {
        self.guidance
    }

    pub fn style_preset(&self) -> StylePreset {
        self.style_preset
    }

    pub fn quality_preset(&self) -> QualityPreset {
        self.quality_preset
    }

    pub fn mask(&self) -> Option<&ImageRef> {
        self.mask.as_ref()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_instruction()?;
        match &self.source {
            Some(source) if !source.is_empty() => Ok(()),
            _ => Err(ValidationError::MissingSource),
        }
    }

    pub(crate) fn validate_instruction(&self) -> Result<(), ValidationError> {
        if self.instruction.trim().is_empty() {
            Err(ValidationError::EmptyInstruction)
        } else {
            Ok(())
        }
    }
}

fn clamp(v: f32, (min, max): (f32, f32)) -> f32 {
    if v.is_nan() {
        min
    } else {
        v.clamp(min, max)
    }
}
