//! Fixed style → prompt table.

use strum::Display;

/// Shared by every preset.
const NEGATIVE_PROMPT: &str =
    "low quality, blurry, distorted, warped, messy, clutter, text, watermark, logo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPair {
    pub prompt: &'static str,
    pub negative: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StylePreset {
    Luxury,
    Scandinavian,
    Arabic,
    ModernMinimal,
}

impl StylePreset {
    /// Case-insensitive substring match, first hit wins. "Arabic luxury"
    /// therefore resolves to [`StylePreset::Luxury`].
    pub fn from_label(style: Option<&str>) -> Self {
        let label = style.unwrap_or_default().to_lowercase();
        if label.contains("luxury") {
            Self::Luxury
        } else if label.contains("scandinav") {
            Self::Scandinavian
        } else if label.contains("arab") {
            Self::Arabic
        } else {
            Self::ModernMinimal
        }
    }

    pub const fn prompts(self) -> PromptPair {
        let prompt = match self {
            Self::Luxury => {
                "luxury interior redesign, elegant neutral palette, premium materials, warm lighting, photorealistic"
            }
            Self::Scandinavian => {
                "scandinavian interior redesign, bright airy, light wood, clean lines, cozy minimal, photorealistic"
            }
            Self::Arabic => {
                "arabic luxury interior redesign, modern arabic patterns, warm ambient lighting, premium textures, photorealistic"
            }
            Self::ModernMinimal => {
                "modern minimal interior redesign, clean lines, calm neutral palette, realistic lighting, photorealistic"
            }
        };
        PromptPair {
            prompt,
            negative: NEGATIVE_PROMPT,
        }
    }
}

pub fn preset_for(style: Option<&str>) -> PromptPair {
    StylePreset::from_label(style).prompts()
}
