//! On-disk configuration for the generation pipelines
//!
//! Two JSON documents drive generation: `generation-config.json` (the brief
//! plus per-slot prompts) and `mood-board-options.json` (design directions,
//! updated in place as boards are generated).

use crate::manifest::AssetStatus;
use serde::{Deserialize, Serialize};
use sitegen_core::{Result, SitegenError};
use std::path::Path;

/// Root of `generation-config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub brief: String,
    pub prompts: PromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub recraft: RecraftPrompts,
    pub runway: RunwayPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecraftPrompts {
    pub logo: String,
    pub hero_image: String,
    pub feature_icons: FeatureIconPrompts,
    #[serde(default)]
    pub portfolio_images: Vec<String>,
    #[serde(default)]
    pub scroll_sequence_images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureIconPrompts {
    pub wallet: String,
    pub shield: String,
    pub rocket: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayPrompts {
    pub hero_video: String,
    pub showcase_video: String,
}

impl GenerationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SitegenError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            SitegenError::ConfigError(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}

/// Root of `mood-board-options.json`. The file is rewritten whole after a
/// generation run, so every field must round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodBoardConfig {
    pub brief: String,
    pub generated_at: String,
    pub options: Vec<MoodBoardOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<String>,
}

/// One design direction. Only the image block is interpreted here; the
/// design tokens (palette, typography, whatever the authoring step wrote)
/// are carried through untouched via the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodBoardOption {
    pub id: String,
    pub label: String,
    pub mood_board_image: MoodBoardImage,
    #[serde(flatten)]
    pub design: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodBoardImage {
    pub prompt: String,
    pub path: Option<String>,
    pub status: AssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoodBoardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SitegenError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            SitegenError::ConfigError(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }
}
