//! Asset manifest assembly and the generated TypeScript module
//!
//! The manifest maps every fixed asset slot onto its job outcome. Slots
//! whose generation was never attempted stay as local placeholders; failed
//! slots carry the error message so the presentation layer can render a
//! fallback instead of crashing.

use crate::config::PromptConfig;
use crate::runner::JobOutcome;
use serde::{Deserialize, Serialize};
use sitegen_core::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Where an asset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Local,
    Recraft,
    Runway,
}

/// Generation state of one asset slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Placeholder,
    Generated,
    Failed,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetStatus::Placeholder => write!(f, "placeholder"),
            AssetStatus::Generated => write!(f, "generated"),
            AssetStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One manifest slot.
///
/// `generated` implies a path, `failed` implies an error and no path,
/// `placeholder` means no generation was attempted.
#[derive(Debug, Clone, Serialize)]
pub struct AssetEntry {
    pub path: Option<String>,
    pub provider: Provider,
    pub status: AssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssetEntry {
    pub fn generated(path: impl Into<String>, prompt: &str, provider: Provider) -> Self {
        Self {
            path: Some(path.into()),
            provider,
            status: AssetStatus::Generated,
            prompt: Some(prompt.to_string()),
            error: None,
        }
    }

    pub fn failed(prompt: &str, provider: Provider, error: impl Into<String>) -> Self {
        Self {
            path: None,
            provider,
            status: AssetStatus::Failed,
            prompt: Some(prompt.to_string()),
            error: Some(error.into()),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            path: None,
            provider: Provider::Local,
            status: AssetStatus::Placeholder,
            prompt: None,
            error: None,
        }
    }

    fn from_outcome(outcome: Option<&JobOutcome>, prompt: &str, provider: Provider) -> Self {
        match outcome {
            Some(JobOutcome::Fulfilled(path)) => Self::generated(path.clone(), prompt, provider),
            Some(JobOutcome::Rejected(reason)) => Self::failed(prompt, provider, reason.clone()),
            None => Self::placeholder(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureIconEntries {
    pub wallet: AssetEntry,
    pub shield: AssetEntry,
    pub rocket: AssetEntry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAssets {
    pub logo: AssetEntry,
    pub hero_image: AssetEntry,
    pub feature_icons: FeatureIconEntries,
    pub portfolio_images: Vec<AssetEntry>,
    pub scroll_sequence_images: Vec<AssetEntry>,
    pub hero_video: AssetEntry,
    pub showcase_video: AssetEntry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    pub brief: String,
    pub generated_at: String,
    pub assets: ManifestAssets,
}

/// Map the settled outcomes onto the fixed slot schema. Pure: the only
/// ambient input is the assembly timestamp.
pub fn assemble_manifest(
    brief: &str,
    prompts: &PromptConfig,
    outcomes: &BTreeMap<String, JobOutcome>,
) -> AssetManifest {
    let recraft = |key: &str, prompt: &str| {
        AssetEntry::from_outcome(outcomes.get(key), prompt, Provider::Recraft)
    };
    let runway = |key: &str, prompt: &str| {
        AssetEntry::from_outcome(outcomes.get(key), prompt, Provider::Runway)
    };

    AssetManifest {
        brief: brief.to_string(),
        generated_at: sitegen_core::now_iso8601(),
        assets: ManifestAssets {
            logo: recraft("logo", &prompts.recraft.logo),
            hero_image: recraft("heroImage", &prompts.recraft.hero_image),
            feature_icons: FeatureIconEntries {
                wallet: recraft("featureWallet", &prompts.recraft.feature_icons.wallet),
                shield: recraft("featureShield", &prompts.recraft.feature_icons.shield),
                rocket: recraft("featureRocket", &prompts.recraft.feature_icons.rocket),
            },
            portfolio_images: prompts
                .recraft
                .portfolio_images
                .iter()
                .enumerate()
                .map(|(i, prompt)| recraft(&format!("portfolio{}", i), prompt))
                .collect(),
            scroll_sequence_images: prompts
                .recraft
                .scroll_sequence_images
                .iter()
                .enumerate()
                .map(|(i, prompt)| recraft(&format!("scrollSequence{}", i), prompt))
                .collect(),
            hero_video: runway("heroVideo", &prompts.runway.hero_video),
            showcase_video: runway("showcaseVideo", &prompts.runway.showcase_video),
        },
    }
}

/// Write the manifest as a TypeScript module the presentation layer imports
/// statically — the manifest is never re-parsed at runtime.
pub fn write_manifest_module(manifest: &AssetManifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(manifest)?;
    let source = format!(
        "import type {{ AssetManifest }} from '@/lib/template-config';\n\nexport const assetManifest: AssetManifest = {};\n",
        json
    );
    std::fs::write(path, source)?;
    Ok(())
}
