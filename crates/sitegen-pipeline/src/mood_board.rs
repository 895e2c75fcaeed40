//! Mood-board image generation
//!
//! Sibling of the main pipeline: one square Recraft image per design
//! direction in `mood-board-options.json`, with the results written back
//! into that same file. Only the image block of each option is touched;
//! the design tokens ride along untouched.

use crate::config::{MoodBoardConfig, MoodBoardImage, MoodBoardOption};
use crate::manifest::AssetStatus;
use crate::persist::AssetStore;
use crate::providers::recraft::RecraftClient;
use crate::runner::{run_all, GenerationJob, JobOutcome};
use sitegen_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

const MOOD_BOARD_CONFIG_FILE: &str = "mood-board-options.json";
const MOOD_BOARD_SUBDIR: &str = "mood-boards";
const MOOD_BOARD_IMAGE_SIZE: &str = "1024x1024";

/// Mood-board generation, rooted at a template project directory.
pub struct MoodBoardPipeline {
    root: PathBuf,
}

impl MoodBoardPipeline {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Generate one board per option and rewrite the options file. Per-option
    /// failures are recorded on the option; only config IO aborts the run.
    pub fn run(&self) -> Result<MoodBoardConfig> {
        let config_path = self.root.join(MOOD_BOARD_CONFIG_FILE);
        let mut config = MoodBoardConfig::load(&config_path)?;

        if std::env::var("RECRAFT_API_TOKEN")
            .map(|t| t.is_empty())
            .unwrap_or(true)
        {
            eprintln!(
                "[mood-boards] RECRAFT_API_TOKEN is not set; all boards will fail."
            );
        }

        let store = Arc::new(AssetStore::new(self.root.join("public"), MOOD_BOARD_SUBDIR));
        store.ensure_output_dir()?;

        println!(
            "[mood-boards] Generating {} mood boards for brief: {}",
            config.options.len(),
            config.brief
        );

        let jobs: Vec<GenerationJob> = config
            .options
            .iter()
            .map(|option| {
                let prompt = option.mood_board_image.prompt.clone();
                let stem = option.id.clone();
                let store = store.clone();
                GenerationJob::new(option.id.clone(), move || {
                    let client = RecraftClient::from_env()?;
                    let result = client.generate_image(&prompt, MOOD_BOARD_IMAGE_SIZE)?;
                    store.persist_mood_board_result(&result, &stem)
                })
            })
            .collect();

        let outcomes = run_all(jobs);

        for option in &mut config.options {
            if let Some(outcome) = outcomes.get(&option.id) {
                apply_outcome(option, outcome);
            }
        }

        config.save(&config_path)?;
        println!("[mood-boards] Options updated at {}", config_path.display());
        println!("[mood-boards] Board summary:");
        for option in &config.options {
            let image = &option.mood_board_image;
            match image.status {
                AssetStatus::Generated => println!(
                    "  - {}: {} -> {}",
                    option.id,
                    image.status,
                    image.path.as_deref().unwrap_or("")
                ),
                _ => println!(
                    "  - {}: {} -> {}",
                    option.id,
                    image.status,
                    image.error.as_deref().unwrap_or("")
                ),
            }
        }

        Ok(config)
    }
}

/// A fulfilled job replaces the path and clears any stale error from a
/// previous run; a rejected job keeps the old path so a board generated
/// earlier is not lost to a transient failure.
fn apply_outcome(option: &mut MoodBoardOption, outcome: &JobOutcome) {
    let image: &mut MoodBoardImage = &mut option.mood_board_image;
    match outcome {
        JobOutcome::Fulfilled(path) => {
            image.path = Some(path.clone());
            image.status = AssetStatus::Generated;
            image.error = None;
        }
        JobOutcome::Rejected(reason) => {
            image.status = AssetStatus::Failed;
            image.error = Some(reason.clone());
        }
    }
}
