//! End-to-end asset generation pipeline
//!
//! Loads the generation config, fans every asset slot out as a concurrent
//! job, and writes the manifest module no matter how many jobs failed. Each
//! job builds its own provider client so a missing credential fails that
//! job alone rather than the whole run.

use crate::config::GenerationConfig;
use crate::manifest::{assemble_manifest, write_manifest_module, AssetManifest};
use crate::persist::AssetStore;
use crate::providers::recraft::RecraftClient;
use crate::providers::runway::{PollOptions, RunwayClient, VideoRequest};
use crate::runner::{log_summary, run_all, GenerationJob};
use crate::svg::DEFAULT_THEME_TEXT_COLOR;
use sitegen_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

const GENERATION_CONFIG_FILE: &str = "generation-config.json";
const OUTPUT_SUBDIR: &str = "generated";
const MANIFEST_RELATIVE_PATH: &str = "src/lib/asset-manifest.ts";
const MARKETING_IMAGE_SIZE: &str = "1536x1024";
const VIDEO_POLL_INTERVAL_MS: u64 = 10_000;
const VIDEO_TIMEOUT_MS: u64 = 300_000;

/// Full-site asset generation, rooted at a template project directory.
pub struct AssetPipeline {
    root: PathBuf,
}

impl AssetPipeline {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run every generation job and write the manifest. Only config load
    /// and manifest write failures abort; job failures are recorded in the
    /// manifest and reported in the summary.
    pub fn run(&self, skip_logo: bool) -> Result<AssetManifest> {
        let config = GenerationConfig::load(&self.root.join(GENERATION_CONFIG_FILE))?;
        let store = Arc::new(AssetStore::new(self.root.join("public"), OUTPUT_SUBDIR));
        store.ensure_output_dir()?;

        let jobs = build_jobs(&config, &store, skip_logo);
        println!(
            "[generate-assets] Running {} generation jobs for brief: {}",
            jobs.len(),
            config.brief
        );

        let outcomes = run_all(jobs);

        for (key, outcome) in &outcomes {
            if let crate::runner::JobOutcome::Rejected(reason) = outcome {
                eprintln!("[generate-assets] {} failed: {}", key, reason);
            }
        }

        let manifest = assemble_manifest(&config.brief, &config.prompts, &outcomes);
        let manifest_path = self.root.join(MANIFEST_RELATIVE_PATH);
        write_manifest_module(&manifest, &manifest_path)?;

        println!(
            "[generate-assets] Manifest updated at {}",
            manifest_path.display()
        );
        println!("[generate-assets] Task summary:");
        log_summary(&outcomes);

        Ok(manifest)
    }
}

fn build_jobs(
    config: &GenerationConfig,
    store: &Arc<AssetStore>,
    skip_logo: bool,
) -> Vec<GenerationJob> {
    let mut jobs = Vec::new();
    let video_options = PollOptions {
        poll_interval_ms: VIDEO_POLL_INTERVAL_MS,
        timeout_ms: VIDEO_TIMEOUT_MS,
    };

    let svg_job = |key: &str, prompt: String, stem: &'static str, store: Arc<AssetStore>| {
        GenerationJob::new(key, move || {
            let client = RecraftClient::from_env()?;
            let result = client.generate_svg(&prompt)?;
            store.persist_recraft_result(&result, stem, DEFAULT_THEME_TEXT_COLOR)
        })
    };

    let image_job = |key: String, prompt: String, stem: String, store: Arc<AssetStore>| {
        GenerationJob::new(key, move || {
            let client = RecraftClient::from_env()?;
            let result = client.generate_image(&prompt, MARKETING_IMAGE_SIZE)?;
            store.persist_recraft_result(&result, &stem, DEFAULT_THEME_TEXT_COLOR)
        })
    };

    let video_job = |key: &str, prompt: String, stem: &'static str, store: Arc<AssetStore>| {
        let options = video_options.clone();
        GenerationJob::new(key, move || {
            let client = RunwayClient::from_env()?;
            let task = client.generate_video(&VideoRequest::text(prompt.clone()), &options)?;
            store.persist_runway_result(&task, stem)
        })
    };

    let recraft = &config.prompts.recraft;

    if skip_logo {
        println!("[generate-assets] Skipping logo (--skip-logo flag)");
    } else {
        jobs.push(svg_job("logo", recraft.logo.clone(), "logo", store.clone()));
    }

    jobs.push(image_job(
        "heroImage".to_string(),
        recraft.hero_image.clone(),
        "hero-image".to_string(),
        store.clone(),
    ));

    jobs.push(svg_job(
        "featureWallet",
        recraft.feature_icons.wallet.clone(),
        "feature-wallet",
        store.clone(),
    ));
    jobs.push(svg_job(
        "featureShield",
        recraft.feature_icons.shield.clone(),
        "feature-shield",
        store.clone(),
    ));
    jobs.push(svg_job(
        "featureRocket",
        recraft.feature_icons.rocket.clone(),
        "feature-rocket",
        store.clone(),
    ));

    for (i, prompt) in recraft.portfolio_images.iter().enumerate() {
        jobs.push(image_job(
            format!("portfolio{}", i),
            prompt.clone(),
            format!("portfolio-{}", i),
            store.clone(),
        ));
    }

    for (i, prompt) in recraft.scroll_sequence_images.iter().enumerate() {
        jobs.push(image_job(
            format!("scrollSequence{}", i),
            prompt.clone(),
            format!("scroll-sequence-{}", i),
            store.clone(),
        ));
    }

    jobs.push(video_job(
        "heroVideo",
        config.prompts.runway.hero_video.clone(),
        "hero-video",
        store.clone(),
    ));
    jobs.push(video_job(
        "showcaseVideo",
        config.prompts.runway.showcase_video.clone(),
        "showcase-video",
        store.clone(),
    ));

    jobs
}
