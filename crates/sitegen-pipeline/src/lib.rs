//! Sitegen Pipeline - asset generation for landing-page templates
//!
//! Two external providers feed a concurrent job runner: Recraft generates
//! images and SVGs synchronously, Runway generates video through an async
//! create-then-poll task protocol. Per-job outcomes are collected with
//! failure isolation and assembled into an asset manifest the presentation
//! layer imports; a sibling pipeline writes mood-board images back into the
//! option store it read them from.

pub mod config;
pub mod manifest;
pub mod mood_board;
pub mod persist;
pub mod pipeline;
pub mod providers;
pub mod runner;
pub mod svg;

pub use config::{GenerationConfig, MoodBoardConfig, PromptConfig};
pub use manifest::{assemble_manifest, AssetEntry, AssetManifest, AssetStatus, Provider};
pub use mood_board::MoodBoardPipeline;
pub use persist::AssetStore;
pub use pipeline::AssetPipeline;
pub use providers::recraft::RecraftClient;
pub use providers::runway::{CompletedTask, PollOptions, RunwayClient};
pub use providers::NormalizedResult;
pub use runner::{run_all, GenerationJob, JobOutcome};
