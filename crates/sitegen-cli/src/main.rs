//! Sitegen CLI - command-line entry points for the asset pipelines

use clap::{Parser, Subcommand};
use sitegen_pipeline::providers::runway::{PollOptions, RunwayClient};
use sitegen_pipeline::{AssetPipeline, MoodBoardPipeline};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sitegen")]
#[command(about = "Asset generation for landing-page templates", long_about = None)]
#[command(version)]
struct Cli {
    /// Template project root (holds generation-config.json, public/, src/)
    #[arg(long, global = true, default_value = ".")]
    root: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every site asset and write the manifest module
    GenerateAssets {
        /// Keep the existing logo instead of regenerating it
        #[arg(long)]
        skip_logo: bool,
    },

    /// Generate one mood-board image per design direction
    GenerateMoodBoards,

    /// Poll an existing Runway task until it finishes
    PollTask {
        /// Runway task id
        task_id: String,

        /// Milliseconds between status fetches
        #[arg(long, default_value_t = 5_000)]
        poll_interval_ms: u64,

        /// Overall wall-clock budget in milliseconds
        #[arg(long, default_value_t = 120_000)]
        timeout_ms: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateAssets { skip_logo } => {
            match AssetPipeline::new(&cli.root).run(skip_logo) {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("[generate-assets] Fatal failure: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::GenerateMoodBoards => match MoodBoardPipeline::new(&cli.root).run() {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("[mood-boards] Fatal failure: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::PollTask {
            task_id,
            poll_interval_ms,
            timeout_ms,
        } => {
            let options = PollOptions {
                poll_interval_ms,
                timeout_ms,
            };
            let result = RunwayClient::from_env()
                .and_then(|client| client.poll_task(&task_id, &options));

            match result {
                Ok(task) => {
                    println!("Runway task complete:");
                    match serde_json::to_string_pretty(&task) {
                        Ok(json) => println!("{}", json),
                        Err(e) => {
                            eprintln!("Runway task polling failed: {}", e);
                            return ExitCode::FAILURE;
                        }
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Runway task polling failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
