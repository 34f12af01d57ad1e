//! # docsift CLI
//!
//! Extract text from PDFs and images, optionally with a remote AI pass that
//! also returns structured fields.
//!
//! ## Commands
//!
//! - `docsift extract <FILE>` - Run standard extraction
//! - `docsift extract <FILE> --method ai` - Also run the AI pass (falls back to standard text on failure)
//! - `docsift config show|init|path` - Inspect configuration
//!
//! ## Examples
//!
//! ```bash
//! # OCR a scan
//! docsift extract receipt.png
//!
//! # Structured fields as JSON
//! DOCSIFT_AI_API_KEY=sk-... docsift --format json extract invoice.jpg --method ai
//!
//! # Override the declared type
//! docsift extract upload.bin --mime application/pdf
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsift_ai::{AiPipeline, ChatCompletionClient};
use docsift_core::{MergedResult, ProcessingMethod};
use docsift_extract::{OcrPool, StandardPipeline, TesseractEngine};
use docsift_pipeline::{stage_upload, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "docsift")]
#[command(about = "Extract text and structured fields from PDFs and images")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/docsift/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a document
    Extract {
        /// PDF, JPEG or PNG file
        file: PathBuf,

        /// Declared MIME type (default: inferred from the extension)
        #[arg(short, long)]
        mime: Option<String>,

        /// Processing method (standard, ai)
        #[arg(long, default_value = "standard")]
        method: ProcessingMethod,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Build the orchestrator; AI is left out when no API key is configured.
fn create_orchestrator(config: &Config, method: ProcessingMethod) -> Orchestrator {
    let engine = TesseractEngine::new(&config.ocr.binary);
    let pool = OcrPool::new(Arc::new(engine), config.ocr.to_ocr_config());
    let standard = StandardPipeline::new(Arc::new(pool));

    let ai_config = config.ai.to_ai_config();
    let ai = match ChatCompletionClient::new(&ai_config) {
        Ok(client) => {
            info!("AI extraction enabled with model {}", ai_config.model);
            Some(AiPipeline::with_timeout(Arc::new(client), ai_config.timeout))
        }
        Err(e) => {
            if method == ProcessingMethod::Ai {
                warn!("AI extraction unavailable: {}", e);
            }
            None
        }
    };

    Orchestrator::new(standard, ai)
}

fn print_text(result: &MergedResult) -> Result<()> {
    if let Some(ai) = &result.ai_extracted_data {
        if ai.error_occurred {
            println!("AI extraction failed; showing standard text.\n");
        }
        println!("Structured data:");
        println!(
            "{}\n",
            serde_json::to_string_pretty(&ai.structured_data)
                .context("Failed to serialize structured data")?
        );
    }

    println!("{}", result.raw_extracted_text);
    println!("\n({} ms)", result.processing_time);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(Some(path.clone()))
            .context(format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };

    // Setup logging; RUST_LOG overrides the configured level
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Extract { file, mime, method } => {
            let staged = match stage_upload(&file, mime.as_deref(), &config.intake.to_intake_config())
                .await
            {
                Ok(staged) => staged,
                Err(e) => {
                    warn!("Rejected {} ({:?}): {}", file.display(), e.kind(), e);
                    return Err(e)
                        .with_context(|| format!("Cannot accept {}", file.display()));
                }
            };
            info!(
                "Accepted {} ({} bytes, {})",
                file.display(),
                staged.size(),
                staged.mime_type()
            );

            let orchestrator = create_orchestrator(&config, method);
            debug!("AI pipeline enabled: {}", orchestrator.ai_enabled());
            let result = orchestrator
                .process(&staged.to_input(method))
                .await
                .with_context(|| format!("Extraction failed for {}", file.display()))?;

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&result)
                            .context("Failed to serialize result")?
                    );
                }
                OutputFormat::Text => print_text(&result)?,
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = config.redacted();
                match cli.format {
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&config)
                                .context("Failed to serialize config")?
                        );
                    }
                    OutputFormat::Text => {
                        println!(
                            "{}",
                            toml::to_string_pretty(&config)
                                .context("Failed to serialize config")?
                        );
                    }
                }
            }
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}
