//! Lyricforge CLI
//!
//! Headless entry points over the core engine: parse caption documents,
//! inspect compiled filter chains, and run the full render pipeline.
//! Results go to stdout as JSON; diagnostics go to stderr via `tracing`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use lyricforge_core::captions::{formats, sample_cues, CaptionCue};
use lyricforge_core::config::AppConfig;
use lyricforge_core::new_request_id;
use lyricforge_core::overlay::OverlayChain;
use lyricforge_core::render::{FfmpegEngine, RenderOrchestrator, RenderRequest};
use lyricforge_core::storage::{
    HttpObjectStore, HttpProjectStore, ObjectStore, ProjectRecord, ProjectStore, ResourceKind,
};
use lyricforge_core::style::{ResolvedStyle, StyleConfig};

#[derive(Parser)]
#[command(name = "lyricforge", version, about = "Caption-overlay video rendering")]
struct Cli {
    /// Explicit config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ParseFormat {
    Json,
    Srt,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an SRT document and print its cues
    Parse {
        /// Caption file to parse
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ParseFormat,
    },

    /// Print the built-in sample cues
    Sample,

    /// Compile captions + style into a filter chain and print it
    Compile {
        /// Caption file; the sample cues are used when omitted
        file: Option<PathBuf>,
        /// Style preset as inline JSON
        #[arg(long)]
        style: Option<String>,
    },

    /// Run the full render pipeline
    Render {
        /// Fetchable URL of the source video
        #[arg(long)]
        video_url: String,
        /// Caption file; the sample cues are used when omitted
        #[arg(long)]
        srt: Option<PathBuf>,
        /// Style preset as inline JSON
        #[arg(long)]
        style: Option<String>,
        /// Project record to update with the final URL
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Show the most recent project record
    Latest,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::from_file(path);
            config.apply_env();
            config.normalize();
            config
        }
        None => AppConfig::load(),
    };

    match cli.command {
        Command::Parse { file, format } => {
            let cues = read_cues(&file)?;
            print_cues(&cues, format)?;
        }

        Command::Sample => {
            print_cues(&sample_cues(), ParseFormat::Json)?;
        }

        Command::Compile { file, style } => {
            let cues = match file {
                Some(path) => read_cues(&path)?,
                None => sample_cues(),
            };
            anyhow::ensure!(!cues.is_empty(), "no cues to compile");

            let style_config = parse_style(style.as_deref())?;
            let resolved = ResolvedStyle::resolve(&style_config)?;
            let chain = OverlayChain::compile(&cues, &resolved);

            println!("{}", chain.to_filter_complex());
            tracing::info!(ops = chain.len(), final_label = %chain.final_label(), "chain compiled");
        }

        Command::Render {
            video_url,
            srt,
            style,
            project_id,
        } => {
            let style = parse_style(style.as_deref())?;

            let engine = FfmpegEngine::from_system().context("FFmpeg is required for rendering")?;
            let object_store = Arc::new(
                HttpObjectStore::new(&config.object_store).context("object store not usable")?,
            );
            let project_store: Option<Arc<dyn ProjectStore>> = match &config.project_store {
                Some(store_config) => Some(Arc::new(HttpProjectStore::new(store_config)?)),
                None => None,
            };

            let lyrics = match &srt {
                Some(path) => {
                    let contents = std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let cues = formats::parse_srt(&contents);
                    // Keep the caption document itself next to the render output.
                    match object_store
                        .upload(
                            contents.into_bytes(),
                            ResourceKind::Raw,
                            "lyricforge/subtitles",
                        )
                        .await
                    {
                        Ok(receipt) => tracing::info!(url = %receipt.url, "caption document stored"),
                        Err(e) => tracing::warn!("caption document upload failed (ignored): {}", e),
                    }
                    cues
                }
                None => sample_cues(),
            };

            // Bookkeeping record for renders that did not come in with one.
            // Creation failure is non-fatal; the render proceeds untracked.
            let project_id = match (project_id, &project_store) {
                (Some(id), _) => Some(id),
                (None, Some(store)) => {
                    let record = ProjectRecord::new(
                        &new_request_id(),
                        &video_url,
                        lyrics.clone(),
                        style.clone(),
                    );
                    match store.create(&record).await {
                        Ok(()) => Some(record.id),
                        Err(e) => {
                            tracing::warn!("project record creation failed (ignored): {}", e);
                            None
                        }
                    }
                }
                (None, None) => None,
            };

            let orchestrator = RenderOrchestrator::new(
                Arc::new(engine),
                object_store.clone(),
                project_store,
                config.render.clone(),
            )?;

            let request = RenderRequest {
                video_url,
                lyrics,
                style,
                project_id,
            };

            match orchestrator.render(request).await {
                Ok(outcome) => {
                    println!("{}", serde_json::to_string(&outcome)?);
                }
                Err(e) => {
                    eprintln!(
                        "{}",
                        serde_json::json!({ "error": e.to_string() })
                    );
                    std::process::exit(if e.is_client_error() { 2 } else { 1 });
                }
            }
        }

        Command::Latest => {
            let store_config = config
                .project_store
                .as_ref()
                .context("project store is not configured")?;
            let store = HttpProjectStore::new(store_config)?;
            match store.latest().await? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("null"),
            }
        }
    }

    Ok(())
}

fn read_cues(path: &PathBuf) -> Result<Vec<CaptionCue>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(formats::parse_srt(&contents))
}

fn parse_style(style: Option<&str>) -> Result<StyleConfig> {
    match style {
        Some(json) => serde_json::from_str(json).context("invalid style JSON"),
        None => Ok(StyleConfig::default()),
    }
}

fn print_cues(cues: &[CaptionCue], format: ParseFormat) -> Result<()> {
    match format {
        ParseFormat::Json => println!("{}", serde_json::to_string_pretty(cues)?),
        ParseFormat::Srt => println!("{}", formats::export_srt(cues)),
    }
    Ok(())
}
