//! textlens CLI - analyze text with an LLM and print the normalized result

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use textlens::format::{format_result, FormatOptions};
use textlens::settings::{resolve_settings, KindSelection, Overrides};
use textlens_agent::AnalysisSession;
use textlens_core::config::expand_tilde;
use textlens_core::{normalize, AnalysisKind, ProviderKind, TextlensConfig};
use textlens_llm::{create_provider, system_prompt, Provider};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "textlens",
    about = "Turn free-form text into timelines, insights, financial tables and party profiles"
)]
struct Cli {
    /// Config file (default: ~/.textlens/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or all analyses over a text
    Analyze {
        /// Input text file (default: stdin)
        file: Option<PathBuf>,
        /// timeline, insights, financial, party, or all
        #[arg(short, long, default_value = "all")]
        kind: KindSelection,
        /// openai or mistral
        #[arg(short, long)]
        provider: Option<ProviderKind>,
        /// Model id, overriding the provider default
        #[arg(short, long)]
        model: Option<String>,
        /// Print normalized JSON instead of the rendered views
        #[arg(long)]
        json: bool,
        /// Don't cut long table cells
        #[arg(long)]
        raw: bool,
    },
    /// Print the system instruction sent for an analysis kind
    Prompt {
        #[arg(short, long)]
        kind: AnalysisKind,
        #[arg(short, long)]
        provider: Option<ProviderKind>,
    },
    /// Normalize a saved raw completion without calling a provider
    Normalize {
        #[arg(short, long)]
        kind: AnalysisKind,
        /// Raw completion file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textlens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            kind,
            provider,
            model,
            json,
            raw,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let overrides = Overrides { provider, model };
            let text = read_input(file.as_deref())?;
            run_analyze(&config, &overrides, text, kind, json, raw).await
        }
        Commands::Prompt { kind, provider } => {
            let provider = match provider {
                Some(p) => p,
                None => load_config(cli.config.as_deref())?.default_provider()?,
            };
            println!("{}", system_prompt(provider, kind));
            Ok(())
        }
        Commands::Normalize { kind, file } => {
            let raw = read_input(file.as_deref())?;
            let result = normalize(kind, &raw)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Version => {
            println!("textlens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_analyze(
    config: &TextlensConfig,
    overrides: &Overrides,
    text: String,
    selection: KindSelection,
    json: bool,
    raw: bool,
) -> anyhow::Result<()> {
    let settings = resolve_settings(config, overrides)?;
    let provider: Arc<dyn Provider> = Arc::from(create_provider(settings)?);
    let source = format!("{}/{}", provider.name(), provider.model());
    info!("Analyzing {} chars with {} ({})", text.len(), source, selection);

    let session = AnalysisSession::with_text(provider, text);
    let kinds = selection.kinds();
    let mut results = Vec::new();
    let mut failed = 0;

    for kind in &kinds {
        match session.analyze(*kind).await {
            Ok(result) => results.push(result),
            Err(e) if kinds.len() == 1 => return Err(e.into()),
            Err(e) => {
                error!("{} analysis failed: {}", kind, e);
                failed += 1;
            }
        }
    }

    if json {
        let value = match (selection, results.as_slice()) {
            (KindSelection::One(_), [only]) => only.to_json()?,
            _ => {
                let mut all = serde_json::Map::new();
                for result in &results {
                    all.insert(result.kind().as_str().to_string(), result.to_json()?);
                }
                serde_json::Value::Object(all)
            }
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let opts = FormatOptions {
            source: Some(source),
            raw,
            ..Default::default()
        };
        for result in &results {
            println!("{}", format_result(result, &opts));
        }
    }

    if failed > 0 {
        bail!("{} of {} analyses failed", failed, kinds.len());
    }
    Ok(())
}

fn load_config(path: Option<&str>) -> anyhow::Result<TextlensConfig> {
    let config = match path {
        Some(p) => TextlensConfig::load(&expand_tilde(p))?,
        None => TextlensConfig::discover()?,
    };
    Ok(config)
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
