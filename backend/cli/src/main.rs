mod api;
mod config;
mod cors;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use shipcheck_core::{inspect_batch, ImageUpload, InspectionError};
use shipcheck_logging::init_logger;
use shipcheck_vision::OpenAiVisionClient;

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "shipcheck")]
#[command(about = "ShipCheck: vessel inspection photo relay for vision models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP relay
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask a running relay for its health
    Status,
    /// Inspect local image files and print the verdicts as JSON
    Inspect {
        /// Image files, inspected one at a time in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_logger(&config.log_level, config.log_format, config.log_dir.as_deref());

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .post(format!("http://localhost:{}/api/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("ShipCheck is not running on port {}", config.port);
                }
            }
        }
        Commands::Inspect { files } => inspect_files(&config, &files).await?,
    }

    Ok(())
}

fn vision_client(config: &Config) -> Result<OpenAiVisionClient> {
    Ok(OpenAiVisionClient::new(&config.api_key, &config.model)?
        .with_base_url(&config.api_base_url))
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        model = %config.model,
        credential = config.has_api_key(),
        origins = ?config.allowed_origins,
        "Starting ShipCheck relay"
    );

    let client = Arc::new(vision_client(&config)?);
    let addr = format!("{}:{}", config.bind_address, config.port);

    let app_state = Arc::new(AppState {
        config: Arc::new(config),
        client,
    });
    let app = api::build_router(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ShipCheck relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

async fn inspect_files(config: &Config, files: &[PathBuf]) -> Result<()> {
    if !config.has_api_key() {
        let payload = serde_json::json!({ "error": InspectionError::MissingCredential.to_string() });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        uploads.push(ImageUpload::new(filename, bytes));
    }

    let client = vision_client(config)?;
    let report = inspect_batch(&client, &uploads).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
