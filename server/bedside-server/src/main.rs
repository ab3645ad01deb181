use std::net::SocketAddr;

use clap::Parser;
use tracing::{info, warn};

use bedside_server::{create_app, server::janitor_interval, AppState};
use error_common::{BedsideError, Result};
use logger_redacted::{init_tracing, LoggerConfig};
use voice_note_pipeline::PipelineConfig;

const DEFAULT_FILTER: &str = "bedside_server=info,voice_note_pipeline=info,tower_http=info,audit=info";
const VERBOSE_FILTER: &str = "bedside_server=debug,voice_note_pipeline=debug,tower_http=debug,audit=info";

/// Bedside voice note HTTP server
#[derive(Parser, Debug)]
#[command(name = "bedside-server")]
#[command(about = "Transcribes bedside voice notes and routes them to navigation or structuring")]
struct Args {
    /// Server bind address
    #[arg(long, env = "BEDSIDE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "BEDSIDE_PORT", default_value = "3000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let environment = std::env::var("BEDSIDE_ENV").unwrap_or_else(|_| "development".to_string());
    let filter = if args.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    init_tracing(&LoggerConfig::for_environment(&environment, filter))?;

    info!(version = env!("CARGO_PKG_VERSION"), environment = %environment, "Starting bedside voice server");

    let config = PipelineConfig::from_env()?;
    info!(
        transcription_url = %config.transcription.api_url,
        structuring_url = %config.structuring.api_url,
        default_bed = config.context_defaults.bed,
        require_context = config.context_defaults.require_context,
        "Pipeline configured"
    );

    let state = AppState::from_config(&config)?;

    match config.session_ttl {
        Some(ttl) => {
            let every = janitor_interval(ttl);
            info!(ttl_secs = ttl.as_secs(), purge_every_secs = every.as_secs(), "Session TTL enabled");
            state.spawn_session_janitor(every);
        }
        None => warn!("Session TTL disabled; session memory grows until cleared"),
    }

    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| BedsideError::ConfigError(format!("Invalid bind address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BedsideError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(address = %addr, "Bedside voice server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| BedsideError::ServerError(format!("HTTP server error: {}", e)))
}
