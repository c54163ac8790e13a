//! RFQ Settlement Server
//!
//! Main entry point for the sealed-bid RFQ settlement service.
//!
//! This server:
//! - Compiles the best-quote circuit for the configured shape
//! - Loads (or generates) its Groth16 keys
//! - Exposes HTTP endpoints for proving rounds and verifying proofs
//!
//! ## Usage
//!
//! ```bash
//! # Serve with keys in ./keys (generated on first start)
//! cargo run -p rfq-domain -- --port 3335
//!
//! # Generate keys only
//! cargo run -p rfq-domain -- setup --out keys
//!
//! # Run the reference scenarios locally
//! cargo run -p rfq-domain -- demo
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::{Parser, Subcommand};
use rfq_models::{RoundId, RoundReceipt};
use rfq_prover::{ProofArtifact, RoundSubmission};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api_types;
mod config;
mod demo;
mod settlement;
mod state;

use api_types::{ApiCircuitInfo, ApiError, ApiVerifyResponse};
use config::DomainConfig;
use settlement::Settlement;
use state::DomainState;

/// CLI arguments
#[derive(Parser)]
#[command(name = "rfq-domain")]
#[command(about = "RFQ settlement - best-quote proofs for sealed-bid bond RFQs")]
struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "domain.yaml")]
    config: PathBuf,

    /// Port for the HTTP API server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of quotes per round (overrides config)
    #[arg(short, long)]
    quotes: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Generate keys for the configured shape and exit
    Setup {
        /// Output directory (defaults to the configured key directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Fixed seed for reproducible keys
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the reference scenarios end to end and log their outcomes
    Demo,
}

/// Application state shared across handlers
pub struct AppState {
    /// Settled rounds
    pub domain: Arc<DomainState>,
    /// Circuit, keys and proving limits
    pub settlement: Settlement,
    /// Configuration
    pub config: DomainConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rfq_domain=debug".into()),
        )
        .init();

    // Parse CLI args
    let args = CliArgs::parse();

    // Load configuration
    let mut config = if args.config.exists() {
        DomainConfig::load_from(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        tracing::warn!("Config file {:?} not found, using defaults", args.config);
        DomainConfig::default()
    };

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.api_port = port;
    }
    if let Some(quotes) = args.quotes {
        config.quotes = quotes;
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Setup { out, seed } => {
            let shape = config.shape()?;
            let out = out.unwrap_or_else(|| config.key_dir.clone());
            let seed = seed.or(config.setup_seed);
            tokio::task::spawn_blocking(move || -> Result<()> {
                let compiled = rfq_prover::compile(shape)?;
                let keys = settlement::run_setup(&compiled, seed)?;
                keys.save(&out)
                    .with_context(|| format!("Failed to save keys to {:?}", out))?;
                tracing::info!("Keys {} written to {:?}", keys.fingerprint(), out);
                Ok(())
            })
            .await?
        }
        Command::Demo => demo::run(&config).await,
    }
}

async fn serve(config: DomainConfig) -> Result<()> {
    tracing::info!("Starting RFQ Settlement Server...");

    let shape = config.shape()?;
    tracing::info!(
        "Configuration: shape=({}), port={}, key_dir={:?}, allow_negative_quotes={}",
        shape,
        config.api_port,
        config.key_dir,
        config.allow_negative_quotes
    );

    // Compile and load keys off the async runtime
    let key_dir = config.key_dir.clone();
    let seed = config.setup_seed;
    let (compiled, keys) =
        tokio::task::spawn_blocking(move || settlement::load_or_setup(shape, &key_dir, seed))
            .await??;

    // Create application state
    let state = Arc::new(AppState {
        domain: DomainState::new(),
        settlement: Settlement {
            compiled,
            keys: Arc::new(keys),
            policy: config.encoding_policy(),
            timeout: Duration::from_secs(config.prove_timeout_secs),
        },
        config: config.clone(),
    });

    let app = router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.api_port);
    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /circuit             - Circuit shape and key fingerprint");
    tracing::info!("  POST /rounds              - Prove a round");
    tracing::info!("  GET  /rounds/:id          - Get a round receipt");
    tracing::info!("  GET  /rounds/:id/artifact - Get a round's proof artifact");
    tracing::info!("  POST /verify              - Verify a proof artifact");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/circuit", get(circuit_info))
        // Round endpoints
        .route("/rounds", post(submit_round))
        .route("/rounds/:id", get(get_round))
        .route("/rounds/:id/artifact", get(get_artifact))
        .route("/verify", post(verify_proof))
        .layer(TraceLayer::new_for_http())
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (rounds, proven) = state.domain.counts().await;
    Json(serde_json::json!({
        "status": "ok",
        "quotes": state.config.quotes,
        "rounds": rounds,
        "proven": proven,
    }))
}

/// Describe the compiled circuit
async fn circuit_info(State(state): State<Arc<AppState>>) -> Json<ApiCircuitInfo> {
    Json(ApiCircuitInfo::new(
        &state.settlement.compiled,
        &state.settlement.keys,
    ))
}

/// Prove a round
async fn submit_round(
    State(state): State<Arc<AppState>>,
    Json(round): Json<RoundSubmission>,
) -> Result<Json<RoundReceipt>, (StatusCode, Json<ApiError>)> {
    tracing::info!(
        "Round submitted for {}: {} quotes, accepted {}",
        round.bond,
        round.quotes.len(),
        round.accepted_price
    );

    let (receipt, artifact) = state.settlement.settle(round).await.map_err(|e| {
        tracing::info!("Round refused at ingestion: {}", e);
        (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiError::from(&e)))
    })?;

    state.domain.add_receipt(receipt.clone(), artifact).await;
    Ok(Json(receipt))
}

/// Get a round receipt
async fn get_round(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RoundId>,
) -> Result<Json<RoundReceipt>, StatusCode> {
    state
        .domain
        .get_receipt(&id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Get the proof artifact of a proven round
async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RoundId>,
) -> Result<Json<ProofArtifact>, StatusCode> {
    state
        .domain
        .get_artifact(&id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Verify a proof artifact against this service's verifying key
async fn verify_proof(
    State(state): State<Arc<AppState>>,
    Json(artifact): Json<ProofArtifact>,
) -> Json<ApiVerifyResponse> {
    let result = state.settlement.verify(artifact).await;
    if let Err(e) = &result {
        tracing::debug!("Verification failed: {}", e);
    }
    Json(ApiVerifyResponse::from(result))
}
