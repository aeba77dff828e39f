//! eduai-predict - Student outcome prediction service
//!
//! Loads the scaler and the three pre-trained models once at startup, then
//! serves batch (CSV) and single-record predictions over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eduai_common::api::SessionWindow;
use eduai_common::config::load_config;
use eduai_predict::models::ModelSet;
use eduai_predict::{build_router, AppState, LastResultCache, PredictionPipeline};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for eduai-predict
#[derive(Parser, Debug)]
#[command(name = "eduai-predict")]
#[command(about = "Student outcome prediction service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "EDUAI_PORT")]
    port: Option<u16>,

    /// Directory holding the model artifacts (overrides config)
    #[arg(short, long, env = "EDUAI_MODELS_DIR")]
    models_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing goes up before the config file is read so fallback warnings
    // are visible; the configured level replaces the startup filter after.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let rust_log_set = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let loaded = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let mut config = loaded.config;

    // RUST_LOG wins over the configured level
    if !rust_log_set {
        filter_handle
            .reload(EnvFilter::new(&config.logging.level))
            .context("Failed to apply configured log level")?;
    }

    info!(
        "Starting eduai-predict v{} (config: {})",
        env!("CARGO_PKG_VERSION"),
        loaded.source
    );

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.models_dir {
        config.models.dir = dir;
    }

    let models = ModelSet::load(&config.models).with_context(|| {
        format!(
            "Failed to load model artifacts from {}",
            config.models.dir.display()
        )
    })?;
    info!("Models loaded from {}", config.models.dir.display());

    if config.auth.shared_secret == 0 {
        warn!("Session checking disabled (shared_secret = 0)");
    } else {
        info!("Session checking enabled");
    }

    let pipeline = PredictionPipeline::new(Arc::new(models), LastResultCache::new());
    let state = AppState {
        pipeline,
        shared_secret: config.auth.shared_secret,
        session_window: SessionWindow {
            max_age_ms: config.auth.max_age_ms,
            max_skew_ms: config.auth.max_skew_ms,
        },
        model_accuracy: config.model_accuracy,
        max_upload_bytes: config.max_upload_bytes,
    };
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("eduai-predict listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
