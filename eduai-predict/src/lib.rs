//! eduai-predict library - Student outcome prediction service
//!
//! Upload a CSV of student records, get per-row predictions and chart-ready
//! aggregate statistics back.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use eduai_common::api::SessionWindow;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod stats;

pub use cache::LastResultCache;
pub use error::{ApiError, ApiResult, PredictError};
pub use pipeline::PredictionPipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded models and the last-result cache
    pub pipeline: PredictionPipeline,
    /// Shared secret for session markers (0 disables checking)
    pub shared_secret: i64,
    /// Accepted session timestamp window
    pub session_window: SessionWindow,
    /// Accuracy figure echoed with predictions, in percent
    pub model_accuracy: f64,
    /// Request body limit for uploads
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state with default limits
    pub fn new(pipeline: PredictionPipeline, shared_secret: i64) -> Self {
        Self {
            pipeline,
            shared_secret,
            session_window: SessionWindow::default(),
            model_accuracy: 85.5,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Build application router
///
/// `/upload` and `/predict` require a session marker; `/chart-data` and
/// `/health` are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let body_limit = state.max_upload_bytes;

    // Protected routes (require session marker)
    let protected = Router::new()
        .route("/upload", post(api::upload_csv))
        .route("/predict", post(api::predict_single))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes
    let public = Router::new()
        .route("/chart-data", get(api::chart_data))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
