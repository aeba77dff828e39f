//! HTTP API handlers for eduai-predict

pub mod auth;
pub mod health;
pub mod predict;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use predict::{chart_data, predict_single, upload_csv};
