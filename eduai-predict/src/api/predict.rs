//! Prediction endpoints
//!
//! - POST /upload: multipart CSV batch, replaces the cached chart data
//! - POST /predict: six form fields, one prediction, cache is only read
//! - GET /chart-data: the cached chart data, or `null`

use axum::{
    extract::{multipart::MultipartRejection, rejection::FormRejection, Multipart, State},
    Form, Json,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{PredictionRecord, SinglePrediction};
use crate::stats::StatsSnapshot;
use crate::AppState;

/// Multipart part carrying the CSV
const FILE_FIELD: &str = "file";

/// Score of the single prediction, for charting
#[derive(Debug, Serialize)]
pub struct SingleChart {
    pub score: f64,
}

/// Chart payload shared by all three endpoints
#[derive(Debug, Serialize)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single: Option<SingleChart>,
    pub overall: Option<StatsSnapshot>,
}

/// POST /upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub batch_id: Uuid,
    pub upload_results: Vec<PredictionRecord>,
    pub chart_data: ChartData,
    pub model_accuracy: f64,
}

/// POST /predict response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub message: String,
    pub prediction: SinglePrediction,
    pub chart_data: ChartData,
    pub model_accuracy: f64,
}

/// POST /upload
///
/// Expects a `file` part whose name ends in `.csv`. A body that is not
/// multipart at all carries no file.
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Upload is not multipart");
        ApiError::NoFileSelected
    })?;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart {
            status: e.status(),
            message: e.body_text(),
        })?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| ApiError::Multipart {
            status: e.status(),
            message: e.body_text(),
        })?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or(ApiError::NoFileSelected)?;
    if file_name.is_empty() {
        return Err(ApiError::NoFileSelected);
    }
    if !file_name.ends_with(".csv") {
        return Err(ApiError::NotCsv);
    }

    info!("Received file: {} ({} bytes)", file_name, data.len());

    let outcome = state.pipeline.run_batch(&data).map_err(|e| {
        warn!(file = %file_name, kind = ?e.kind(), error = %e, "Upload rejected");
        ApiError::Upload(e)
    })?;

    Ok(Json(UploadResponse {
        message: "File processed successfully".to_string(),
        batch_id: outcome.statistics.batch_id,
        upload_results: outcome.predictions,
        chart_data: ChartData {
            single: None,
            overall: Some((*outcome.statistics).clone()),
        },
        model_accuracy: state.model_accuracy,
    }))
}

/// POST /predict
///
/// Form fields: age, studytime, failures, absences, G1, G2.
pub async fn predict_single(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let Form(fields) = form.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Prediction form rejected");
        ApiError::Form(rejection.body_text())
    })?;
    let outcome = state.pipeline.predict_single(&fields).map_err(|e| {
        warn!(kind = ?e.kind(), error = %e, "Prediction rejected");
        ApiError::Predict(e)
    })?;

    let score = outcome.prediction.predicted_score;
    Ok(Json(PredictResponse {
        message: "Prediction completed successfully".to_string(),
        prediction: outcome.prediction,
        chart_data: ChartData {
            single: Some(SingleChart { score }),
            overall: outcome.overall.as_deref().cloned(),
        },
        model_accuracy: state.model_accuracy,
    }))
}

/// GET /chart-data
pub async fn chart_data(State(state): State<AppState>) -> Json<ChartData> {
    Json(ChartData {
        single: None,
        overall: state.pipeline.cache().current().as_deref().cloned(),
    })
}
