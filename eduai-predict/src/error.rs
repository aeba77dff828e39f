//! Error types for eduai-predict
//!
//! `PredictError` is the pipeline taxonomy. `ApiError` is the request
//! boundary: every failure becomes one user-facing message in a JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error class reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Parse,
    Validation,
    Other,
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PredictError {
    /// Required column(s) absent from the CSV header
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Bytes are not valid delimited tabular data
    #[error("malformed CSV: {0}")]
    Parse(String),

    /// Single-record field absent or empty
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// Single-record field not coercible to a number
    #[error("could not convert {field} value '{value}' to a number")]
    InvalidField { field: String, value: String },

    /// Batch cell not coercible to the column's type
    #[error("line {line}: could not convert {column} value '{value}' to a number")]
    InvalidCell {
        line: u64,
        column: String,
        value: String,
    },

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl PredictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::Schema { .. } => ErrorKind::Schema,
            PredictError::Parse(_) => ErrorKind::Parse,
            PredictError::MissingField { .. } | PredictError::InvalidField { .. } => {
                ErrorKind::Validation
            }
            PredictError::InvalidCell { .. } | PredictError::Internal(_) => ErrorKind::Other,
        }
    }
}

impl From<csv::Error> for PredictError {
    fn from(err: csv::Error) -> Self {
        PredictError::Parse(err.to_string())
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Batch upload failed in the pipeline
    #[error("upload failed: {0}")]
    Upload(PredictError),

    /// Single-record prediction failed
    #[error("prediction failed: {0}")]
    Predict(PredictError),

    /// No `file` part, or the part has no file name
    #[error("No file selected")]
    NoFileSelected,

    /// Uploaded file name lacks the `.csv` extension
    #[error("File must be a CSV")]
    NotCsv,

    /// Multipart stream could not be read
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// Predict body was not a readable urlencoded form
    #[error("{0}")]
    Form(String),
}

impl ApiError {
    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Upload(PredictError::Schema { missing }) => format!(
                "Missing required columns in CSV: {}",
                missing.join(", ")
            ),
            ApiError::Upload(err) => format!("Error processing file: {}", err),
            ApiError::Predict(PredictError::MissingField { .. }) => {
                "Missing required fields".to_string()
            }
            ApiError::Predict(err) => format!("Error making prediction: {}", err),
            ApiError::Multipart { message, .. } => format!("Error processing file: {}", message),
            ApiError::Form(message) => format!("Error making prediction: {}", message),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Upload(PredictError::Internal(_))
            | ApiError::Predict(PredictError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart { status, .. } => *status,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.user_message(),
        }));

        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_list_missing_columns() {
        let err = ApiError::Upload(PredictError::Schema {
            missing: vec!["G2".to_string()],
        });
        assert_eq!(err.user_message(), "Missing required columns in CSV: G2");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_field_uses_generic_message() {
        let err = ApiError::Predict(PredictError::MissingField {
            field: "age".to_string(),
        });
        assert_eq!(err.user_message(), "Missing required fields");
    }

    #[test]
    fn test_other_failures_are_prefixed() {
        let err = ApiError::Upload(PredictError::InvalidCell {
            line: 3,
            column: "age".to_string(),
            value: "x".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "Error processing file: line 3: could not convert age value 'x' to a number"
        );

        let err = ApiError::Predict(PredictError::Internal("boom".to_string()));
        assert_eq!(err.user_message(), "Error making prediction: boom");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unreadable_form_is_a_prediction_error() {
        let err = ApiError::Form("bad body".to_string());
        assert_eq!(err.user_message(), "Error making prediction: bad body");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_kinds_follow_taxonomy() {
        assert_eq!(
            PredictError::Parse("x".into()).kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            PredictError::InvalidField {
                field: "G1".into(),
                value: "a".into()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PredictError::InvalidCell {
                line: 2,
                column: "G1".into(),
                value: "a".into()
            }
            .kind(),
            ErrorKind::Other
        );
    }
}
