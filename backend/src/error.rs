//! Error handling for the shrimp processing ERP server
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{BalanceOverflow, ConversionError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    // Conversion errors
    #[error("Invalid grade format: {0}")]
    InvalidGradeFormat(String),

    #[error("Invalid glaze format: {0}")]
    InvalidGlazeFormat(String),

    #[error("Converted count out of range for grade {0}")]
    CountOutOfRange(String),

    // Floor balance errors
    #[error(transparent)]
    BalanceOverflow(#[from] BalanceOverflow),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::InvalidGradeFormat { grade } => AppError::InvalidGradeFormat(grade),
            ConversionError::InvalidGlazeFormat { glaze } => AppError::InvalidGlazeFormat(glaze),
            ConversionError::CountOutOfRange { grade } => AppError::CountOutOfRange(grade),
            ConversionError::InvalidYield { variety, reason } => AppError::Validation {
                field: "variety_name".to_string(),
                message: format!("Variety {}: {}", variety, reason),
            },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::InvalidGradeFormat(grade) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_GRADE_FORMAT".to_string(),
                    message: format!(
                        "Grade '{}' must be BKN, DC or a slash grade such as 16/20",
                        grade
                    ),
                    field: Some("grade_name".to_string()),
                },
            ),
            AppError::InvalidGlazeFormat(glaze) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_GLAZE_FORMAT".to_string(),
                    message: format!(
                        "Glaze '{}' must be NWNC or a percentage below 100 such as 20%",
                        glaze
                    ),
                    field: Some("glaze_name".to_string()),
                },
            ),
            AppError::CountOutOfRange(grade) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "COUNT_OUT_OF_RANGE".to_string(),
                    message: format!(
                        "Converted count for grade '{}' is out of range; check variety yields",
                        grade
                    ),
                    field: None,
                },
            ),
            AppError::BalanceOverflow(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "BALANCE_OVERFLOW".to_string(),
                    message: err.to_string(),
                    field: None,
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message: format!("A record with this {} already exists", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
