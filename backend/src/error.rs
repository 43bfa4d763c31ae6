//! Error handling for the jewelry admin backend
//!
//! Every rejection is rendered as `{ success: false, error: { code, message } }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Conflict errors
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Order {0} was modified concurrently")]
    ConcurrentModification(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // External service errors
    /// The carrier answered and refused the request
    #[error("Carrier rejected request: {0}")]
    CarrierRejected(String),

    /// No usable answer from the carrier (connection, DNS, timeout, 5xx)
    #[error("Carrier unavailable: {0}")]
    CarrierUnavailable(String),

    /// The carrier answered with something we could not interpret
    #[error("Invalid carrier response: {0}")]
    CarrierResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classification code sent to API clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InsufficientPermissions => "FORBIDDEN",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::CarrierRejected(_) => "CARRIER_REJECTED",
            AppError::CarrierUnavailable(_) => "CARRIER_UNAVAILABLE",
            AppError::CarrierResponse(_) => "CARRIER_RESPONSE_INVALID",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEntry(_)
            | AppError::Conflict { .. }
            | AppError::ConcurrentModification(_) => StatusCode::CONFLICT,
            AppError::InvalidStateTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Carrier business failures are shown to the operator as bad requests
            AppError::CarrierRejected(_) => StatusCode::BAD_REQUEST,
            AppError::CarrierUnavailable(_) | AppError::CarrierResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (message, field) = match self {
            AppError::Unauthorized(msg) => (msg.clone(), None),
            AppError::InsufficientPermissions => (
                "You do not have permission to perform this action".to_string(),
                None,
            ),
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            AppError::NotFound(resource) => (format!("{} not found", resource), None),
            AppError::DuplicateEntry(field) => (
                format!("A record with this {} already exists", field),
                Some(field.clone()),
            ),
            AppError::Conflict { resource, message } => {
                (message.clone(), Some(resource.clone()))
            }
            AppError::ConcurrentModification(order_number) => (
                format!(
                    "Order {} was modified by another request, reload and retry",
                    order_number
                ),
                None,
            ),
            AppError::InvalidStateTransition(msg) => (msg.clone(), None),
            // Carrier text is passed through untouched
            AppError::CarrierRejected(msg) => (msg.clone(), None),
            AppError::CarrierUnavailable(msg) => {
                (format!("Logistics carrier unavailable: {}", msg), None)
            }
            AppError::CarrierResponse(msg) => {
                (format!("Unexpected logistics carrier response: {}", msg), None)
            }
            AppError::Configuration(msg) => (format!("Configuration error: {}", msg), None),
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::Internal(msg) => (msg.clone(), None),
            AppError::InternalError(_) => {
                ("An internal server error occurred".to_string(), None)
            }
        };

        ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
                field: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.detail(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
