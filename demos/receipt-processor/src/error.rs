use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use receipt_points::scoring::ValidationIssue;
use serde_json::json;

/// Message sent with every 400, whatever made the receipt unacceptable.
pub const INVALID_RECEIPT: &str = "The receipt is invalid";

/// Why a receipt request could not be served.
///
/// Renders as `{"error": "..."}`. Rejected receipts also list their
/// validation problems under `"issues"`.
#[derive(Debug)]
pub enum AppError {
    /// The body was not a receipt, or the receipt broke a validation rule.
    InvalidReceipt(Vec<String>),
    /// No points are stored under this id.
    UnknownReceipt(String),
    /// The points table lock was poisoned by a panicking handler.
    StatePoisoned,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidReceipt(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownReceipt(_) => StatusCode::NOT_FOUND,
            AppError::StatePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AppError::InvalidReceipt(_) => INVALID_RECEIPT,
            AppError::UnknownReceipt(_) => "No receipt found for that id",
            AppError::StatePoisoned => "Points table unavailable",
        }
    }
}

impl From<Vec<ValidationIssue>> for AppError {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        AppError::InvalidReceipt(issues.iter().map(ToString::to_string).collect())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::InvalidReceipt(vec![e.to_string()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::InvalidReceipt(issues) => {
                tracing::warn!(?issues, "receipt rejected");
                json!({ "error": self.message(), "issues": issues })
            }
            AppError::UnknownReceipt(id) => {
                tracing::debug!(%id, "points requested for unknown receipt");
                json!({ "error": self.message() })
            }
            AppError::StatePoisoned => {
                tracing::error!("points table lock poisoned");
                json!({ "error": self.message() })
            }
        };
        (status, Json(body)).into_response()
    }
}
