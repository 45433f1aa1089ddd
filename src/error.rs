#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Phase 1 (`POST /receipts/process`) answered with a non-success status.
    #[error("Receipt was rejected by the scoring service (HTTP {status})")]
    ReceiptRejected { status: u16 },

    /// Phase 1 succeeded but the body did not carry a usable `id`.
    #[error("Invalid response from the scoring service: {0}")]
    InvalidResponse(String),

    /// Phase 2 (`GET /receipts/{id}/points`) answered with a non-success status.
    #[error("Receipt {id} was accepted but its points could not be found (HTTP {status})")]
    ReceiptNotFound { id: String, status: u16 },

    /// Phase 2 succeeded but the body did not carry an integer `points`.
    #[error("Malformed points for receipt {id}: {detail}")]
    MalformedPoints { id: String, detail: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ReceiptError {
    /// Whether this error came out of the two-phase submission workflow itself
    /// rather than from local input or transport failures.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            ReceiptError::ReceiptRejected { .. }
                | ReceiptError::InvalidResponse(_)
                | ReceiptError::ReceiptNotFound { .. }
                | ReceiptError::MalformedPoints { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
