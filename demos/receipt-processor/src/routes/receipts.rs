use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use receipt_points::models::{PointsResponse, ProcessResponse};
use receipt_points::{scoring, Receipt};

use crate::error::AppError;
use crate::state::AppState;

/// POST /receipts/process
///
/// Validate a receipt, score it, and return the id its points are stored
/// under.
pub async fn process_receipt(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ProcessResponse>, AppError> {
    let receipt: Receipt = serde_json::from_slice(&body)?;
    scoring::validate(&receipt)?;

    let points = scoring::points(&receipt);
    let id = uuid::Uuid::new_v4().to_string();
    state
        .points
        .lock()
        .map_err(|_| AppError::StatePoisoned)?
        .insert(id.clone(), points);

    tracing::info!(%id, points, retailer = %receipt.retailer, "receipt processed");
    Ok(Json(ProcessResponse { id }))
}

/// GET /receipts/{id}/points
///
/// Points awarded to a previously processed receipt.
pub async fn get_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>, AppError> {
    let points = state
        .points
        .lock()
        .map_err(|_| AppError::StatePoisoned)?
        .get(&id)
        .copied();

    match points {
        Some(points) => Ok(Json(PointsResponse { points })),
        None => Err(AppError::UnknownReceipt(id)),
    }
}
