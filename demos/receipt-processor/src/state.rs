use std::collections::HashMap;
use std::sync::Mutex;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
#[derive(Default)]
pub struct AppState {
    /// Points awarded to each processed receipt, keyed by the id handed out
    /// by `POST /receipts/process`. Lives only as long as the process.
    pub points: Mutex<HashMap<String, i64>>,
}
