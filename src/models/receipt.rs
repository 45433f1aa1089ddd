use serde::{Deserialize, Serialize};

/// Opaque identifier assigned to a receipt by the scoring service.
pub type ReceiptId = String;

// ---------------------------------------------------------------------------
// ReceiptLineItem — One purchased unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLineItem {
    pub short_description: String,
    pub price: String,
}

// ---------------------------------------------------------------------------
// Receipt — Payload for POST /receipts/process
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub retailer: String,
    /// `YYYY-MM-DD`
    pub purchase_date: String,
    /// `HH:MM`, 24-hour clock
    pub purchase_time: String,
    pub items: Vec<ReceiptLineItem>,
    pub total: String,
}

// ---------------------------------------------------------------------------
// Service responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub id: ReceiptId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsResponse {
    pub points: i64,
}

/// Outcome of a fully successful two-phase submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: ReceiptId,
    pub points: i64,
}
