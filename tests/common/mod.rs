//! Shared test fixtures for the receipt page integration tests.
//!
//! Provides a [`ScriptedTransport`] that answers each phase from a queue of
//! canned responses, and [`spawn_stub_service`] which runs an axum scoring
//! service on an ephemeral localhost port for end-to-end HTTP tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use receipt_points::{scoring, RawResponse, Receipt, ReceiptError, ReceiptPage, Result, Transport};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

/// Transport answering POSTs and GETs from separate queues. Running out of
/// responses is an error so unexpected requests fail the test.
#[derive(Default)]
pub struct ScriptedTransport {
    posts: Mutex<VecDeque<RawResponse>>,
    gets: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_post(self, status: u16, body: &str) -> Self {
        self.posts.lock().unwrap().push_back(RawResponse::new(status, body));
        self
    }

    pub fn on_get(self, status: u16, body: &str) -> Self {
        self.gets.lock().unwrap().push_back(RawResponse::new(status, body));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(Call {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
        });
        self.posts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ReceiptError::InvalidArgument(format!("no scripted POST response for {}", url)))
    }

    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(Call {
            method: "GET",
            url: url.to_string(),
            body: None,
        });
        self.gets
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ReceiptError::InvalidArgument(format!("no scripted GET response for {}", url)))
    }
}

/// A page on the built-in catalog whose requests go to `transport`.
pub fn page_with(transport: Arc<ScriptedTransport>) -> ReceiptPage {
    ReceiptPage::builder()
        .base_url("http://scoring.test")
        .transport(transport)
        .build()
        .unwrap()
}

/// 2022-03-21 14:33, a fixed purchase moment for builder tests.
pub fn fixed_now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 3, 21)
        .unwrap()
        .and_hms_opt(14, 33, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Stub scoring service
// ---------------------------------------------------------------------------

/// How the stub service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Validate and score receipts like the real service.
    Score,
    /// Reject every receipt with 400.
    RejectAll,
    /// Accept receipts but forget them, so every points lookup is a 404.
    ForgetReceipts,
    /// Answer points lookups with a string instead of an integer.
    StringPoints,
}

struct StubState {
    behavior: Behavior,
    points: Mutex<HashMap<String, i64>>,
    received: Mutex<Vec<Value>>,
    next_id: AtomicUsize,
    points_calls: AtomicUsize,
}

/// Handle to a running stub service.
pub struct StubService {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubService {
    /// Raw JSON bodies posted to `/receipts/process`, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn points_calls(&self) -> usize {
        self.state.points_calls.load(Ordering::SeqCst)
    }
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

async fn stub_process(State(state): State<Arc<StubState>>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "The receipt is invalid"),
    };
    state.received.lock().unwrap().push(raw.clone());

    if state.behavior == Behavior::RejectAll {
        return error_response(StatusCode::BAD_REQUEST, "The receipt is invalid");
    }
    let receipt: Receipt = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "The receipt is invalid"),
    };
    if scoring::validate(&receipt).is_err() {
        return error_response(StatusCode::BAD_REQUEST, "The receipt is invalid");
    }

    let id = format!("receipt-{}", state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    if state.behavior != Behavior::ForgetReceipts {
        state
            .points
            .lock()
            .unwrap()
            .insert(id.clone(), scoring::points(&receipt));
    }
    Json(json!({ "id": id })).into_response()
}

async fn stub_points(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    state.points_calls.fetch_add(1, Ordering::SeqCst);
    let points = state.points.lock().unwrap().get(&id).copied();
    match (points, state.behavior) {
        (Some(p), Behavior::StringPoints) => Json(json!({ "points": p.to_string() })).into_response(),
        (Some(p), _) => Json(json!({ "points": p })).into_response(),
        (None, _) => error_response(StatusCode::NOT_FOUND, "No receipt found for that id"),
    }
}

/// Start a stub scoring service on `127.0.0.1:0`. It runs until the test's
/// runtime shuts down.
pub async fn spawn_stub_service(behavior: Behavior) -> StubService {
    let state = Arc::new(StubState {
        behavior,
        points: Mutex::new(HashMap::new()),
        received: Mutex::new(Vec::new()),
        next_id: AtomicUsize::new(0),
        points_calls: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/receipts/process", post(stub_process))
        .route("/receipts/{id}/points", get(stub_points))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubService {
        base_url: format!("http://{}", addr),
        state,
    }
}
