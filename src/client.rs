//! Two-phase submission against the receipt scoring service.
//!
//! Phase 1 posts the receipt to `{base}/receipts/process` and reads back an
//! `id`. Phase 2 fetches `{base}/receipts/{id}/points`. Either phase failing
//! ends the submission; nothing is retried.
//!
//! HTTP goes through the [`Transport`] trait so each phase can be driven by a
//! scripted transport in tests. [`HttpTransport`] is the `reqwest` one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::config;
use crate::error::{ReceiptError, Result};
use crate::models::{Receipt, ReceiptId, Submission};

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status and body of an HTTP response, already read to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP surface needed by [`SubmissionClient`].
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; only failures to get a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse>;
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

/// [`Transport`] backed by an async `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport. With `timeout` set to `None` requests may wait
    /// forever for a response.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn read(resp: reqwest::Response) -> Result<RawResponse> {
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        Self::read(resp).await
    }

    async fn get(&self, url: &str) -> Result<RawResponse> {
        let resp = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Self::read(resp).await
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// URLs of the two service endpoints, derived from a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parse and check a base URL. Only `http` and `https` are accepted. A
    /// trailing slash is optional.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|e| {
            ReceiptError::InvalidArgument(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ReceiptError::InvalidArgument(format!(
                "Base URL must be an http(s) URL: {}",
                base_url
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/receipts/process`
    pub fn process(&self) -> Result<Url> {
        self.with_segments(config::PROCESS_PATH.split('/'))
    }

    /// `{base}/receipts/{id}/points`, with `id` encoded as one path segment.
    ///
    /// `.` and `..` would be resolved away by URL normalization, so they are
    /// refused.
    pub fn points(&self, id: &str) -> Result<Url> {
        if is_dot_segment(id) {
            return Err(ReceiptError::InvalidArgument(format!(
                "Receipt id '{}' cannot be used as a URL path segment",
                id
            )));
        }
        self.with_segments(["receipts", id, "points"])
    }

    fn with_segments<'s, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ReceiptError::InvalidArgument(format!("Base URL cannot take a path: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// SubmissionClient
// ---------------------------------------------------------------------------

/// Runs the process-then-points workflow for one receipt at a time. Holds no
/// per-submission state, so concurrent submissions through one client are
/// independent.
#[derive(Clone)]
pub struct SubmissionClient {
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
}

impl SubmissionClient {
    pub fn new(endpoints: Endpoints, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoints,
            transport,
        }
    }

    /// Client for `base_url` using an [`HttpTransport`] without timeout.
    pub fn http(base_url: &str) -> Result<Self> {
        Ok(Self::new(
            Endpoints::new(base_url)?,
            Arc::new(HttpTransport::new(None)?),
        ))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Phase 1: post the receipt and return the id the service assigned.
    pub async fn process(&self, receipt: &Receipt) -> Result<ReceiptId> {
        let url = self.endpoints.process()?;
        let body = serde_json::to_value(receipt)?;
        tracing::debug!(
            url = %url,
            retailer = %receipt.retailer,
            items = receipt.items.len(),
            total = %receipt.total,
            "posting receipt"
        );

        let resp = self.transport.post_json(url.as_str(), &body).await?;
        if !resp.is_success() {
            return Err(ReceiptError::ReceiptRejected {
                status: resp.status,
            });
        }
        parse_process_body(&resp.body)
    }

    /// Phase 2: fetch the points awarded to an already processed receipt.
    pub async fn points(&self, id: &str) -> Result<i64> {
        let url = self.endpoints.points(id)?;
        tracing::debug!(url = %url, id, "fetching points");

        let resp = self.transport.get(url.as_str()).await?;
        if !resp.is_success() {
            return Err(ReceiptError::ReceiptNotFound {
                id: id.to_string(),
                status: resp.status,
            });
        }
        parse_points_body(id, &resp.body)
    }

    /// Both phases in order. The points lookup only happens after phase 1
    /// produced an id.
    pub async fn submit(&self, receipt: &Receipt) -> Result<Submission> {
        let id = self.process(receipt).await?;
        let points = self.points(&id).await?;
        Ok(Submission { id, points })
    }
}

/// Ids that cannot stand as a path segment. Other text, `%` included, is
/// escaped by the URL builder.
fn is_dot_segment(id: &str) -> bool {
    id == "." || id == ".."
}

fn parse_process_body(body: &str) -> Result<ReceiptId> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ReceiptError::InvalidResponse(format!("body is not JSON: {}", e)))?;
    match value.get("id") {
        Some(Value::String(id)) if is_dot_segment(id) => Err(ReceiptError::InvalidResponse(
            format!("`id` '{}' cannot be looked up by path", id),
        )),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        Some(other) => Err(ReceiptError::InvalidResponse(format!(
            "`id` is not a non-empty string: {}",
            other
        ))),
        None => Err(ReceiptError::InvalidResponse("missing `id` field".into())),
    }
}

fn parse_points_body(id: &str, body: &str) -> Result<i64> {
    let malformed = |detail: String| ReceiptError::MalformedPoints {
        id: id.to_string(),
        detail,
    };

    let value: Value =
        serde_json::from_str(body).map_err(|e| malformed(format!("body is not JSON: {}", e)))?;
    match value.get("points") {
        Some(points) => points
            .as_i64()
            .ok_or_else(|| malformed(format!("`points` is not an integer: {}", points))),
        None => Err(malformed("missing `points` field".into())),
    }
}
