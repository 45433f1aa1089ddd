//! Receipt page client.
//!
//! A page lets a user pick a store, enter quantities for a fixed catalog of
//! items and submit the resulting receipt to a receipt scoring service. The
//! service assigns the receipt an id; the page then asks for the points that
//! id earned and keeps a ledger of every scored receipt.
//!
//! # Quick start
//!
//! ```no_run
//! use receipt_points::ReceiptPage;
//!
//! # async fn example() -> receipt_points::Result<()> {
//! let mut page = ReceiptPage::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! page.select_store("Target")?;
//! page.set_quantity("Gatorade", "2")?;
//!
//! let scored = page.submit().await?;
//! println!("{} earned {} points", scored.id, scored.points);
//! print!("{}", page.results_view());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod scoring;

pub use builder::{parse_quantity, ReceiptBuilder};
pub use client::{Endpoints, HttpTransport, RawResponse, SubmissionClient, Transport};
pub use error::{ReceiptError, Result};
pub use ledger::{ResultsLedger, ResultsView};
pub use models::{Catalog, CatalogItem, Receipt, ReceiptId, ReceiptLineItem, Submission};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use scoring::ValidationIssue;

// ---------------------------------------------------------------------------
// ReceiptPageBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`ReceiptPage`].
///
/// Use [`ReceiptPage::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](ReceiptPageBuilder::build).
pub struct ReceiptPageBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    catalog: Option<Catalog>,
    stores: Option<Vec<String>>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for ReceiptPageBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: None,
            catalog: None,
            stores: None,
            transport: None,
        }
    }
}

impl ReceiptPageBuilder {
    /// Set the scoring service base URL.
    ///
    /// If not set, `RECEIPT_SERVICE_URL` is read from the environment, falling
    /// back to [`config::DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a request timeout for both phases.
    ///
    /// There is no timeout by default; a request the service never answers
    /// leaves its submission pending.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the built-in catalog.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replace the built-in store list.
    pub fn stores<I, S>(mut self, stores: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stores = Some(stores.into_iter().map(Into::into).collect());
        self
    }

    /// Send requests through a custom [`Transport`] instead of HTTP. The
    /// timeout setting is ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the page. Fails if the base URL is not an http(s) URL or the
    /// store list is empty.
    pub fn build(self) -> Result<ReceiptPage> {
        let base_url = self.base_url.unwrap_or_else(config::base_url_from_env);
        let endpoints = Endpoints::new(&base_url)?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(self.timeout)?),
        };

        let catalog = self.catalog.unwrap_or_else(config::default_catalog);
        let stores = self.stores.unwrap_or_else(config::default_stores);
        if stores.is_empty() {
            return Err(ReceiptError::InvalidArgument(
                "At least one store is required".into(),
            ));
        }

        let inputs = vec!["0".to_string(); catalog.len()];
        Ok(ReceiptPage {
            client: SubmissionClient::new(endpoints, transport),
            catalog,
            stores,
            selected: 0,
            inputs,
            results: Mutex::new(Results::default()),
            last_error: Mutex::new(None),
        })
    }
}

// ---------------------------------------------------------------------------
// ReceiptPage
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Results {
    ledger: ResultsLedger,
    view: ResultsView,
}

/// Page state: the catalog with one quantity input per item, the store
/// selector, and the ledger of scored receipts.
///
/// Inputs are edited through `&mut self`. [`submit`](Self::submit) takes
/// `&self`, so several submissions may be awaited at once; each one snapshots
/// the inputs when it starts.
pub struct ReceiptPage {
    client: SubmissionClient,
    catalog: Catalog,
    stores: Vec<String>,
    selected: usize,
    inputs: Vec<String>,
    results: Mutex<Results>,
    last_error: Mutex<Option<String>>,
}

impl ReceiptPage {
    /// Create a new builder for configuring the page.
    pub fn builder() -> ReceiptPageBuilder {
        ReceiptPageBuilder::default()
    }

    // -- Inputs ------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn selected_store(&self) -> &str {
        &self.stores[self.selected]
    }

    /// Select a store by name.
    pub fn select_store(&mut self, name: &str) -> Result<()> {
        let index = self
            .stores
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| ReceiptError::InvalidArgument(format!("Unknown store: {}", name)))?;
        self.selected = index;
        Ok(())
    }

    /// Set the raw text of a catalog item's quantity input. The text is kept
    /// as typed and only parsed when a receipt is built.
    pub fn set_quantity(&mut self, item: &str, text: impl Into<String>) -> Result<()> {
        let index = self.item_index(item)?;
        self.inputs[index] = text.into();
        Ok(())
    }

    pub fn quantity_input(&self, item: &str) -> Result<&str> {
        let index = self.item_index(item)?;
        Ok(&self.inputs[index])
    }

    /// Put every quantity input back to `0`.
    pub fn reset_quantities(&mut self) {
        for input in &mut self.inputs {
            *input = "0".to_string();
        }
    }

    fn item_index(&self, item: &str) -> Result<usize> {
        self.catalog
            .position(item)
            .ok_or_else(|| ReceiptError::InvalidArgument(format!("Unknown catalog item: {}", item)))
    }

    // -- Receipts ----------------------------------------------------------

    /// Build a receipt from the current inputs and the local clock.
    pub fn build_receipt(&self) -> Result<Receipt> {
        let now = chrono::Local::now().naive_local();
        ReceiptBuilder::new(&self.catalog).build_from_inputs(self.selected_store(), now, &self.inputs)
    }

    /// Check the current inputs against the service's validation rules
    /// without sending anything.
    pub fn preflight(&self) -> Result<std::result::Result<Receipt, Vec<ValidationIssue>>> {
        let receipt = self.build_receipt()?;
        Ok(scoring::validate(&receipt).map(|()| receipt))
    }

    /// Build a receipt, submit it, fetch its points and record them.
    ///
    /// On success the ledger gains (or overwrites) exactly one entry and the
    /// results view is rebuilt once. On failure the error is logged, kept as
    /// [`last_error`](Self::last_error), and the ledger is left untouched.
    pub async fn submit(&self) -> Result<Submission> {
        let outcome = match self.build_receipt() {
            Ok(receipt) => self.client.submit(&receipt).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(submission) => {
                {
                    let mut results = lock(&self.results)?;
                    let previous = results.ledger.record(submission.id.clone(), submission.points);
                    let Results { ledger, view } = &mut *results;
                    view.refresh(ledger);
                    if previous.is_some() {
                        tracing::warn!(id = %submission.id, "receipt id returned twice; points overwritten");
                    }
                }
                *lock(&self.last_error)? = None;
                tracing::info!(id = %submission.id, points = submission.points, "receipt scored");
                Ok(submission)
            }
            Err(e) => {
                tracing::error!(error = %e, "receipt submission failed");
                *lock(&self.last_error)? = Some(e.to_string());
                Err(e)
            }
        }
    }

    // -- Results -----------------------------------------------------------

    /// The rendered results table.
    pub fn results_view(&self) -> String {
        recover(&self.results).view.to_string()
    }

    /// Copy of the ledger entries in display order.
    pub fn ledger_snapshot(&self) -> Vec<(ReceiptId, i64)> {
        recover(&self.results).ledger.snapshot()
    }

    /// Message of the most recent failed submission, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<String> {
        recover(&self.last_error).clone()
    }

    /// The rendered item table with the current quantity inputs.
    pub fn catalog_view(&self) -> String {
        self.catalog.render_table(&self.inputs)
    }

    pub fn client(&self) -> &SubmissionClient {
        &self.client
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ReceiptError::InvalidArgument("Page state lock poisoned".into()))
}

/// Read access for the views. The ledger and view are only replaced whole
/// under the lock, so the data behind a poisoned lock is still consistent.
fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::error!("page state lock poisoned; reading last recorded state");
        poisoned.into_inner()
    })
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ReceiptPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReceiptPage(service={}, store={}, items={}, results={})",
            self.client.endpoints().base(),
            self.selected_store(),
            self.catalog.len(),
            self.ledger_snapshot().len()
        )
    }
}
