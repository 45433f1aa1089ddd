use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{ReceiptError, Result};

// ---------------------------------------------------------------------------
// CatalogItem — One purchasable item with a fixed-point unit price
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub name: String,
    /// Unit price, always rendered with exactly two decimals (e.g. `"12.00"`).
    pub unit_price: String,
    #[serde(skip)]
    amount: Decimal,
}

impl CatalogItem {
    /// Create a catalog item, validating the price.
    ///
    /// The price must be a non-negative decimal with at most two fractional
    /// digits. It is normalized to exactly two (`"1.4"` becomes `"1.40"`).
    pub fn new(name: impl Into<String>, unit_price: &str) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ReceiptError::InvalidArgument(
                "Catalog item name must not be empty".into(),
            ));
        }

        let mut amount: Decimal = unit_price.trim().parse().map_err(|e| {
            ReceiptError::InvalidArgument(format!(
                "Invalid price '{}' for catalog item '{}': {}",
                unit_price, name, e
            ))
        })?;
        if amount.is_sign_negative() || amount.scale() > 2 {
            return Err(ReceiptError::InvalidArgument(format!(
                "Price '{}' for catalog item '{}' must be non-negative with at most two decimals",
                unit_price, name
            )));
        }
        amount.rescale(2);

        Ok(Self {
            name,
            unit_price: amount.to_string(),
            amount,
        })
    }

    /// The unit price as an exact decimal.
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

// ---------------------------------------------------------------------------
// Catalog — Ordered, immutable list of items with unique names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog from items in display order. Names must be unique since
    /// they key the quantity inputs.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self> {
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|other| other.name == item.name) {
                return Err(ReceiptError::InvalidArgument(format!(
                    "Duplicate catalog item: {}",
                    item.name
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Index of the item with this name, in catalog order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }

    /// Render the item table: name, unit price and the current quantity input
    /// text for each item. Missing inputs are shown as `0`.
    pub fn render_table<S: AsRef<str>>(&self, inputs: &[S]) -> String {
        let name_width = self
            .items
            .iter()
            .map(|item| item.name.len())
            .max()
            .unwrap_or(0)
            .max("Item".len());

        let mut out = String::new();
        let _ = writeln!(out, "{:<name_width$} | {:>6} | Quantity", "Item", "Price");
        for (i, item) in self.items.iter().enumerate() {
            let qty = inputs.get(i).map(|s| s.as_ref()).unwrap_or("0");
            let _ = writeln!(
                out,
                "{:<name_width$} | {:>6} | {}",
                item.name, item.unit_price, qty
            );
        }
        out
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
