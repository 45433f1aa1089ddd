//! Receipt construction from the page's current inputs.
//!
//! A quantity of `N` for a catalog item expands into `N` identical line items,
//! in catalog order. The total is summed as exact decimals and rendered with
//! two fractional digits.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ReceiptError, Result};
use crate::models::{Catalog, Receipt, ReceiptLineItem};

/// Largest quantity [`ReceiptBuilder::build`] accepts for one item.
pub const MAX_QUANTITY: u64 = 999;

/// Parse the text of a quantity input.
///
/// Empty, non-integer and negative input all mean zero units. Large values
/// are returned as entered (saturating at `u64::MAX`); the builder refuses
/// anything above [`MAX_QUANTITY`].
pub fn parse_quantity(text: &str) -> u64 {
    let text = text.trim();
    let digits = text.strip_prefix('+').unwrap_or(text);
    // Negative numbers fail the digit check too and clamp to zero.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    // All digits, so the only possible failure is overflow.
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

/// Format an exact decimal amount with exactly two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded.to_string()
}

// ---------------------------------------------------------------------------
// ReceiptBuilder
// ---------------------------------------------------------------------------

/// Builds [`Receipt`]s against a borrowed [`Catalog`].
pub struct ReceiptBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> ReceiptBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Build a receipt.
    ///
    /// `quantities[i]` is the quantity of catalog item `i`. Missing trailing
    /// entries count as zero; more entries than catalog items, or any quantity
    /// above [`MAX_QUANTITY`], is an error. `now` is captured once and used
    /// for both the date and the time.
    pub fn build(&self, retailer: &str, now: NaiveDateTime, quantities: &[u64]) -> Result<Receipt> {
        if quantities.len() > self.catalog.len() {
            return Err(ReceiptError::InvalidArgument(format!(
                "Got {} quantities for a catalog of {} items",
                quantities.len(),
                self.catalog.len()
            )));
        }
        if let Some((item, qty)) = self
            .catalog
            .iter()
            .zip(quantities)
            .find(|(_, qty)| **qty > MAX_QUANTITY)
        {
            return Err(ReceiptError::InvalidArgument(format!(
                "Quantity {} for '{}' exceeds the maximum of {}",
                qty, item.name, MAX_QUANTITY
            )));
        }

        let mut items = Vec::new();
        let mut total = Decimal::ZERO;
        for (item, &qty) in self.catalog.iter().zip(quantities) {
            for _ in 0..qty {
                items.push(ReceiptLineItem {
                    short_description: item.name.clone(),
                    price: item.unit_price.clone(),
                });
                total += item.amount();
            }
        }

        Ok(Receipt {
            retailer: retailer.to_string(),
            purchase_date: now.format("%Y-%m-%d").to_string(),
            purchase_time: now.format("%H:%M").to_string(),
            items,
            total: format_amount(total),
        })
    }

    /// Like [`build`](Self::build), but takes the raw text of each quantity
    /// input and parses it with [`parse_quantity`].
    pub fn build_from_inputs<S: AsRef<str>>(
        &self,
        retailer: &str,
        now: NaiveDateTime,
        inputs: &[S],
    ) -> Result<Receipt> {
        let quantities: Vec<u64> = inputs.iter().map(|s| parse_quantity(s.as_ref())).collect();
        self.build(retailer, now, &quantities)
    }
}
