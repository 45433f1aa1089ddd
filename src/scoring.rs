//! Validation and point rules applied by the receipt scoring service.
//!
//! The page only ever learns points from the service. These rules let a
//! caller check a receipt before sending it, and back the demo service.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::Receipt;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Retailer(String),
    PurchaseDate(String),
    PurchaseTime(String),
    NoItems,
    ShortDescription { index: usize, value: String },
    ItemPrice { index: usize, value: String },
    Total(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Retailer(v) => write!(f, "invalid retailer '{}'", v),
            ValidationIssue::PurchaseDate(v) => write!(f, "invalid purchaseDate '{}'", v),
            ValidationIssue::PurchaseTime(v) => write!(f, "invalid purchaseTime '{}'", v),
            ValidationIssue::NoItems => write!(f, "receipt has no items"),
            ValidationIssue::ShortDescription { index, value } => {
                write!(f, "item {}: invalid shortDescription '{}'", index, value)
            }
            ValidationIssue::ItemPrice { index, value } => {
                write!(f, "item {}: invalid price '{}'", index, value)
            }
            ValidationIssue::Total(v) => write!(f, "invalid total '{}'", v),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_space_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

/// Letters, digits, `_`, whitespace, `-` and `&`.
pub fn is_valid_retailer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_word_char(c) || is_space_char(c) || c == '-' || c == '&')
}

/// Letters, digits, `_`, whitespace and `-`.
pub fn is_valid_short_description(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_word_char(c) || is_space_char(c) || c == '-')
}

/// One or more digits, a dot, exactly two digits.
pub fn is_valid_price(s: &str) -> bool {
    match s.split_once('.') {
        Some((whole, cents)) => {
            !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && cents.len() == 2
                && cents.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    if s.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

/// Check a receipt the way the service does before accepting it. Returns
/// every problem found, not just the first.
pub fn validate(receipt: &Receipt) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if !is_valid_retailer(&receipt.retailer) {
        issues.push(ValidationIssue::Retailer(receipt.retailer.clone()));
    }
    if parse_date(&receipt.purchase_date).is_none() {
        issues.push(ValidationIssue::PurchaseDate(receipt.purchase_date.clone()));
    }
    if parse_time(&receipt.purchase_time).is_none() {
        issues.push(ValidationIssue::PurchaseTime(receipt.purchase_time.clone()));
    }
    if receipt.items.is_empty() {
        issues.push(ValidationIssue::NoItems);
    }
    for (index, item) in receipt.items.iter().enumerate() {
        if !is_valid_short_description(&item.short_description) {
            issues.push(ValidationIssue::ShortDescription {
                index,
                value: item.short_description.clone(),
            });
        }
        if !is_valid_price(&item.price) {
            issues.push(ValidationIssue::ItemPrice {
                index,
                value: item.price.clone(),
            });
        }
    }
    if !is_valid_price(&receipt.total) {
        issues.push(ValidationIssue::Total(receipt.total.clone()));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// Points awarded to a receipt. Fields that do not parse contribute nothing.
pub fn points(receipt: &Receipt) -> i64 {
    retailer_points(&receipt.retailer)
        + total_points(&receipt.total)
        + item_count_points(receipt.items.len())
        + receipt
            .items
            .iter()
            .map(|item| description_points(&item.short_description, &item.price))
            .sum::<i64>()
        + purchase_day_points(&receipt.purchase_date)
        + purchase_time_points(&receipt.purchase_time)
}

/// One point per ASCII letter or digit.
pub fn retailer_points(retailer: &str) -> i64 {
    retailer.chars().filter(|c| c.is_ascii_alphanumeric()).count() as i64
}

/// 50 for a round dollar amount, plus 25 if the cents are a multiple of 25.
pub fn total_points(total: &str) -> i64 {
    let Ok(amount) = total.trim().parse::<Decimal>() else {
        return 0;
    };
    let mut points = 0;
    if amount.fract().is_zero() {
        points += 50;
    }
    let cents = (amount * Decimal::ONE_HUNDRED).trunc();
    if (cents % Decimal::from(25)).is_zero() {
        points += 25;
    }
    points
}

/// 5 for every two items.
pub fn item_count_points(count: usize) -> i64 {
    (count / 2) as i64 * 5
}

/// When the space-trimmed description length is a multiple of 3, the price
/// times 0.2 rounded up.
pub fn description_points(short_description: &str, price: &str) -> i64 {
    if short_description.trim_matches(' ').len() % 3 != 0 {
        return 0;
    }
    let Ok(price) = price.trim().parse::<Decimal>() else {
        return 0;
    };
    (price * Decimal::new(2, 1)).ceil().to_i64().unwrap_or(0)
}

/// 6 if the day of the month is odd.
pub fn purchase_day_points(date: &str) -> i64 {
    match parse_date(date) {
        Some(d) if d.day() % 2 == 1 => 6,
        _ => 0,
    }
}

/// 10 if the purchase time is after 14:00 and before 16:00.
pub fn purchase_time_points(time: &str) -> i64 {
    match parse_time(time) {
        Some(t) => {
            let minutes = t.hour() * 60 + t.minute();
            if minutes > 14 * 60 && minutes < 16 * 60 {
                10
            } else {
                0
            }
        }
        None => 0,
    }
}
