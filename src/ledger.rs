//! In-memory record of scored receipts and the results view built from it.

use std::fmt;

use indexmap::IndexMap;

use crate::models::ReceiptId;

// ---------------------------------------------------------------------------
// ResultsLedger
// ---------------------------------------------------------------------------

/// Receipt id to points, in the order ids were first recorded.
///
/// Entries are only ever added or overwritten; nothing is removed for the
/// lifetime of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsLedger {
    entries: IndexMap<ReceiptId, i64>,
}

impl ResultsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the points for a receipt. Recording an id again overwrites its
    /// points but keeps its original position. Returns the previous value.
    pub fn record(&mut self, id: impl Into<ReceiptId>, points: i64) -> Option<i64> {
        self.entries.insert(id.into(), points)
    }

    pub fn get(&self, id: &str) -> Option<i64> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.entries.iter().map(|(id, points)| (id.as_str(), *points))
    }

    /// Owned copy of all entries, in display order.
    pub fn snapshot(&self) -> Vec<(ReceiptId, i64)> {
        self.entries
            .iter()
            .map(|(id, points)| (id.clone(), *points))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ResultsView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: ReceiptId,
    pub points: i64,
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.id, self.points)
    }
}

/// Table of results, one row per ledger entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsView {
    rows: Vec<ResultRow>,
}

impl ResultsView {
    pub const HEADER: &'static str = "Receipt ID | Points";

    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every row and rebuild from the ledger's current contents.
    pub fn refresh(&mut self, ledger: &ResultsLedger) {
        self.rows.clear();
        self.rows.extend(ledger.iter().map(|(id, points)| ResultRow {
            id: id.to_string(),
            points,
        }));
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::HEADER)?;
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
