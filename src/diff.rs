//! New-product detection against the previous snapshot

use std::collections::HashSet;

use crate::types::ProductRecord;

/// Outcome of comparing the current catalog to the previous snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// Deduplicated records absent from the previous snapshot, in first-appearance order
    pub new_products: Vec<ProductRecord>,
    /// Raw row count of the current catalog, duplicates included
    pub total_count: usize,
    pub new_count: usize,
    /// 0..=100, zero for an empty catalog
    pub new_percentage: f64,
}

impl DiffResult {
    pub fn formatted_percentage(&self) -> String {
        format!("{:.2}%", self.new_percentage)
    }
}

/// Compute the records in `current` that are not in `previous`.
///
/// Without a previous snapshot every distinct record counts as new. Removed
/// products are not tracked, and a record with any changed field is simply new.
pub fn diff(current: &[ProductRecord], previous: Option<&[ProductRecord]>) -> DiffResult {
    let previous: HashSet<&ProductRecord> = previous.unwrap_or_default().iter().collect();

    let mut seen = HashSet::new();
    let new_products: Vec<ProductRecord> = current
        .iter()
        .filter(|record| !previous.contains(record) && seen.insert(*record))
        .cloned()
        .collect();

    let total_count = current.len();
    let new_count = new_products.len();
    let new_percentage = if total_count > 0 {
        new_count as f64 / total_count as f64 * 100.0
    } else {
        0.0
    };

    DiffResult {
        new_products,
        total_count,
        new_count,
        new_percentage,
    }
}
