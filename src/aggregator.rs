//! Category aggregation
//!
//! Reduces raw expense lines into per-category totals.

use crate::models::{saturating_sum, ExpenseRecord, UNCATEGORIZED};
use std::collections::BTreeMap;

pub struct CategoryAggregator;

impl CategoryAggregator {
    /// Sum expense amounts per category.
    ///
    /// Blank categories fold into the sentinel and invalid amounts count as 0,
    /// so a single bad line never fails the request.
    pub fn build_breakdown(expenses: &[ExpenseRecord]) -> BTreeMap<String, f64> {
        let mut breakdown = BTreeMap::new();

        for expense in expenses {
            let category = match expense.category.trim() {
                "" => UNCATEGORIZED,
                name => name,
            };

            let total = breakdown.entry(category.to_string()).or_insert(0.0);
            *total = saturating_sum([*total, expense.amount]);
        }

        breakdown
    }
}
