//! Chart series shaping
//!
//! The renderer only draws; every degenerate-case substitution happens here.

use crate::models::{saturating_sum, StructuredReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_DATA_LABEL: &str = "No Data";
pub const CATEGORY_CHART_TITLE: &str = "Expenses as % of Total Income";
pub const PROJECTION_CHART_TITLE: &str = "Projected Roth IRA Growth";
pub const PROJECTION_X_AXIS_LABEL: &str = "Years from now";
pub const PROJECTION_Y_AXIS_LABEL: &str = "Balance (USD)";
pub const NO_PROJECTION_MESSAGE: &str = "No projection data";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeries {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Share of each value in the series total, 0..=100
    pub percentages: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSeries {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub labels: Vec<String>,
    pub balances: Vec<f64>,
    pub has_data: bool,
    /// Text to draw instead of a plot when `has_data` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

pub struct ChartDataBuilder;

impl ChartDataBuilder {
    pub fn build(report: &StructuredReport) -> (CategorySeries, ProjectionSeries) {
        (
            Self::category_series(&report.categories_breakdown),
            Self::projection_series(&report.projected_balance_by_year),
        )
    }

    pub fn category_series(breakdown: &BTreeMap<String, f64>) -> CategorySeries {
        let total = saturating_sum(breakdown.values().copied());

        let (labels, values) = if breakdown.is_empty() || total <= 0.0 {
            (vec![NO_DATA_LABEL.to_string()], vec![1.0])
        } else {
            breakdown
                .iter()
                .map(|(label, value)| (label.clone(), *value))
                .unzip()
        };

        let percentages = percentages_of(&values);

        CategorySeries {
            title: CATEGORY_CHART_TITLE.to_string(),
            labels,
            values,
            percentages,
        }
    }

    pub fn projection_series(balances: &[f64]) -> ProjectionSeries {
        let has_data = balances.iter().any(|b| *b != 0.0);

        ProjectionSeries {
            title: PROJECTION_CHART_TITLE.to_string(),
            x_axis_label: PROJECTION_X_AXIS_LABEL.to_string(),
            y_axis_label: PROJECTION_Y_AXIS_LABEL.to_string(),
            labels: (0..balances.len()).map(|year| format!("Year {}", year)).collect(),
            balances: balances.to_vec(),
            has_data,
            placeholder: (!has_data).then(|| NO_PROJECTION_MESSAGE.to_string()),
        }
    }
}

/// Shares of the total in percent. Values are scaled by the largest one
/// first so the total cannot overflow.
fn percentages_of(values: &[f64]) -> Vec<f64> {
    let largest = values.iter().copied().fold(0.0_f64, f64::max);
    if largest <= 0.0 {
        return vec![0.0; values.len()];
    }

    let scaled: Vec<f64> = values.iter().map(|v| v / largest).collect();
    let scaled_total: f64 = scaled.iter().sum();
    scaled.iter().map(|s| s / scaled_total * 100.0).collect()
}
