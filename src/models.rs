//! Core data models for the budget advisor

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Category used for expenses that arrive without one
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Expense type used when the caller omits it
pub const UNKNOWN_EXPENSE_TYPE: &str = "Unknown";

pub const DEFAULT_AGE: u32 = 30;

//
// ================= Request Inputs =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    #[serde(rename = "type", default = "default_expense_type", deserialize_with = "lenient_expense_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default = "default_category", deserialize_with = "lenient_category")]
    pub category: String,
}

impl ExpenseRecord {
    pub fn new(kind: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            amount,
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserFinancialProfile {
    /// Carried for future horizon-aware projections; the fixed-rate model ignores it.
    #[serde(default = "default_age", deserialize_with = "lenient_age")]
    pub age: u32,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub salary: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub additional_income: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub investments: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub bonuses: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub gov_benefits: f64,
    #[serde(default, deserialize_with = "lenient_expenses")]
    pub expenses: Vec<ExpenseRecord>,
}

impl UserFinancialProfile {
    /// Sum of the five monthly income fields, saturating at `f64::MAX`
    pub fn total_income(&self) -> f64 {
        saturating_sum([
            self.salary,
            self.additional_income,
            self.investments,
            self.bonuses,
            self.gov_benefits,
        ])
    }
}

impl Default for UserFinancialProfile {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            salary: 0.0,
            additional_income: 0.0,
            investments: 0.0,
            bonuses: 0.0,
            gov_benefits: 0.0,
            expenses: Vec::new(),
        }
    }
}

//
// ================= Structured Report =================
//

/// Fully resolved, chartable report. Only built by the fallback resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub categories_breakdown: BTreeMap<String, f64>,
    pub monthly_investment_recommendation: f64,
    pub projected_balance_by_year: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Whatever usable fields the model supplied. Absent means missing or malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReportFragment {
    pub categories_breakdown: Option<BTreeMap<String, f64>>,
    pub monthly_investment_recommendation: Option<f64>,
    pub projected_balance_by_year: Option<Vec<f64>>,
    pub explanation: Option<String>,
}

impl StructuredReportFragment {
    pub fn is_empty(&self) -> bool {
        self.categories_breakdown.is_none()
            && self.monthly_investment_recommendation.is_none()
            && self.projected_balance_by_year.is_none()
            && self.explanation.is_none()
    }
}

/// Where a resolved field came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Model,
    Computed,
    Defaulted,
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldSource::Model => "model",
            FieldSource::Computed => "computed",
            FieldSource::Defaulted => "defaulted",
        };
        write!(f, "{}", s)
    }
}

/// Sum of non-negative amounts that stays finite: overflow saturates at
/// `f64::MAX`, non-finite and negative terms count as 0.
pub fn saturating_sum<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    amounts.into_iter().fold(0.0, |total, amount| {
        if amount.is_finite() && amount > 0.0 {
            (total + amount).min(f64::MAX)
        } else {
            total
        }
    })
}

//
// ================= Lenient Deserialization =================
//

/// Coerce a loosely typed amount into a finite, non-negative number.
/// Numbers and numeric strings (optionally prefixed with `$`) are accepted;
/// everything else becomes 0.
pub fn coerce_amount(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(amount) if amount.is_finite() && amount > 0.0 => amount,
        _ => 0.0,
    }
}

fn default_expense_type() -> String {
    UNKNOWN_EXPENSE_TYPE.to_string()
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

fn default_age() -> u32 {
    DEFAULT_AGE
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

fn lenient_category<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default_category(),
    })
}

fn lenient_expense_type<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default_expense_type(),
    })
}

fn lenient_age<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let age = coerce_amount(&value).round();
    Ok(if age >= 1.0 && age <= u32::MAX as f64 {
        age as u32
    } else {
        DEFAULT_AGE
    })
}

/// Non-object entries are dropped; object entries always deserialize
/// because every expense field is itself lenient.
fn lenient_expenses<'de, D>(deserializer: D) -> std::result::Result<Vec<ExpenseRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<ExpenseRecord>(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_defaults() {
        let profile: UserFinancialProfile = serde_json::from_value(json!({})).unwrap();
        assert_eq!(profile.age, DEFAULT_AGE);
        assert_eq!(profile.total_income(), 0.0);
        assert!(profile.expenses.is_empty());
    }

    #[test]
    fn test_profile_camel_case_and_total_income() {
        let profile: UserFinancialProfile = serde_json::from_value(json!({
            "age": 41,
            "salary": 4000,
            "additionalIncome": "250.5",
            "investments": 100,
            "bonuses": 0,
            "govBenefits": 49.5,
            "expenses": [{"type": "Rent", "amount": 1500, "category": "Housing"}]
        }))
        .unwrap();

        assert_eq!(profile.age, 41);
        assert_eq!(profile.total_income(), 4400.0);
        assert_eq!(profile.expenses[0], ExpenseRecord::new("Rent", 1500.0, "Housing"));
    }

    #[test]
    fn test_malformed_expenses_are_coerced() {
        let profile: UserFinancialProfile = serde_json::from_value(json!({
            "expenses": [
                {"type": "Gym", "amount": "lots", "category": ""},
                {"amount": -20, "category": null},
                {"amount": "$35.25"},
                "not an expense",
                42
            ]
        }))
        .unwrap();

        assert_eq!(profile.expenses.len(), 3);
        assert_eq!(profile.expenses[0], ExpenseRecord::new("Gym", 0.0, UNCATEGORIZED));
        assert_eq!(profile.expenses[1], ExpenseRecord::new(UNKNOWN_EXPENSE_TYPE, 0.0, UNCATEGORIZED));
        assert_eq!(profile.expenses[2].amount, 35.25);
    }

    #[test]
    fn test_invalid_age_and_null_expenses() {
        let profile: UserFinancialProfile =
            serde_json::from_value(json!({"age": -3, "expenses": null, "salary": null})).unwrap();
        assert_eq!(profile.age, DEFAULT_AGE);
        assert_eq!(profile.salary, 0.0);
        assert!(profile.expenses.is_empty());
    }

    #[test]
    fn test_total_income_saturates() {
        let profile = UserFinancialProfile {
            salary: 1e308,
            investments: 1e308,
            ..Default::default()
        };
        assert_eq!(profile.total_income(), f64::MAX);
    }

    #[test]
    fn test_saturating_sum_skips_invalid_terms() {
        assert_eq!(saturating_sum([1.5, -4.0, f64::NAN, f64::INFINITY, 2.5]), 4.0);
        assert_eq!(saturating_sum(Vec::new()), 0.0);
    }

    #[test]
    fn test_fragment_is_empty() {
        assert!(StructuredReportFragment::default().is_empty());

        let fragment = StructuredReportFragment {
            explanation: Some("Save more".to_string()),
            ..Default::default()
        };
        assert!(!fragment.is_empty());
    }
}
