//! Fallback resolution
//!
//! Turns a possibly empty model fragment plus the user's own inputs into a
//! complete StructuredReport. Rules run in a fixed order because each one
//! consumes the previous rule's resolved value:
//!
//! BREAKDOWN → RECOMMENDATION → PROJECTION → EXPLANATION

use crate::aggregator::CategoryAggregator;
use crate::models::{
    saturating_sum, FieldSource, StructuredReport, StructuredReportFragment, UserFinancialProfile,
};
use crate::projection::ProjectionEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Share of the monthly leftover suggested for investing when the model gives none
pub const FALLBACK_INVESTMENT_SHARE: f64 = 0.20;

/// A model projection shorter than this is treated as missing
pub const MIN_PROJECTION_POINTS: usize = 2;

/// Records which source won for every field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionTrace {
    pub categories_breakdown: FieldSource,
    pub monthly_investment_recommendation: FieldSource,
    pub projected_balance_by_year: FieldSource,
    /// Only computed when the projection had to be recomputed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leftover: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub report: StructuredReport,
    pub trace: ResolutionTrace,
}

pub struct FallbackResolver;

impl FallbackResolver {
    pub fn resolve(
        fragment: &StructuredReportFragment,
        profile: &UserFinancialProfile,
    ) -> StructuredReport {
        Self::resolve_traced(fragment, profile).report
    }

    pub fn resolve_traced(
        fragment: &StructuredReportFragment,
        profile: &UserFinancialProfile,
    ) -> Resolution {
        let (categories_breakdown, breakdown_source) = resolve_breakdown(fragment, profile);

        let model_projection = fragment
            .projected_balance_by_year
            .as_ref()
            .filter(|points| points.len() >= MIN_PROJECTION_POINTS);

        // The 20% fallback only applies when the projection is recomputed.
        // A valid model projection keeps the model's recommendation as is.
        let (recommendation, recommendation_source, leftover) = match model_projection {
            Some(_) => match fragment.monthly_investment_recommendation {
                Some(value) => (value.max(0.0), FieldSource::Model, None),
                None => (0.0, FieldSource::Defaulted, None),
            },
            None => {
                // Both terms are finite and non-negative, so the difference is finite
                let leftover = profile.total_income()
                    - saturating_sum(categories_breakdown.values().copied());
                match fragment.monthly_investment_recommendation {
                    Some(value) if value > 0.0 => (value, FieldSource::Model, Some(leftover)),
                    _ => (
                        leftover.max(0.0) * FALLBACK_INVESTMENT_SHARE,
                        FieldSource::Computed,
                        Some(leftover),
                    ),
                }
            }
        };

        debug!(
            source = %recommendation_source,
            recommendation,
            leftover = ?leftover,
            "Resolved monthly investment recommendation"
        );

        let (projected_balance_by_year, projection_source) = match model_projection {
            Some(points) => (points.clone(), FieldSource::Model),
            None => {
                debug!(
                    age = profile.age,
                    recommendation, "Recomputing balance projection"
                );
                (
                    ProjectionEngine::project_default(recommendation),
                    FieldSource::Computed,
                )
            }
        };

        Resolution {
            report: StructuredReport {
                categories_breakdown,
                monthly_investment_recommendation: recommendation,
                projected_balance_by_year,
                explanation: fragment.explanation.clone(),
            },
            trace: ResolutionTrace {
                categories_breakdown: breakdown_source,
                monthly_investment_recommendation: recommendation_source,
                projected_balance_by_year: projection_source,
                leftover,
            },
        }
    }
}

/// Taken wholesale from one source, never merged
fn resolve_breakdown(
    fragment: &StructuredReportFragment,
    profile: &UserFinancialProfile,
) -> (BTreeMap<String, f64>, FieldSource) {
    match &fragment.categories_breakdown {
        Some(breakdown) if is_usable_breakdown(breakdown) => (breakdown.clone(), FieldSource::Model),
        _ => {
            debug!(
                expense_count = profile.expenses.len(),
                "Model breakdown unusable, aggregating user expenses"
            );
            (
                CategoryAggregator::build_breakdown(&profile.expenses),
                FieldSource::Computed,
            )
        }
    }
}

/// Non-empty with a finite, positive total
fn is_usable_breakdown(breakdown: &BTreeMap<String, f64>) -> bool {
    let total: f64 = breakdown.values().sum();
    !breakdown.is_empty() && total.is_finite() && total > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ResponseInterpreter;
    use crate::models::ExpenseRecord;

    fn profile(salary: f64, expenses: Vec<ExpenseRecord>) -> UserFinancialProfile {
        UserFinancialProfile {
            salary,
            expenses,
            ..Default::default()
        }
    }

    fn breakdown(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_payload_falls_back_everywhere() {
        let (fragment, ok) = ResponseInterpreter::parse_structured_payload(
            r#"{"categories_breakdown": {}, "monthly_investment_recommendation": 0, "projected_balance_by_year": []}"#,
        );
        assert!(ok);

        let user = profile(5000.0, vec![ExpenseRecord::new("Rent", 1500.0, "Housing")]);
        let resolution = FallbackResolver::resolve_traced(&fragment, &user);
        let report = resolution.report;

        assert_eq!(report.categories_breakdown, breakdown(&[("Housing", 1500.0)]));
        assert_eq!(resolution.trace.leftover, Some(3500.0));
        assert!((report.monthly_investment_recommendation - 700.0).abs() < 1e-9);
        assert_eq!(report.projected_balance_by_year.len(), 11);
        assert!(report.projected_balance_by_year[0].abs() < 1e-9);
        assert!(report.projected_balance_by_year[10] > 0.0);
        assert_eq!(
            resolution.trace,
            ResolutionTrace {
                categories_breakdown: FieldSource::Computed,
                monthly_investment_recommendation: FieldSource::Computed,
                projected_balance_by_year: FieldSource::Computed,
                leftover: Some(3500.0),
            }
        );
    }

    #[test]
    fn test_unparseable_response_uses_computed_path() {
        let (fragment, ok) = ResponseInterpreter::parse_structured_payload("not json");
        assert!(!ok);

        let user = profile(3000.0, vec![ExpenseRecord::new("Groceries", 500.0, "Food")]);
        let report = FallbackResolver::resolve(&fragment, &user);

        assert_eq!(report.categories_breakdown, breakdown(&[("Food", 500.0)]));
        assert!((report.monthly_investment_recommendation - 500.0).abs() < 1e-9);
        assert_eq!(report.projected_balance_by_year, ProjectionEngine::project_default(500.0));
        assert_eq!(report.explanation, None);
    }

    #[test]
    fn test_zero_leftover_gives_zero_projection() {
        let user = profile(2000.0, vec![ExpenseRecord::new("Rent", 2000.0, "Housing")]);
        let report = FallbackResolver::resolve(&StructuredReportFragment::default(), &user);

        assert_eq!(report.monthly_investment_recommendation, 0.0);
        assert_eq!(report.projected_balance_by_year, vec![0.0; 11]);
    }

    #[test]
    fn test_overspending_never_recommends_negative() {
        let user = profile(1000.0, vec![ExpenseRecord::new("Rent", 1800.0, "Housing")]);
        let fragment = StructuredReportFragment {
            monthly_investment_recommendation: Some(-150.0),
            ..Default::default()
        };

        let resolution = FallbackResolver::resolve_traced(&fragment, &user);

        assert_eq!(resolution.trace.leftover, Some(-800.0));
        assert_eq!(resolution.report.monthly_investment_recommendation, 0.0);
        assert_eq!(resolution.report.projected_balance_by_year, vec![0.0; 11]);
    }

    #[test]
    fn test_valid_model_data_passes_through() {
        let model_breakdown = breakdown(&[("Housing", 1400.0), ("Food", 350.0)]);
        let model_projection: Vec<f64> = (0..11).map(|y| y as f64 * 8000.0).collect();
        let fragment = StructuredReportFragment {
            categories_breakdown: Some(model_breakdown.clone()),
            monthly_investment_recommendation: Some(650.0),
            projected_balance_by_year: Some(model_projection.clone()),
            explanation: Some("Steady saving.".to_string()),
        };
        let user = profile(5000.0, vec![ExpenseRecord::new("Rent", 1500.0, "Housing")]);

        let resolution = FallbackResolver::resolve_traced(&fragment, &user);

        assert_eq!(resolution.report.categories_breakdown, model_breakdown);
        assert_eq!(resolution.report.projected_balance_by_year, model_projection);
        assert_eq!(resolution.report.monthly_investment_recommendation, 650.0);
        assert_eq!(resolution.report.explanation.as_deref(), Some("Steady saving."));
        assert_eq!(resolution.trace.projected_balance_by_year, FieldSource::Model);
        assert_eq!(resolution.trace.leftover, None);
    }

    #[test]
    fn test_zero_sum_breakdown_replaced_wholesale() {
        let fragment = StructuredReportFragment {
            categories_breakdown: Some(breakdown(&[("Housing", 0.0), ("Fun", 0.0)])),
            ..Default::default()
        };
        let user = profile(
            4000.0,
            vec![
                ExpenseRecord::new("Rent", 1200.0, "Housing"),
                ExpenseRecord::new("Phone", 40.0, "Utilities"),
            ],
        );

        let report = FallbackResolver::resolve(&fragment, &user);

        assert_eq!(
            report.categories_breakdown,
            breakdown(&[("Housing", 1200.0), ("Utilities", 40.0)])
        );
    }

    #[test]
    fn test_leftover_uses_resolved_model_breakdown() {
        let fragment = StructuredReportFragment {
            categories_breakdown: Some(breakdown(&[("Housing", 1000.0)])),
            ..Default::default()
        };
        // User expenses would give a different leftover; the model breakdown wins.
        let user = profile(3000.0, vec![ExpenseRecord::new("Rent", 2500.0, "Housing")]);

        let resolution = FallbackResolver::resolve_traced(&fragment, &user);

        assert_eq!(resolution.trace.leftover, Some(2000.0));
        assert!((resolution.report.monthly_investment_recommendation - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_positive_model_recommendation_drives_projection() {
        let fragment = StructuredReportFragment {
            monthly_investment_recommendation: Some(250.0),
            projected_balance_by_year: Some(vec![0.0]),
            ..Default::default()
        };
        let user = profile(5000.0, vec![]);

        let resolution = FallbackResolver::resolve_traced(&fragment, &user);

        assert_eq!(resolution.report.monthly_investment_recommendation, 250.0);
        assert_eq!(
            resolution.trace.monthly_investment_recommendation,
            FieldSource::Model
        );
        assert_eq!(
            resolution.report.projected_balance_by_year,
            ProjectionEngine::project_default(250.0)
        );
    }

    #[test]
    fn test_valid_projection_keeps_zero_recommendation() {
        let fragment = StructuredReportFragment {
            monthly_investment_recommendation: Some(0.0),
            projected_balance_by_year: Some(vec![0.0, 1200.0, 2500.0]),
            ..Default::default()
        };
        let user = profile(5000.0, vec![ExpenseRecord::new("Rent", 1500.0, "Housing")]);

        let resolution = FallbackResolver::resolve_traced(&fragment, &user);

        assert_eq!(resolution.report.monthly_investment_recommendation, 0.0);
        assert_eq!(resolution.report.projected_balance_by_year, vec![0.0, 1200.0, 2500.0]);
    }

    #[test]
    fn test_huge_income_stays_finite() {
        let user = UserFinancialProfile {
            salary: 1e308,
            investments: 1e308,
            ..Default::default()
        };

        let resolution = FallbackResolver::resolve_traced(&StructuredReportFragment::default(), &user);
        let report = &resolution.report;

        assert_eq!(resolution.trace.leftover, Some(f64::MAX));
        assert!(report.monthly_investment_recommendation.is_finite());
        assert!(report.monthly_investment_recommendation > 0.0);
        assert!(report.projected_balance_by_year.iter().all(|b| b.is_finite()));
        assert!(report.projected_balance_by_year[10] > 0.0);

        let json = serde_json::to_value(report).unwrap();
        assert!(json["monthlyInvestmentRecommendation"].is_number());
        assert!(json["projectedBalanceByYear"][10].is_number());
    }

    #[test]
    fn test_overflowing_model_breakdown_rejected() {
        let fragment = StructuredReportFragment {
            categories_breakdown: Some(breakdown(&[("A", 1e308), ("B", 1e308)])),
            ..Default::default()
        };
        let user = profile(4000.0, vec![ExpenseRecord::new("Rent", 1200.0, "Housing")]);

        let resolution = FallbackResolver::resolve_traced(&fragment, &user);

        assert_eq!(resolution.trace.categories_breakdown, FieldSource::Computed);
        assert_eq!(
            resolution.report.categories_breakdown,
            breakdown(&[("Housing", 1200.0)])
        );
        assert!((resolution.report.monthly_investment_recommendation - 560.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_expenses_and_no_model_data() {
        let user = profile(2500.0, vec![]);
        let report = FallbackResolver::resolve(&StructuredReportFragment::default(), &user);

        assert!(report.categories_breakdown.is_empty());
        assert!((report.monthly_investment_recommendation - 500.0).abs() < 1e-9);
        assert_eq!(report.projected_balance_by_year.len(), 11);
    }
}
