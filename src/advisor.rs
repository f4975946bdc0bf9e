//! Budget advisor pipeline
//!
//! REPORT:  PROFILE → PROMPT → MODEL → RAW TEXT
//! CHARTS:  PROFILE → PROMPT → MODEL → INTERPRET → RESOLVE → CHART SERIES

use crate::audit::ReportAudit;
use crate::charts::{CategorySeries, ChartDataBuilder, ProjectionSeries};
use crate::interpreter::ResponseInterpreter;
use crate::llm::{CompletionRequest, ModelClient};
use crate::models::{StructuredReport, UserFinancialProfile};
use crate::prompts;
use crate::resolver::FallbackResolver;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub report_id: Uuid,
    pub report: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    pub report_id: Uuid,
    pub think: Option<String>,
    /// The model's own JSON object, unmodified (`{}` when unparseable)
    pub structured_data: Value,
    pub resolved: StructuredReport,
    pub category_chart: CategorySeries,
    pub projection_chart: ProjectionSeries,
    pub audit: ReportAudit,
}

pub struct BudgetAdvisor {
    model: Box<dyn ModelClient>,
}

impl BudgetAdvisor {
    pub fn new(model: Box<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Free-text monthly budget report, returned as the model wrote it
    pub async fn budget_report(&self, profile: &UserFinancialProfile) -> Result<BudgetReport> {
        let report_id = Uuid::new_v4();
        let started = Instant::now();

        info!(
            report_id = %report_id,
            expense_count = profile.expenses.len(),
            "Generating budget report"
        );

        let request = CompletionRequest::report(prompts::budget_report_prompt(profile));
        let report = self.model.complete(&request).await?;

        info!(
            report_id = %report_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Budget report generated"
        );

        Ok(BudgetReport { report_id, report })
    }

    /// Chart-ready report. Only a failed model call is an error; any model
    /// output, however degraded, resolves to complete chart data.
    pub async fn chart_report(&self, profile: &UserFinancialProfile) -> Result<ChartReport> {
        let report_id = Uuid::new_v4();
        let started = Instant::now();

        info!(
            report_id = %report_id,
            age = profile.age,
            total_income = profile.total_income(),
            "Generating chart report"
        );

        let request = CompletionRequest::charts(prompts::chart_data_prompt(profile));
        let raw = self.model.complete(&request).await?;

        let report = Self::build_chart_report(report_id, &raw, profile);

        info!(
            report_id = %report_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            breakdown = %report.audit.resolution.categories_breakdown,
            recommendation = %report.audit.resolution.monthly_investment_recommendation,
            projection = %report.audit.resolution.projected_balance_by_year,
            "Chart report generated"
        );

        Ok(report)
    }

    /// Synchronous core: raw model text in, complete chart report out
    pub fn build_chart_report(
        report_id: Uuid,
        raw: &str,
        profile: &UserFinancialProfile,
    ) -> ChartReport {
        let interpretation = ResponseInterpreter::interpret(raw);
        let resolution = FallbackResolver::resolve_traced(&interpretation.fragment, profile);
        let (category_chart, projection_chart) = ChartDataBuilder::build(&resolution.report);

        let audit = ReportAudit::new(
            report_id,
            raw,
            interpretation.payload_parsed,
            interpretation.chain_of_thought.is_some(),
            resolution.trace,
        );

        if audit.fully_computed() {
            warn!(
                report_id = %report_id,
                payload_parsed = audit.payload_parsed,
                "Model data unusable, report built entirely from user inputs"
            );
        }

        ChartReport {
            report_id,
            think: interpretation.chain_of_thought,
            structured_data: interpretation.payload,
            resolved: resolution.report,
            category_chart,
            projection_chart,
            audit,
        }
    }
}
