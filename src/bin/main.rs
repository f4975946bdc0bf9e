//! One-shot CLI: reads a profile JSON file, prints the chart (or budget) report.
//!
//! Usage: advisor <profile.json> [--report] [--offline <model-response.txt>]

use budget_advisor::{
    advisor::BudgetAdvisor,
    config::Settings,
    error::AdvisorError,
    llm::{GroqClient, ModelClient, StaticModel},
    models::UserFinancialProfile,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct CliArgs {
    profile_path: String,
    budget_report: bool,
    offline_response: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, AdvisorError> {
    let mut profile_path = None;
    let mut budget_report = false;
    let mut offline_response = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--report" => budget_report = true,
            "--offline" => {
                offline_response = Some(args.next().ok_or_else(|| {
                    AdvisorError::InvalidRequest("--offline needs a response file".to_string())
                })?);
            }
            _ if profile_path.is_none() => profile_path = Some(arg),
            other => {
                return Err(AdvisorError::InvalidRequest(format!(
                    "unexpected argument: {}",
                    other
                )))
            }
        }
    }

    Ok(CliArgs {
        profile_path: profile_path.ok_or_else(|| {
            AdvisorError::InvalidRequest(
                "usage: advisor <profile.json> [--report] [--offline <response.txt>]".to_string(),
            )
        })?,
        budget_report,
        offline_response,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let profile: UserFinancialProfile =
        serde_json::from_str(&std::fs::read_to_string(&args.profile_path)?)?;

    let model: Box<dyn ModelClient> = match &args.offline_response {
        Some(path) => {
            info!(path = %path, "Using offline model response");
            Box::new(StaticModel::new(std::fs::read_to_string(path)?))
        }
        None => Box::new(GroqClient::from_settings(&Settings::from_env()?)?),
    };

    let advisor = BudgetAdvisor::new(model);

    let output = if args.budget_report {
        serde_json::to_string_pretty(&advisor.budget_report(&profile).await?)?
    } else {
        serde_json::to_string_pretty(&advisor.chart_report(&profile).await?)?
    };

    println!("{}", output);

    Ok(())
}
