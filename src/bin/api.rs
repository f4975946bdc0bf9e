use budget_advisor::{
    advisor::BudgetAdvisor,
    api::start_server,
    config::Settings,
    llm::GroqClient,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    if settings.groq_api_key.is_empty() {
        warn!("GROQ_API_KEY not set; model calls will fail until it is configured");
    }

    info!("Budget Advisor - API Server");
    info!(model = %settings.model, port = settings.port, "Settings loaded");

    let model = GroqClient::from_settings(&settings)?;
    let advisor = Arc::new(BudgetAdvisor::new(Box::new(model)));

    info!("Advisor initialized, starting API server");

    start_server(advisor, settings.port).await?;

    Ok(())
}
