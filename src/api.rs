//! REST API server for the budget advisor
//!
//! Thin HTTP wrapper: decode the profile, run the advisor, wrap the result.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::advisor::BudgetAdvisor;
use crate::error::AdvisorError;
use crate::models::UserFinancialProfile;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub advisor: Arc<BudgetAdvisor>,
}

fn error_status(err: &AdvisorError) -> StatusCode {
    match err {
        AdvisorError::Llm(_) | AdvisorError::Http(_) => StatusCode::BAD_GATEWAY,
        AdvisorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Budget Report Endpoint
/// =============================

async fn generate_report(
    State(state): State<ApiState>,
    Json(profile): Json<UserFinancialProfile>,
) -> (StatusCode, Json<ApiResponse>) {
    info!(
        expense_count = profile.expenses.len(),
        "Received budget report request"
    );

    match state.advisor.budget_report(&profile).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))),
        Err(e) => {
            error!("Budget report failed: {}", e);
            (
                error_status(&e),
                Json(ApiResponse::error(format!("Budget report failed: {}", e))),
            )
        }
    }
}

/// =============================
/// Chart Data Endpoint
/// =============================

async fn generate_charts(
    State(state): State<ApiState>,
    Json(profile): Json<UserFinancialProfile>,
) -> (StatusCode, Json<ApiResponse>) {
    info!(
        expense_count = profile.expenses.len(),
        "Received chart data request"
    );

    match state.advisor.chart_report(&profile).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))),
        Err(e) => {
            error!("Chart generation failed: {}", e);
            (
                error_status(&e),
                Json(ApiResponse::error(format!("Chart generation failed: {}", e))),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(advisor: Arc<BudgetAdvisor>) -> Router {
    let state = ApiState { advisor };

    Router::new()
        .route("/health", get(health))
        .route("/generate_report", post(generate_report))
        .route("/generate_charts", post(generate_charts))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    advisor: Arc<BudgetAdvisor>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(advisor);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
