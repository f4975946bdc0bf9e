//! Budget Advisor
//!
//! Turns a declared income/expense profile into:
//! - a narrative monthly budget report (model text, returned as is)
//! - chart-ready category and balance-projection series
//!
//! The model's structured output is never trusted blindly. Every field is
//! checked and, when missing or degenerate, recomputed from the user's own
//! inputs so the chart path always produces a complete result.
//!
//! CHART LOOP:
//! RAW TEXT → INTERPRET → RESOLVE (BREAKDOWN → RECOMMENDATION → PROJECTION) → CHARTS

pub mod advisor;
pub mod aggregator;
pub mod api;
pub mod audit;
pub mod charts;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod llm;
pub mod models;
pub mod projection;
pub mod prompts;
pub mod resolver;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use advisor::{BudgetAdvisor, BudgetReport, ChartReport};
pub use aggregator::CategoryAggregator;
pub use charts::{CategorySeries, ChartDataBuilder, ProjectionSeries};
pub use interpreter::ResponseInterpreter;
pub use projection::ProjectionEngine;
pub use resolver::FallbackResolver;
