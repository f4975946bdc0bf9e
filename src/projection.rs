//! Deterministic balance projection
//!
//! Single fixed-rate model: monthly deposit, then monthly compounding,
//! starting from a zero balance.

pub const DEFAULT_YEARS: u32 = 10;
pub const DEFAULT_ANNUAL_RETURN: f64 = 0.06;

const MONTHS_PER_YEAR: u32 = 12;

pub struct ProjectionEngine;

impl ProjectionEngine {
    /// Project the balance at each year boundary, `years + 1` points.
    ///
    /// Each point is the balance before that month's deposit and growth,
    /// so point 0 is always 0. Values are rounded to cents.
    pub fn project(monthly_contribution: f64, years: u32, annual_return: f64) -> Vec<f64> {
        let contribution = if monthly_contribution.is_finite() && monthly_contribution > 0.0 {
            monthly_contribution
        } else {
            0.0
        };
        let growth = 1.0 + annual_return / MONTHS_PER_YEAR as f64;
        let months = month_count(years);

        let mut balance = 0.0_f64;
        let mut snapshots = Vec::with_capacity(years as usize + 1);

        for month in 0..=months {
            if month % MONTHS_PER_YEAR == 0 {
                snapshots.push(round_to_cents(balance));
            }
            balance = ((balance + contribution) * growth).min(f64::MAX);
        }

        snapshots
    }

    /// Ten years at 6%
    pub fn project_default(monthly_contribution: f64) -> Vec<f64> {
        Self::project(monthly_contribution, DEFAULT_YEARS, DEFAULT_ANNUAL_RETURN)
    }
}

fn month_count(years: u32) -> u32 {
    years.saturating_mul(MONTHS_PER_YEAR)
}

/// Values too large to scale by 100 are already beyond cent precision
fn round_to_cents(value: f64) -> f64 {
    let cents = value * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        value
    }
}
