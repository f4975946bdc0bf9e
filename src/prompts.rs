//! Prompt construction for the two model calls

use crate::models::UserFinancialProfile;

/// Prompt for the free-text monthly budget report
pub fn budget_report_prompt(profile: &UserFinancialProfile) -> String {
    let expenses = if profile.expenses.is_empty() {
        "No expenses listed.".to_string()
    } else {
        profile
            .expenses
            .iter()
            .map(|e| format!("{} (${}, category: {})", e.kind, e.amount, e.category))
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        r#"Given the following data:
- Salary: ${}
- Additional income: ${}
- Investments/passive: ${}
- Bonuses/commissions: ${}
- Government benefits: ${}
- Expenses: {}
Total monthly income = ${}.

Create a monthly budget report with a summary of major categories, leftover (net savings), and suggestions."#,
        profile.salary,
        profile.additional_income,
        profile.investments,
        profile.bonuses,
        profile.gov_benefits,
        expenses,
        profile.total_income(),
    )
}

/// Prompt asking for `<think>` reasoning followed by the chart JSON payload
pub fn chart_data_prompt(profile: &UserFinancialProfile) -> String {
    let expenses = profile
        .expenses
        .iter()
        .map(|e| format!("{} (${}, {})", e.kind, e.amount, e.category))
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        r#"You are analyzing a user's finances.
User's age: {}.
Total monthly income: ${}.
Expenses: {}.

Reply with:
<think>Your chain-of-thought here.</think>
Then a valid JSON object with:
{{
  "categories_breakdown": {{ "Housing": <dollar>, "Groceries": <dollar>, ...}},
  "monthly_investment_recommendation": <number>,
  "projected_balance_by_year": [<11 floats, year 0 through year 10>],
  "explanation": "(short final text)"
}}
No extra text beyond those elements.
"#,
        profile.age,
        profile.total_income(),
        expenses,
    )
}
