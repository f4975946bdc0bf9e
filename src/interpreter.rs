//! Model response interpretation
//!
//! Pulls the `<think>` reasoning and the JSON payload out of the raw model
//! text. Every function here is total: malformed input yields an absent
//! value, never an error.

use crate::models::StructuredReportFragment;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Everything recovered from one raw model response
#[derive(Debug, Clone)]
pub struct Interpretation {
    pub chain_of_thought: Option<String>,
    /// The model's JSON object as sent, or `{}` when none could be parsed
    pub payload: Value,
    pub fragment: StructuredReportFragment,
    pub payload_parsed: bool,
}

pub struct ResponseInterpreter;

impl ResponseInterpreter {
    /// Run the full extraction over a raw response
    pub fn interpret(raw: &str) -> Interpretation {
        let chain_of_thought = Self::extract_chain_of_thought(raw);
        let stripped = Self::strip_chain_of_thought(raw);

        match Self::parse_payload_object(&stripped) {
            Some(payload) => Interpretation {
                chain_of_thought,
                fragment: fragment_from_value(&payload),
                payload,
                payload_parsed: true,
            },
            None => {
                warn!(
                    response_chars = raw.len(),
                    "Model response carried no parseable JSON object"
                );
                Interpretation {
                    chain_of_thought,
                    payload: Value::Object(Default::default()),
                    fragment: StructuredReportFragment::default(),
                    payload_parsed: false,
                }
            }
        }
    }

    /// Inner text of the first matched `<think>…</think>` region, trimmed
    pub fn extract_chain_of_thought(text: &str) -> Option<String> {
        let start = text.find(THINK_OPEN)? + THINK_OPEN.len();
        let end = text[start..].find(THINK_CLOSE)?;
        Some(text[start..start + end].trim().to_string())
    }

    /// Remove every matched `<think>…</think>` region. Unmatched markers stay.
    pub fn strip_chain_of_thought(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find(THINK_OPEN) {
            let after_open = &rest[open + THINK_OPEN.len()..];
            let Some(close) = after_open.find(THINK_CLOSE) else {
                break;
            };
            out.push_str(&rest[..open]);
            rest = &after_open[close + THINK_CLOSE.len()..];
        }

        out.push_str(rest);
        out.trim().to_string()
    }

    /// Parse the stripped text into a loosely typed fragment.
    /// `false` means no JSON object was found; the fragment is then empty.
    pub fn parse_structured_payload(stripped: &str) -> (StructuredReportFragment, bool) {
        match Self::parse_payload_object(stripped) {
            Some(payload) => (fragment_from_value(&payload), true),
            None => (StructuredReportFragment::default(), false),
        }
    }

    /// Locate a JSON object: the whole text (markdown fence removed),
    /// else the outermost `{ … }` slice.
    pub fn parse_payload_object(text: &str) -> Option<Value> {
        let cleaned = text
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        if let Some(value) = parse_object(cleaned) {
            return Some(value);
        }

        let start = cleaned.find('{')?;
        let end = cleaned.rfind('}')?;
        if end <= start {
            return None;
        }

        let embedded = parse_object(&cleaned[start..=end]);
        if embedded.is_some() {
            debug!("Recovered JSON object embedded in surrounding text");
        }
        embedded
    }
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Keep each field only when it has the expected shape
fn fragment_from_value(payload: &Value) -> StructuredReportFragment {
    let categories_breakdown = payload
        .get("categories_breakdown")
        .and_then(Value::as_object)
        .and_then(|map| {
            map.iter()
                .map(|(category, amount)| {
                    amount
                        .as_f64()
                        .filter(|a| a.is_finite() && *a >= 0.0)
                        .map(|a| (category.clone(), a))
                })
                .collect::<Option<BTreeMap<String, f64>>>()
        });

    let monthly_investment_recommendation = payload
        .get("monthly_investment_recommendation")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite());

    let projected_balance_by_year = payload
        .get("projected_balance_by_year")
        .and_then(Value::as_array)
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_f64().filter(|v| v.is_finite()))
                .collect::<Option<Vec<f64>>>()
        });

    let explanation = payload
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string);

    StructuredReportFragment {
        categories_breakdown,
        monthly_investment_recommendation,
        projected_balance_by_year,
        explanation,
    }
}
