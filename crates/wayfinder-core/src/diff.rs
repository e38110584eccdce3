use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::decision::{DecisionEvaluation, DecisionOutput, Outcome};
use crate::normalize::normalize_text;
use crate::topic::Topic;

/// Minimum absolute confidence gap reported as a difference.
pub const CONFIDENCE_DIFF_THRESHOLD: f64 = 0.10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct SetDiff {
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
}

impl SetDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ValuePair<T> {
    pub value_a: T,
    pub value_b: T,
}

/// Differences between two decision evaluations that are worth showing.
///
/// `Default` is the "no differences" result: every field `None` and
/// `has_differences == false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct DecisionDiff {
    pub outcome: Option<ValuePair<Outcome>>,
    pub confidence: Option<ValuePair<String>>,
    pub gains: Option<SetDiff>,
    pub losses: Option<SetDiff>,
    pub assumptions: Option<SetDiff>,
    pub has_differences: bool,
}

/// Items of `a` and `b` missing from the other list, compared by
/// [`normalize_text`] but reported in their original text and order.
#[must_use]
pub fn diff_string_arrays<A, B>(a: &[A], b: &[B]) -> SetDiff
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let keys_a = a.iter().map(|item| normalize_text(item.as_ref())).collect::<HashSet<_>>();
    let keys_b = b.iter().map(|item| normalize_text(item.as_ref())).collect::<HashSet<_>>();

    SetDiff {
        only_in_a: a
            .iter()
            .filter(|item| !keys_b.contains(&normalize_text(item.as_ref())))
            .map(|item| item.as_ref().to_string())
            .collect(),
        only_in_b: b
            .iter()
            .filter(|item| !keys_a.contains(&normalize_text(item.as_ref())))
            .map(|item| item.as_ref().to_string())
            .collect(),
    }
}

/// Whole-percentage label, rounding half up (`0.8` -> `"80%"`).
#[must_use]
pub fn format_confidence(value: f64) -> String {
    format!("{:.0}%", (value * 100.0 + 0.5).floor())
}

/// Slack for binary floating point, so `0.7 - 0.6` still meets the threshold.
const CONFIDENCE_EPSILON: f64 = 1e-9;

/// True when the absolute gap is at least [`CONFIDENCE_DIFF_THRESHOLD`].
#[must_use]
pub fn confidence_differs(a: f64, b: f64) -> bool {
    (a - b).abs() >= CONFIDENCE_DIFF_THRESHOLD - CONFIDENCE_EPSILON
}

/// Compare two decision evaluations.
///
/// Only verdict-vs-verdict comparisons produce differences. If either side is
/// a refusal the result is [`DecisionDiff::default`]. Change conditions are not
/// compared.
#[must_use]
pub fn compute_diff(
    a: &DecisionEvaluation,
    b: &DecisionEvaluation,
    topic_a: &Topic,
    topic_b: &Topic,
) -> DecisionDiff {
    let (Some(decision_a), Some(decision_b)) = (a.as_decision(), b.as_decision()) else {
        tracing::debug!(
            topic_a = %topic_a.id,
            topic_b = %topic_b.id,
            refusal_a = a.is_refusal(),
            refusal_b = b.is_refusal(),
            "refusal present; decision diff skipped"
        );
        return DecisionDiff::default();
    };

    diff_decisions(decision_a, decision_b)
}

fn diff_decisions(a: &DecisionOutput, b: &DecisionOutput) -> DecisionDiff {
    let outcome = (a.outcome != b.outcome)
        .then_some(ValuePair { value_a: a.outcome, value_b: b.outcome });

    let confidence = confidence_differs(a.confidence, b.confidence).then(|| ValuePair {
        value_a: format_confidence(a.confidence),
        value_b: format_confidence(b.confidence),
    });

    let gains = diff_string_arrays(&a.tradeoffs.gains, &b.tradeoffs.gains);
    let losses = diff_string_arrays(&a.tradeoffs.losses, &b.tradeoffs.losses);

    let assumptions = diff_string_arrays(&assumption_texts(a), &assumption_texts(b));

    let has_differences = outcome.is_some()
        || confidence.is_some()
        || !gains.is_empty()
        || !losses.is_empty()
        || !assumptions.is_empty();

    DecisionDiff {
        outcome,
        confidence,
        gains: Some(gains),
        losses: Some(losses),
        assumptions: Some(assumptions),
        has_differences,
    }
}

fn assumption_texts(decision: &DecisionOutput) -> Vec<&str> {
    decision.assumptions.iter().map(|item| item.text.as_str()).collect()
}
