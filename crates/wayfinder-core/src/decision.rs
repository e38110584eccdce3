use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Book,
    Wait,
    Switch,
    Discard,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Wait => "wait",
            Self::Switch => "switch",
            Self::Discard => "discard",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "book" => Some(Self::Book),
            "wait" => Some(Self::Wait),
            "switch" => Some(Self::Switch),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Tradeoffs {
    #[serde(default)]
    pub gains: Vec<String>,
    #[serde(default)]
    pub losses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assumption {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DecisionOutput {
    pub outcome: Outcome,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    pub confidence: f64,
    #[serde(default)]
    pub tradeoffs: Tradeoffs,
    #[serde(default)]
    pub assumptions: Vec<Assumption>,
    #[serde(default)]
    pub change_conditions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Refusal {
    pub reason: String,
    #[serde(default)]
    pub missing_or_conflicting_inputs: Vec<String>,
    #[serde(default)]
    pub safe_next_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result of evaluating a decision: a verdict or a refusal, never both.
///
/// Deserialized by shape. An object carrying `outcome` is a verdict; one
/// carrying `reason` is a refusal. Both structs deny unknown fields, so an
/// object mixing verdict and refusal fields matches neither and is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DecisionEvaluation {
    Decision(DecisionOutput),
    Refusal(Refusal),
}

impl DecisionEvaluation {
    #[must_use]
    pub fn as_decision(&self) -> Option<&DecisionOutput> {
        match self {
            Self::Decision(output) => Some(output),
            Self::Refusal(_) => None,
        }
    }

    #[must_use]
    pub fn as_refusal(&self) -> Option<&Refusal> {
        match self {
            Self::Decision(_) => None,
            Self::Refusal(refusal) => Some(refusal),
        }
    }

    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refusal(_))
    }
}

impl From<DecisionOutput> for DecisionEvaluation {
    fn from(output: DecisionOutput) -> Self {
        Self::Decision(output)
    }
}

impl From<Refusal> for DecisionEvaluation {
    fn from(refusal: Refusal) -> Self {
        Self::Refusal(refusal)
    }
}
