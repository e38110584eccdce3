//! Content-intelligence primitives for decision topics: tag extraction,
//! relevance scoring, related-link selection and decision diffing.
//!
//! Every operation is a pure function over caller-supplied, immutable data.

mod content;
mod decision;
mod diff;
mod normalize;
mod related;
mod scoring;
mod tags;
mod topic;
mod validation;

pub use content::{BlogPost, ContentRepository, InMemoryContentRepository};
pub use decision::{Assumption, DecisionEvaluation, DecisionOutput, Outcome, Refusal, Tradeoffs};
pub use diff::{
    compute_diff, confidence_differs, diff_string_arrays, format_confidence, DecisionDiff,
    SetDiff, ValuePair, CONFIDENCE_DIFF_THRESHOLD,
};
pub use normalize::normalize_text;
pub use related::{
    BucketLabels, RelatedContentSelector, RelatedLink, SelectorConfig, DEFAULT_BASE_PATH,
    RELATED_HARD_CAP, RELATED_SOFT_MINIMUM,
};
pub use scoring::{CandidateRelevance, RelevanceScorer, ScoreBreakdown, ScoringWeights};
pub use tags::{bucket_tag, extract_tags, TagPattern, TagPatternTable};
pub use topic::{
    canonical_slug, BaselineIndex, BaselineLookup, LaunchPriority, SeoIntent, Topic, TopicCatalog,
};
pub use validation::{Severity, ValidationIssue, ValidationReport};

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum ContentError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}
