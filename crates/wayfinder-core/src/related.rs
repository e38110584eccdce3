use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::{CandidateRelevance, RelevanceScorer, ScoreBreakdown, ScoringWeights};
use crate::tags::TagPatternTable;
use crate::topic::{BaselineLookup, Topic, TopicCatalog};
use crate::ContentError;

pub const RELATED_HARD_CAP: usize = 6;
pub const RELATED_SOFT_MINIMUM: usize = 3;
pub const DEFAULT_BASE_PATH: &str = "/decisions";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SelectorConfig {
    pub hard_cap: usize,
    pub soft_minimum: usize,
    pub base_path: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            hard_cap: RELATED_HARD_CAP,
            soft_minimum: RELATED_SOFT_MINIMUM,
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

/// Display labels for buckets, used in link `title` attributes.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct BucketLabels(BTreeMap<String, String>);

impl BucketLabels {
    #[must_use]
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self(labels)
    }

    /// Configured label, or the bucket name humanized (`value_cost` -> `Value cost`).
    #[must_use]
    pub fn label(&self, bucket: &str) -> String {
        if let Some(label) = self.0.get(bucket) {
            return label.clone();
        }

        let spaced = bucket.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Overlay `overrides` on top of these labels.
    #[must_use]
    pub fn merged(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.0.extend(overrides);
        self
    }
}

impl Default for BucketLabels {
    fn default() -> Self {
        Self(BTreeMap::from([
            ("timing".to_string(), "Timing decision".to_string()),
            ("destination_choice".to_string(), "Destination choice".to_string()),
            ("value_cost".to_string(), "Value and cost".to_string()),
            ("logistics".to_string(), "Trip logistics".to_string()),
            ("experience".to_string(), "Experience planning".to_string()),
        ]))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct RelatedLink {
    pub href: String,
    pub anchor_text: String,
    pub title: String,
}

struct RankedCandidate<'c> {
    topic: &'c Topic,
    relevance: CandidateRelevance,
}

/// Picks internal link targets for a topic page.
pub struct RelatedContentSelector<'a, B: BaselineLookup + ?Sized> {
    catalog: &'a TopicCatalog,
    scorer: RelevanceScorer<'a, B>,
    labels: &'a BucketLabels,
    config: SelectorConfig,
}

impl<'a, B: BaselineLookup + ?Sized> RelatedContentSelector<'a, B> {
    #[must_use]
    pub fn new(
        catalog: &'a TopicCatalog,
        patterns: &'a TagPatternTable,
        baselines: &'a B,
        labels: &'a BucketLabels,
    ) -> Self {
        Self {
            catalog,
            scorer: RelevanceScorer::new(patterns, baselines),
            labels,
            config: SelectorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.scorer = self.scorer.with_weights(weights);
        self
    }

    fn rank(&self, source: &Topic) -> Vec<RankedCandidate<'a>> {
        let source_tags = self.scorer.tags(source);
        let mut ranked = self
            .catalog
            .iter()
            .filter(|candidate| {
                candidate.launch_priority.is_top_tier() && candidate.id != source.id
            })
            .map(|candidate| {
                let tags = self.scorer.tags(candidate);
                let score = self.scorer.total_with_tags(source, candidate, &source_tags, &tags);
                RankedCandidate {
                    topic: candidate,
                    relevance: CandidateRelevance { topic_id: candidate.id.clone(), tags, score },
                }
            })
            .collect::<Vec<_>>();

        // sort_by is stable: equal scores keep catalog order.
        ranked.sort_by(|lhs, rhs| {
            rhs.relevance.score.partial_cmp(&lhs.relevance.score).unwrap_or(Ordering::Equal)
        });
        ranked
    }

    /// Every eligible candidate for `source_topic_id`, best first, before the
    /// link-count cap is applied.
    #[must_use]
    pub fn ranked_candidates(&self, source_topic_id: &str) -> Vec<CandidateRelevance> {
        let Some(source) = self.catalog.get(source_topic_id) else {
            tracing::debug!(topic_id = source_topic_id, "unknown source topic; no candidates");
            return Vec::new();
        };
        self.rank(source).into_iter().map(|ranked| ranked.relevance).collect()
    }

    /// Related-link descriptors for `source_topic_id`.
    ///
    /// Returns at most `min(limit, hard_cap)` links (`limit` defaults to the
    /// hard cap). An unknown topic yields no links, and a short candidate pool
    /// yields a short list rather than padding.
    #[must_use]
    pub fn related_decisions(
        &self,
        source_topic_id: &str,
        limit: Option<usize>,
    ) -> Vec<RelatedLink> {
        let Some(source) = self.catalog.get(source_topic_id) else {
            tracing::debug!(topic_id = source_topic_id, "unknown source topic; no related links");
            return Vec::new();
        };

        let take = limit.unwrap_or(self.config.hard_cap).min(self.config.hard_cap);
        let links = self
            .rank(source)
            .into_iter()
            .take(take)
            .map(|ranked| self.link_for(ranked.topic))
            .collect::<Vec<_>>();

        if links.len() < self.config.soft_minimum.min(take) {
            tracing::debug!(
                topic_id = source_topic_id,
                found = links.len(),
                soft_minimum = self.config.soft_minimum,
                "related links below soft minimum"
            );
        }

        links
    }

    #[must_use]
    pub fn link_for(&self, topic: &Topic) -> RelatedLink {
        let base = self.config.base_path.trim_end_matches('/');
        RelatedLink {
            href: format!("{base}/{}", topic.slug()),
            anchor_text: topic.question_title(),
            title: format!("{}: {}", self.labels.label(&topic.bucket), topic.title.trim()),
        }
    }

    /// Score breakdown for one source/candidate pair from the catalog.
    ///
    /// # Errors
    /// Returns [`ContentError::UnknownTopic`] when either id is not in the catalog.
    pub fn explain(
        &self,
        source_topic_id: &str,
        candidate_topic_id: &str,
    ) -> Result<ScoreBreakdown, ContentError> {
        let source = self
            .catalog
            .get(source_topic_id)
            .ok_or_else(|| ContentError::UnknownTopic(source_topic_id.to_string()))?;
        let candidate = self
            .catalog
            .get(candidate_topic_id)
            .ok_or_else(|| ContentError::UnknownTopic(candidate_topic_id.to_string()))?;
        Ok(self.scorer.explain(source, candidate))
    }
}
