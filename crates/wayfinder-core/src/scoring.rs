use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::tags::TagPatternTable;
use crate::topic::{BaselineLookup, SeoIntent, Topic};

/// Additive weights for the relevance formula. All weights are expected to be
/// non-negative so that scores stay non-negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    pub same_bucket: f64,
    pub shared_tag: f64,
    pub assurance_eligible: f64,
    pub baseline_available: f64,
    pub high_seo_intent: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            same_bucket: 2.0,
            shared_tag: 0.5,
            assurance_eligible: 0.5,
            baseline_available: 1.0,
            high_seo_intent: 0.3,
        }
    }
}

/// Per-component contributions behind one relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub source_topic_id: String,
    pub candidate_topic_id: String,
    pub same_bucket: f64,
    pub shared_tags: Vec<String>,
    pub shared_tag_score: f64,
    pub assurance_eligible: f64,
    pub baseline_available: f64,
    pub high_seo_intent: f64,
    pub total: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateRelevance {
    pub topic_id: String,
    pub tags: BTreeSet<String>,
    pub score: f64,
}

/// Scores how strongly a page about `source` should link to `candidate`.
///
/// The score is asymmetric: the assurance, baseline and SEO bonuses look at the
/// candidate only.
pub struct RelevanceScorer<'a, B: BaselineLookup + ?Sized> {
    patterns: &'a TagPatternTable,
    baselines: &'a B,
    weights: ScoringWeights,
}

impl<'a, B: BaselineLookup + ?Sized> RelevanceScorer<'a, B> {
    #[must_use]
    pub fn new(patterns: &'a TagPatternTable, baselines: &'a B) -> Self {
        Self { patterns, baselines, weights: ScoringWeights::default() }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn tags(&self, topic: &Topic) -> BTreeSet<String> {
        self.patterns.extract(&topic.id, topic)
    }

    #[must_use]
    pub fn score(&self, source: &Topic, candidate: &Topic) -> f64 {
        self.total_with_tags(source, candidate, &self.tags(source), &self.tags(candidate))
    }

    #[must_use]
    pub fn candidate(&self, source: &Topic, candidate: &Topic) -> CandidateRelevance {
        let source_tags = self.tags(source);
        let candidate_tags = self.tags(candidate);
        let score = self.total_with_tags(source, candidate, &source_tags, &candidate_tags);
        CandidateRelevance { topic_id: candidate.id.clone(), tags: candidate_tags, score }
    }

    #[must_use]
    pub fn explain(&self, source: &Topic, candidate: &Topic) -> ScoreBreakdown {
        let source_tags = self.tags(source);
        let candidate_tags = self.tags(candidate);
        let shared_tags =
            source_tags.intersection(&candidate_tags).cloned().collect::<Vec<String>>();

        let mut reasons = Vec::new();

        let same_bucket = if source.bucket == candidate.bucket {
            reasons.push(format!("same bucket `{}`", candidate.bucket));
            self.weights.same_bucket
        } else {
            0.0
        };

        let shared_tag_score = self.weights.shared_tag * count_as_f64(shared_tags.len());
        if !shared_tags.is_empty() {
            reasons.push(format!("{} shared tags: {}", shared_tags.len(), shared_tags.join(", ")));
        }

        let assurance_eligible = if candidate.assurance_eligible {
            reasons.push("candidate is assurance eligible".to_string());
            self.weights.assurance_eligible
        } else {
            0.0
        };

        let baseline_available = if self.baselines.has_baseline(&candidate.id) {
            reasons.push("candidate has a baseline decision".to_string());
            self.weights.baseline_available
        } else {
            0.0
        };

        let high_seo_intent = if candidate.seo_intent == SeoIntent::High {
            reasons.push("candidate has high seo intent".to_string());
            self.weights.high_seo_intent
        } else {
            0.0
        };

        let total = same_bucket + shared_tag_score + assurance_eligible + baseline_available
            + high_seo_intent;

        ScoreBreakdown {
            source_topic_id: source.id.clone(),
            candidate_topic_id: candidate.id.clone(),
            same_bucket,
            shared_tags,
            shared_tag_score,
            assurance_eligible,
            baseline_available,
            high_seo_intent,
            total,
            reasons,
        }
    }

    pub(crate) fn total_with_tags(
        &self,
        source: &Topic,
        candidate: &Topic,
        source_tags: &BTreeSet<String>,
        candidate_tags: &BTreeSet<String>,
    ) -> f64 {
        let mut score = 0.0;
        if source.bucket == candidate.bucket {
            score += self.weights.same_bucket;
        }
        score += self.weights.shared_tag
            * count_as_f64(source_tags.intersection(candidate_tags).count());
        if candidate.assurance_eligible {
            score += self.weights.assurance_eligible;
        }
        if self.baselines.has_baseline(&candidate.id) {
            score += self.weights.baseline_available;
        }
        if candidate.seo_intent == SeoIntent::High {
            score += self.weights.high_seo_intent;
        }
        score
    }
}

fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::topic::fixtures::topic;
    use crate::topic::{BaselineIndex, LaunchPriority};

    fn approx(lhs: f64, rhs: f64) -> bool {
        (lhs - rhs).abs() < 1e-9
    }

    #[test]
    fn same_bucket_and_shared_tags_accumulate() {
        let patterns = TagPatternTable::default();
        let baselines = BaselineIndex::new();
        let scorer = RelevanceScorer::new(&patterns, &baselines);

        let source = topic("tanzania-february", "timing", LaunchPriority::P0);
        let candidate = topic("kenya-february", "timing", LaunchPriority::P0);

        // bucket 2.0; shared: africa, east-africa, safari, winter, off-peak, timing -> 6 * 0.5
        let breakdown = scorer.explain(&source, &candidate);
        assert!(approx(breakdown.same_bucket, 2.0));
        assert_eq!(breakdown.shared_tags.len(), 6);
        assert!(approx(breakdown.total, 5.0));
        assert!(approx(scorer.score(&source, &candidate), 5.0));
    }

    #[test]
    fn candidate_only_bonuses_make_scoring_asymmetric() {
        let patterns = TagPatternTable::default();
        let baselines = ["bali-august"].into_iter().collect::<BaselineIndex>();
        let scorer = RelevanceScorer::new(&patterns, &baselines);

        let plain = topic("iceland-winter", "destination_choice", LaunchPriority::P0);
        let mut rich = topic("bali-august", "timing", LaunchPriority::P0);
        rich.assurance_eligible = true;
        rich.seo_intent = SeoIntent::High;

        let to_rich = scorer.score(&plain, &rich);
        let to_plain = scorer.score(&rich, &plain);
        assert!(approx(to_rich, 0.5 + 1.0 + 0.3));
        assert!(approx(to_plain, 0.0));
        assert_eq!(scorer.explain(&plain, &rich).reasons.len(), 3);
    }

    #[test]
    fn candidate_record_matches_score() {
        let patterns = TagPatternTable::default();
        let baselines = ["kenya-safari-budget"].into_iter().collect::<BaselineIndex>();
        let scorer = RelevanceScorer::new(&patterns, &baselines);

        let source = topic("tanzania-safari-cost", "value_cost", LaunchPriority::P0);
        let candidate = topic("kenya-safari-budget", "value_cost", LaunchPriority::P0);

        let record = scorer.candidate(&source, &candidate);
        assert_eq!(record.topic_id, "kenya-safari-budget");
        assert!(record.tags.contains("value-cost"));
        assert!(approx(record.score, scorer.score(&source, &candidate)));
    }

    #[test]
    fn custom_weights_are_applied() {
        let patterns = TagPatternTable::default();
        let baselines = BaselineIndex::new();
        let weights = ScoringWeights { same_bucket: 10.0, ..ScoringWeights::default() };
        let scorer = RelevanceScorer::new(&patterns, &baselines).with_weights(weights);

        let source = topic("zzz", "timing", LaunchPriority::P0);
        let candidate = topic("qqq", "timing", LaunchPriority::P0);
        // same bucket plus the shared bucket tag
        assert!(approx(scorer.score(&source, &candidate), 10.5));
    }

    fn arb_topic() -> impl Strategy<Value = Topic> {
        (
            "[a-z-]{1,30}",
            prop::sample::select(vec!["timing", "destination_choice", "value_cost"]),
            any::<bool>(),
            prop::sample::select(vec![SeoIntent::Low, SeoIntent::Medium, SeoIntent::High]),
        )
            .prop_map(|(id, bucket, assurance, seo)| {
                let mut value = topic(&id, bucket, LaunchPriority::P0);
                value.assurance_eligible = assurance;
                value.seo_intent = seo;
                value
            })
    }

    proptest! {
        #[test]
        fn property_scores_are_non_negative(
            source in arb_topic(),
            candidate in arb_topic(),
            baseline in any::<bool>(),
        ) {
            let patterns = TagPatternTable::default();
            let mut baselines = BaselineIndex::new();
            if baseline {
                baselines.insert(candidate.id.clone());
            }
            let scorer = RelevanceScorer::new(&patterns, &baselines);
            prop_assert!(scorer.score(&source, &candidate) >= 0.0);
        }

        #[test]
        fn property_same_bucket_scores_at_least_two(
            source in arb_topic(),
            candidate in arb_topic(),
        ) {
            let mut candidate = candidate;
            candidate.bucket.clone_from(&source.bucket);
            let patterns = TagPatternTable::default();
            let baselines = BaselineIndex::new();
            let scorer = RelevanceScorer::new(&patterns, &baselines);
            prop_assert!(scorer.score(&source, &candidate) >= 2.0);
        }

        #[test]
        fn property_explain_total_matches_fast_path(
            source in arb_topic(),
            candidate in arb_topic(),
        ) {
            let patterns = TagPatternTable::default();
            let baselines = BaselineIndex::new();
            let scorer = RelevanceScorer::new(&patterns, &baselines);
            let explained = scorer.explain(&source, &candidate).total;
            let fast = scorer.candidate(&source, &candidate).score;
            prop_assert!((explained - fast).abs() < 1e-9);
        }
    }
}
