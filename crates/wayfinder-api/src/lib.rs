use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use wayfinder_core::{
    compute_diff, BaselineIndex, BaselineLookup, BlogPost, BucketLabels, CandidateRelevance,
    ContentRepository, DecisionDiff, DecisionEvaluation, InMemoryContentRepository,
    RelatedContentSelector, RelatedLink, ScoreBreakdown, ScoringWeights, SelectorConfig,
    TagPatternTable, Topic, TopicCatalog, ValidationIssue, ValidationReport,
};

pub const API_CONTRACT_VERSION: &str = "api.v1";

/// On-disk shape of a content catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogDocument {
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub baselines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_patterns: Option<TagPatternTable>,
    #[serde(default)]
    pub bucket_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub posts: Vec<BlogPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostValidation {
    pub slug: String,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub topic_id: String,
    pub limit: usize,
    pub links: Vec<RelatedLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub topic_id: String,
    pub candidates: Vec<CandidateRelevance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagsResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub topic_id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffRequest {
    pub evaluation_a: DecisionEvaluation,
    pub evaluation_b: DecisionEvaluation,
    pub topic_a: String,
    pub topic_b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub topic_a: String,
    pub topic_b: String,
    pub diff: DecisionDiff,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostsResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub topic_id: String,
    pub posts: Vec<BlogPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogValidationResponse {
    pub api_contract_version: String,
    pub snapshot_id: String,
    pub topic_count: usize,
    pub baseline_count: usize,
    pub post_count: usize,
    pub catalog: ValidationReport,
    pub posts: Vec<PostValidation>,
}

/// Loaded content catalog plus the configuration the related-link and diff
/// operations run against.
#[derive(Debug, Clone)]
pub struct WayfinderApi {
    catalog: TopicCatalog,
    baselines: BaselineIndex,
    unknown_baselines: Vec<String>,
    patterns: TagPatternTable,
    labels: BucketLabels,
    weights: ScoringWeights,
    selector_config: SelectorConfig,
    posts: InMemoryContentRepository,
    post_reports: Vec<PostValidation>,
    snapshot_id: String,
}

impl WayfinderApi {
    /// Load a catalog document from a JSON file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not a valid catalog.
    pub fn from_path(path: &Path) -> Result<Self> {
        let body = std::fs::read(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json_slice(&body)
            .with_context(|| format!("failed to load catalog {}", path.display()))
    }

    /// # Errors
    /// Returns an error when `body` is not a valid catalog document.
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        let document: CatalogDocument =
            serde_json::from_slice(body).context("catalog is not a valid catalog document")?;
        Self::from_document(document)
    }

    /// # Errors
    /// Returns an error when topic ids are empty or duplicated.
    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let snapshot_id = compute_snapshot_id(&document)?;
        let CatalogDocument { topics, baselines, tag_patterns, bucket_labels, posts } = document;

        let catalog = TopicCatalog::new(topics).map_err(|err| anyhow!(err))?;
        let unknown_baselines =
            baselines.iter().filter(|id| !catalog.contains(id)).cloned().collect::<Vec<_>>();
        let baselines = baselines.into_iter().collect::<BaselineIndex>();

        let mut repository = InMemoryContentRepository::new(&catalog);
        let mut post_reports = Vec::with_capacity(posts.len());
        for post in posts {
            let slug = post.slug.clone();
            let report = repository.insert(post);
            if !report.accepted {
                tracing::warn!(slug = %slug, issues = report.issues.len(), "blog post rejected");
            }
            post_reports.push(PostValidation { slug, report });
        }

        tracing::info!(
            topics = catalog.len(),
            baselines = baselines.len(),
            posts = repository.len(),
            snapshot_id = %snapshot_id,
            "catalog loaded"
        );

        Ok(Self {
            catalog,
            baselines,
            unknown_baselines,
            patterns: tag_patterns.unwrap_or_default(),
            labels: BucketLabels::default().merged(bucket_labels),
            weights: ScoringWeights::default(),
            selector_config: SelectorConfig::default(),
            posts: repository,
            post_reports,
            snapshot_id,
        })
    }

    #[must_use]
    pub fn with_selector_config(mut self, config: SelectorConfig) -> Self {
        self.selector_config = config;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    #[must_use]
    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn has_baseline(&self, topic_id: &str) -> bool {
        self.baselines.has_baseline(topic_id)
    }

    fn selector(&self) -> RelatedContentSelector<'_, BaselineIndex> {
        RelatedContentSelector::new(&self.catalog, &self.patterns, &self.baselines, &self.labels)
            .with_config(self.selector_config.clone())
            .with_weights(self.weights)
    }

    fn topic(&self, topic_id: &str) -> Result<&Topic> {
        self.catalog.get(topic_id).ok_or_else(|| anyhow!("unknown topic: {topic_id}"))
    }

    #[must_use]
    pub fn related(&self, topic_id: &str, limit: Option<usize>) -> RelatedResponse {
        let hard_cap = self.selector_config.hard_cap;
        RelatedResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            topic_id: topic_id.to_string(),
            limit: limit.unwrap_or(hard_cap).min(hard_cap),
            links: self.selector().related_decisions(topic_id, limit),
        }
    }

    #[must_use]
    pub fn ranked(&self, topic_id: &str) -> RankedResponse {
        RankedResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            topic_id: topic_id.to_string(),
            candidates: self.selector().ranked_candidates(topic_id),
        }
    }

    /// # Errors
    /// Returns an error when either topic id is not in the catalog.
    pub fn explain_score(
        &self,
        source_topic_id: &str,
        candidate_topic_id: &str,
    ) -> Result<ScoreResponse> {
        let breakdown = self
            .selector()
            .explain(source_topic_id, candidate_topic_id)
            .map_err(|err| anyhow!(err))?;
        Ok(ScoreResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            breakdown,
        })
    }

    /// # Errors
    /// Returns an error when the topic id is not in the catalog.
    pub fn tags(&self, topic_id: &str) -> Result<TagsResponse> {
        let topic = self.topic(topic_id)?;
        Ok(TagsResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            topic_id: topic_id.to_string(),
            tags: self.patterns.extract(&topic.id, topic).into_iter().collect(),
        })
    }

    /// # Errors
    /// Returns an error when either topic id is not in the catalog.
    pub fn diff(&self, request: &DiffRequest) -> Result<DiffResponse> {
        let topic_a = self.topic(&request.topic_a)?;
        let topic_b = self.topic(&request.topic_b)?;
        Ok(DiffResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            topic_a: request.topic_a.clone(),
            topic_b: request.topic_b.clone(),
            diff: compute_diff(&request.evaluation_a, &request.evaluation_b, topic_a, topic_b),
        })
    }

    #[must_use]
    pub fn posts_for_topic(&self, topic_id: &str) -> PostsResponse {
        PostsResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            topic_id: topic_id.to_string(),
            posts: self.posts.posts_for_topic(topic_id).into_iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn validate_catalog(&self) -> CatalogValidationResponse {
        let mut catalog_report = self.catalog.validate();
        for topic_id in &self.unknown_baselines {
            catalog_report.issues.push(ValidationIssue::warning(
                "unknown_baseline",
                format!("baseline references unknown topic `{topic_id}`"),
            ));
        }

        CatalogValidationResponse {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.snapshot_id.clone(),
            topic_count: self.catalog.len(),
            baseline_count: self.baselines.len(),
            post_count: self.posts.len(),
            catalog: catalog_report,
            posts: self.post_reports.clone(),
        }
    }
}

fn compute_snapshot_id(document: &CatalogDocument) -> Result<String> {
    let canonical = serde_json::to_vec(document).context("failed to serialize catalog")?;
    Ok(format!("sha256:{}", hex::encode(Sha256::digest(&canonical))))
}

#[cfg(test)]
mod tests {
    use wayfinder_core::{Outcome, Refusal, Severity};

    use super::*;

    const CATALOG: &str = r#"{
        "topics": [
            {"id": "tanzania-february", "bucket": "timing", "title": "Tanzania in February",
             "question": "Should I visit Tanzania in February?", "assurance_eligible": true,
             "seo_intent": "high", "launch_priority": "p0"},
            {"id": "kenya-february", "bucket": "timing", "title": "Kenya in February",
             "seo_intent": "medium", "launch_priority": "p0"},
            {"id": "bali-august", "bucket": "timing", "title": "Bali in August",
             "seo_intent": "high", "launch_priority": "p0"},
            {"id": "japan-april", "bucket": "destination_choice", "title": "Japan in April",
             "seo_intent": "low", "launch_priority": "p1"}
        ],
        "baselines": ["bali-august", "ghost-topic"],
        "bucket_labels": {"timing": "When to go"},
        "posts": [
            {"slug": "great-migration", "title": "The Great Migration",
             "topic_ids": ["tanzania-february", "kenya-february"]},
            {"slug": "Bad Slug", "title": "Broken", "topic_ids": ["kenya-february"]}
        ]
    }"#;

    fn api() -> WayfinderApi {
        match WayfinderApi::from_json_slice(CATALOG.as_bytes()) {
            Ok(api) => api,
            Err(err) => panic!("fixture catalog should load: {err:#}"),
        }
    }

    #[test]
    fn related_uses_catalog_labels_and_baselines() {
        let response = api().related("kenya-february", None);
        assert_eq!(response.api_contract_version, API_CONTRACT_VERSION);
        assert_eq!(response.limit, 6);
        let hrefs = response.links.iter().map(|l| l.href.as_str()).collect::<Vec<_>>();
        assert_eq!(hrefs, vec!["/decisions/tanzania-february", "/decisions/bali-august"]);
        assert_eq!(response.links[0].anchor_text, "Should I visit Tanzania in February?");
        assert_eq!(response.links[0].title, "When to go: Tanzania in February");
    }

    #[test]
    fn related_limit_is_reported_capped() {
        let response = api().related("kenya-february", Some(40));
        assert_eq!(response.limit, 6);
        let response = api().related("kenya-february", Some(1));
        assert_eq!(response.limit, 1);
        assert_eq!(response.links.len(), 1);
    }

    #[test]
    fn snapshot_id_is_stable_across_loads() {
        let first = api();
        let second = api();
        assert_eq!(first.snapshot_id(), second.snapshot_id());
        assert!(first.snapshot_id().starts_with("sha256:"));
    }

    #[test]
    fn validation_reports_posts_and_unknown_baselines() {
        let response = api().validate_catalog();
        assert_eq!(response.topic_count, 4);
        assert_eq!(response.baseline_count, 2);
        assert_eq!(response.post_count, 1);
        assert!(response.catalog.has_code("unknown_baseline"));
        assert!(response.catalog.accepted);

        let rejected = response.posts.iter().find(|p| p.slug == "Bad Slug");
        let Some(rejected) = rejected else {
            panic!("bad post should be reported");
        };
        assert!(!rejected.report.accepted);
        assert!(rejected.report.issues.iter().any(|i| i.severity == Severity::Error));
    }

    #[test]
    fn posts_for_topic_lists_accepted_posts() {
        let response = api().posts_for_topic("tanzania-february");
        assert_eq!(response.posts.len(), 1);
        assert_eq!(response.posts[0].slug, "great-migration");
        assert!(api().posts_for_topic("kenya-february").posts.len() == 1);
    }

    #[test]
    fn diff_requires_known_topics() {
        let refusal = DecisionEvaluation::Refusal(Refusal {
            reason: "missing dates".to_string(),
            missing_or_conflicting_inputs: Vec::new(),
            safe_next_step: "add dates".to_string(),
            code: None,
        });
        let request = DiffRequest {
            evaluation_a: refusal.clone(),
            evaluation_b: refusal,
            topic_a: "tanzania-february".to_string(),
            topic_b: "nowhere".to_string(),
        };
        let result = api().diff(&request);
        assert!(result.is_err());
    }

    #[test]
    fn diff_request_parses_mixed_evaluations() {
        let request: DiffRequest = match serde_json::from_str(
            r#"{
                "evaluation_a": {"outcome": "book", "confidence": 0.8},
                "evaluation_b": {"outcome": "wait", "confidence": 0.8},
                "topic_a": "tanzania-february",
                "topic_b": "kenya-february"
            }"#,
        ) {
            Ok(request) => request,
            Err(err) => panic!("diff request should parse: {err}"),
        };
        let response = match api().diff(&request) {
            Ok(response) => response,
            Err(err) => panic!("diff should succeed: {err:#}"),
        };
        assert!(response.diff.has_differences);
        assert_eq!(response.diff.outcome.map(|pair| pair.value_b), Some(Outcome::Wait));
    }

    #[test]
    fn explain_and_tags_reject_unknown_topics() {
        let api = api();
        assert!(api.tags("nowhere").is_err());
        assert!(api.explain_score("kenya-february", "nowhere").is_err());

        let tags = match api.tags("bali-august") {
            Ok(tags) => tags,
            Err(err) => panic!("tags should resolve: {err:#}"),
        };
        assert!(tags.tags.contains(&"timing".to_string()));

        let score = match api.explain_score("kenya-february", "bali-august") {
            Ok(score) => score,
            Err(err) => panic!("score should resolve: {err:#}"),
        };
        assert!(score.breakdown.baseline_available > 0.0);
        assert!(api.has_baseline("bali-august"));
    }

    #[test]
    fn duplicate_topics_fail_to_load() {
        let body = r#"{"topics": [
            {"id": "a", "bucket": "timing", "title": "A",
             "seo_intent": "low", "launch_priority": "p0"},
            {"id": "a", "bucket": "timing", "title": "A2",
             "seo_intent": "low", "launch_priority": "p0"}
        ]}"#;
        assert!(WayfinderApi::from_json_slice(body.as_bytes()).is_err());
    }
}
