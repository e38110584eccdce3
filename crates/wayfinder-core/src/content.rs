use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::topic::TopicCatalog;
use crate::validation::{ValidationIssue, ValidationReport};

/// Editorial article that supports one or more decision topics.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub topic_ids: Vec<String>,
}

/// Registry of blog content keyed by slug.
///
/// Inserts never fail: problems are returned as a [`ValidationReport`] and a
/// post is stored only when the report is accepted.
pub trait ContentRepository {
    fn insert(&mut self, post: BlogPost) -> ValidationReport;

    fn get(&self, slug: &str) -> Option<&BlogPost>;

    fn list(&self) -> Vec<&BlogPost>;

    fn posts_for_topic(&self, topic_id: &str) -> Vec<&BlogPost> {
        self.list()
            .into_iter()
            .filter(|post| post.topic_ids.iter().any(|id| id == topic_id))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryContentRepository {
    known_topics: BTreeSet<String>,
    posts: BTreeMap<String, BlogPost>,
}

impl InMemoryContentRepository {
    #[must_use]
    pub fn new(catalog: &TopicCatalog) -> Self {
        Self {
            known_topics: catalog.iter().map(|topic| topic.id.clone()).collect(),
            posts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Check `post` against the registry without storing it.
    #[must_use]
    pub fn validate(&self, post: &BlogPost) -> ValidationReport {
        let mut issues = Vec::new();

        if post.slug.trim().is_empty() {
            issues.push(ValidationIssue::error("empty_slug", "slug MUST be non-empty"));
        } else if !is_kebab_slug(&post.slug) {
            issues.push(ValidationIssue::error(
                "invalid_slug",
                format!("slug `{}` MUST be lower-case kebab-case ASCII", post.slug),
            ));
        } else if self.posts.contains_key(&post.slug) {
            issues.push(ValidationIssue::error(
                "duplicate_slug",
                format!("slug `{}` is already registered", post.slug),
            ));
        }

        if post.title.trim().is_empty() {
            issues.push(ValidationIssue::error(
                "empty_title",
                format!("post `{}` MUST have a non-empty title", post.slug),
            ));
        }

        if post.topic_ids.is_empty() {
            issues.push(ValidationIssue::warning(
                "no_topics",
                format!("post `{}` references no decision topics", post.slug),
            ));
        }
        for topic_id in &post.topic_ids {
            if !self.known_topics.contains(topic_id) {
                issues.push(ValidationIssue::warning(
                    "unknown_topic",
                    format!("post `{}` references unknown topic `{topic_id}`", post.slug),
                ));
            }
        }

        ValidationReport::from_issues(issues)
    }
}

impl ContentRepository for InMemoryContentRepository {
    fn insert(&mut self, post: BlogPost) -> ValidationReport {
        let report = self.validate(&post);
        if report.accepted {
            self.posts.insert(post.slug.clone(), post);
        }
        report
    }

    fn get(&self, slug: &str) -> Option<&BlogPost> {
        self.posts.get(slug)
    }

    fn list(&self) -> Vec<&BlogPost> {
        self.posts.values().collect()
    }
}

fn is_kebab_slug(value: &str) -> bool {
    !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
