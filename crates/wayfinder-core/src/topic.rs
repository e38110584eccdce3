use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationIssue, ValidationReport};
use crate::ContentError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeoIntent {
    Low,
    Medium,
    High,
}

/// Publishing wave for a topic. `P0` is the top tier and the only one offered
/// as a related-link target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaunchPriority {
    P0,
    P1,
    P2,
}

impl LaunchPriority {
    pub const TOP: Self = Self::P0;

    #[must_use]
    pub fn is_top_tier(self) -> bool {
        self == Self::TOP
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Topic {
    pub id: String,
    pub bucket: String,
    pub title: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub assurance_eligible: bool,
    pub seo_intent: SeoIntent,
    pub launch_priority: LaunchPriority,
}

impl Topic {
    /// Public URL slug for this topic.
    #[must_use]
    pub fn slug(&self) -> String {
        canonical_slug(&self.id)
    }

    /// Question form of the title, used as link anchor text.
    #[must_use]
    pub fn question_title(&self) -> String {
        if let Some(question) = self.question.as_deref().map(str::trim) {
            if !question.is_empty() {
                return question.to_string();
            }
        }

        let title = self.title.trim();
        if title.ends_with('?') {
            title.to_string()
        } else {
            format!("{title}?")
        }
    }
}

#[must_use]
pub fn canonical_slug(topic_id: &str) -> String {
    topic_id.trim().to_ascii_lowercase().replace('_', "-")
}

/// Presence check for precomputed baseline decisions. The baseline store
/// itself is opaque to this crate.
pub trait BaselineLookup {
    fn has_baseline(&self, topic_id: &str) -> bool;
}

impl BaselineLookup for BTreeSet<String> {
    fn has_baseline(&self, topic_id: &str) -> bool {
        self.contains(topic_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct BaselineIndex(BTreeSet<String>);

impl BaselineIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topic_id: impl Into<String>) -> bool {
        self.0.insert(topic_id.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for BaselineIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl BaselineLookup for BaselineIndex {
    fn has_baseline(&self, topic_id: &str) -> bool {
        self.0.contains(topic_id)
    }
}

/// Immutable, ordered collection of topics. Catalog order is significant: it
/// is the tie-break order for related-link ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
    index: BTreeMap<String, usize>,
}

impl TopicCatalog {
    /// Build a catalog, preserving the given order.
    ///
    /// # Errors
    /// Returns [`ContentError::Validation`] when a topic id is empty or appears
    /// more than once.
    pub fn new(topics: Vec<Topic>) -> Result<Self, ContentError> {
        let mut index = BTreeMap::new();
        for (position, topic) in topics.iter().enumerate() {
            if topic.id.trim().is_empty() {
                return Err(ContentError::Validation(format!(
                    "topic at position {position} MUST have a non-empty id"
                )));
            }
            if index.insert(topic.id.clone(), position).is_some() {
                return Err(ContentError::Validation(format!(
                    "duplicate topic id `{}`",
                    topic.id
                )));
            }
        }

        Ok(Self { topics, index })
    }

    #[must_use]
    pub fn get(&self, topic_id: &str) -> Option<&Topic> {
        self.index.get(topic_id).map(|position| &self.topics[*position])
    }

    #[must_use]
    pub fn contains(&self, topic_id: &str) -> bool {
        self.index.contains_key(topic_id)
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Content lints that do not prevent the catalog from being used.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();
        for topic in &self.topics {
            if topic.title.trim().is_empty() {
                issues.push(ValidationIssue::error(
                    "empty_title",
                    format!("topic `{}` MUST have a non-empty title", topic.id),
                ));
            }
            if topic.bucket.trim().is_empty() {
                issues.push(ValidationIssue::error(
                    "empty_bucket",
                    format!("topic `{}` MUST have a non-empty bucket", topic.id),
                ));
            }
        }

        if !self.topics.is_empty()
            && !self.topics.iter().any(|topic| topic.launch_priority.is_top_tier())
        {
            issues.push(ValidationIssue::warning(
                "no_top_tier_topics",
                "no topic is at the top launch tier; related links will be empty",
            ));
        }

        ValidationReport::from_issues(issues)
    }
}

impl<'a> IntoIterator for &'a TopicCatalog {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.topics.iter()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn topic(id: &str, bucket: &str, priority: LaunchPriority) -> Topic {
        Topic {
            id: id.to_string(),
            bucket: bucket.to_string(),
            title: format!("Title for {id}"),
            question: None,
            assurance_eligible: false,
            seo_intent: SeoIntent::Medium,
            launch_priority: priority,
        }
    }
}
