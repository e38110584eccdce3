use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::topic::Topic;
use crate::ContentError;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TagPattern {
    pub pattern: String,
    pub tags: Vec<String>,
}

impl TagPattern {
    fn new(pattern: &str, tags: &[&str]) -> Self {
        Self { pattern: pattern.to_string(), tags: tags.iter().map(ToString::to_string).collect() }
    }
}

/// Ordered substring-to-tags table.
///
/// Matching is plain, unanchored substring containment, so one identifier can
/// pick up tags from several unrelated entries. Related-link discovery wants
/// recall more than precision.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(try_from = "Vec<TagPattern>", into = "Vec<TagPattern>")]
pub struct TagPatternTable {
    entries: Vec<TagPattern>,
}

impl TagPatternTable {
    /// # Errors
    /// Returns [`ContentError::Validation`] when an entry has an empty pattern,
    /// which would match every identifier.
    pub fn new(entries: Vec<TagPattern>) -> Result<Self, ContentError> {
        if let Some(position) = entries.iter().position(|entry| entry.pattern.is_empty()) {
            return Err(ContentError::Validation(format!(
                "tag pattern at position {position} MUST be non-empty"
            )));
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[TagPattern] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags for `topic_id` plus the owning topic's bucket tag.
    #[must_use]
    pub fn extract(&self, topic_id: &str, topic: &Topic) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        for entry in &self.entries {
            if topic_id.contains(entry.pattern.as_str()) {
                tags.extend(entry.tags.iter().cloned());
            }
        }
        tags.insert(bucket_tag(&topic.bucket));
        tags
    }
}

impl TryFrom<Vec<TagPattern>> for TagPatternTable {
    type Error = ContentError;

    fn try_from(entries: Vec<TagPattern>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<TagPatternTable> for Vec<TagPattern> {
    fn from(table: TagPatternTable) -> Self {
        table.entries
    }
}

impl Default for TagPatternTable {
    fn default() -> Self {
        Self {
            entries: vec![
                // destinations
                TagPattern::new("tanzania", &["africa", "east-africa", "safari"]),
                TagPattern::new("kenya", &["africa", "east-africa", "safari"]),
                TagPattern::new("morocco", &["africa", "north-africa"]),
                TagPattern::new("japan", &["asia", "east-asia"]),
                TagPattern::new("bali", &["asia", "southeast-asia", "islands"]),
                TagPattern::new("thailand", &["asia", "southeast-asia"]),
                TagPattern::new("iceland", &["europe", "northern-lights"]),
                TagPattern::new("italy", &["europe", "mediterranean"]),
                TagPattern::new("greece", &["europe", "mediterranean", "islands"]),
                TagPattern::new("portugal", &["europe"]),
                TagPattern::new("mexico", &["americas", "latin-america"]),
                TagPattern::new("peru", &["americas", "latin-america", "hiking"]),
                TagPattern::new("caribbean", &["americas", "islands", "beach"]),
                // seasons and months
                TagPattern::new("january", &["winter", "off-peak"]),
                TagPattern::new("february", &["winter", "off-peak"]),
                TagPattern::new("march", &["spring", "shoulder-season"]),
                TagPattern::new("april", &["spring", "shoulder-season"]),
                TagPattern::new("may", &["spring", "shoulder-season"]),
                TagPattern::new("june", &["summer", "peak-season"]),
                TagPattern::new("july", &["summer", "peak-season"]),
                TagPattern::new("august", &["summer", "peak-season"]),
                TagPattern::new("september", &["autumn", "shoulder-season"]),
                TagPattern::new("october", &["autumn", "shoulder-season"]),
                TagPattern::new("november", &["autumn", "off-peak"]),
                TagPattern::new("december", &["winter", "holidays"]),
                TagPattern::new("christmas", &["winter", "holidays"]),
                TagPattern::new("cherry-blossom", &["spring", "festivals"]),
                TagPattern::new("monsoon", &["weather", "rainy-season"]),
                TagPattern::new("rainy", &["weather", "rainy-season"]),
                TagPattern::new("hurricane", &["weather", "storm-risk"]),
                // trip styles
                TagPattern::new("safari", &["wildlife", "safari"]),
                TagPattern::new("migration", &["wildlife", "safari"]),
                TagPattern::new("beach", &["beach", "relaxation"]),
                TagPattern::new("ski", &["winter", "mountains"]),
                TagPattern::new("hike", &["hiking", "mountains"]),
                TagPattern::new("trek", &["hiking", "mountains"]),
                TagPattern::new("honeymoon", &["couples", "romance"]),
                TagPattern::new("family", &["family", "kids"]),
                TagPattern::new("kids", &["family", "kids"]),
                TagPattern::new("solo", &["solo-travel"]),
                // money and logistics
                TagPattern::new("budget", &["value", "budget"]),
                TagPattern::new("cost", &["value", "budget"]),
                TagPattern::new("worth", &["value"]),
                TagPattern::new("points", &["loyalty", "value"]),
                TagPattern::new("flight", &["flights", "logistics"]),
                TagPattern::new("layover", &["flights", "logistics"]),
                TagPattern::new("hotel", &["lodging"]),
                TagPattern::new("visa", &["documents", "logistics"]),
                TagPattern::new("insurance", &["risk", "logistics"]),
                TagPattern::new("refund", &["risk", "booking"]),
                TagPattern::new("book", &["booking"]),
                TagPattern::new("wait", &["timing", "booking"]),
                TagPattern::new("crowd", &["crowds", "peak-season"]),
            ],
        }
    }
}

/// Bucket name rendered as a tag (`destination_choice` -> `destination-choice`).
#[must_use]
pub fn bucket_tag(bucket: &str) -> String {
    bucket.replace('_', "-")
}

/// Tags for `topic_id` from `table`, always including the topic's bucket tag.
#[must_use]
pub fn extract_tags(topic_id: &str, topic: &Topic, table: &TagPatternTable) -> BTreeSet<String> {
    table.extract(topic_id, topic)
}
