use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, code: code.to_string(), message: message.into() }
    }

    #[must_use]
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, code: code.to_string(), message: message.into() }
    }
}

/// Outcome of validating a content record, returned to the caller as data so
/// it can decide whether and how to surface problems.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ValidationReport {
    pub accepted: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let accepted = !issues.iter().any(|issue| issue.severity == Severity::Error);
        Self { accepted, issues }
    }

    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_alone_do_not_reject() {
        let report = ValidationReport::from_issues(vec![ValidationIssue::warning(
            "unknown_topic",
            "topic `x` is not in the catalog",
        )]);
        assert!(report.accepted);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn any_error_rejects() {
        let report = ValidationReport::from_issues(vec![
            ValidationIssue::warning("no_topics", "post references no topics"),
            ValidationIssue::error("empty_title", "title MUST be non-empty"),
        ]);
        assert!(!report.accepted);
        assert!(report.has_code("empty_title"));
    }
}
