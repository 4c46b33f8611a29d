//! Validation errors and the field-scoped issue type they carry.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single rule violation, scoped to the field that caused it.
///
/// Paths use the wire field names, e.g. `route[1].wp[0].target_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more rules failed. The whole document is rejected.
    #[error("{} validation issue(s): {}", .0.len(), render_issues(.0))]
    Invalid(Vec<FieldIssue>),

    /// The document could not be decoded into the expected shape.
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ValidationError {
    /// Issues carried by an `Invalid` error; empty for parse failures.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ValidationError::Invalid(issues) => issues,
            ValidationError::Parse(_) => &[],
        }
    }

    /// True if any issue was reported for `path` exactly.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues().iter().any(|issue| issue.path == path)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Types that check their own invariants and report every violation found.
pub trait Validate {
    /// Append issues for `self` to `issues`, prefixing paths with `path`.
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>);

    /// Fail closed: any single issue rejects the value.
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        self.collect_issues("", &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(issues))
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        for (idx, item) in self.iter().enumerate() {
            item.collect_issues(&format!("{}[{}]", path, idx), issues);
        }
    }
}

/// Decode `value` and validate it in one step.
pub fn parse_validated<T>(value: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(value)?;
    parsed.validate()?;
    Ok(parsed)
}

pub(crate) fn field_path(base: &str, field: &str) -> String {
    if base.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", base, field)
    }
}
