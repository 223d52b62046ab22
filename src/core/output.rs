//! Public output types for svcgen command responses.
//!
//! Shared by the operation planner and the CLI; everything here serializes
//! into the `data` field of the JSON envelope.

use serde::Serialize;

// ============================================================================
// Bulk Operations (for commands that process multiple items)
// ============================================================================

/// Standardized bulk execution result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult<T: Serialize> {
    pub action: String,
    pub results: Vec<ItemOutcome<T>>,
    pub summary: BulkSummary,
}

/// Outcome for a single item in a bulk operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome<T: Serialize> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of bulk operation results.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T: Serialize> BulkResult<T> {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            results: Vec::new(),
            summary: BulkSummary::default(),
        }
    }

    pub fn record(&mut self, id: impl Into<String>, result: crate::Result<T>) {
        self.summary.total += 1;
        let outcome = match result {
            Ok(value) => {
                self.summary.succeeded += 1;
                ItemOutcome {
                    id: id.into(),
                    result: Some(value),
                    error: None,
                }
            }
            Err(err) => {
                self.summary.failed += 1;
                ItemOutcome {
                    id: id.into(),
                    result: None,
                    error: Some(describe_error(&err)),
                }
            }
        };
        self.results.push(outcome);
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// `code: message (details)` for embedding an error inside a successful response.
pub fn describe_error(err: &crate::Error) -> String {
    match err.details.as_object() {
        Some(map) if !map.is_empty() => {
            format!("{}: {} ({})", err.code.as_str(), err.message, err.details)
        }
        _ => format!("{}: {}", err.code.as_str(), err.message),
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// A step that was skipped or failed without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationWarning {
    /// What was being attempted (`solution_add`, `register`, ...).
    pub step: String,
    /// File, project or service the step acted on.
    pub target: String,
    pub message: String,
}

impl OperationWarning {
    pub fn new(step: &str, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn from_error(step: &str, target: impl Into<String>, err: &crate::Error) -> Self {
        Self::new(step, target, describe_error(err))
    }
}
