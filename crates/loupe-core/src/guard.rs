//! Aggregation pipeline safety gate.
//!
//! Every aggregation pipeline passes through [`PipelineGuard::check`] before
//! it is submitted to the store. The guard inspects only the top-level
//! operator key of each stage against a deny-list; stage arguments are never
//! interpreted. An operator that can mutate through a key not on the list
//! would slip through — the deny-list is a closed-world assumption, which is
//! why it is configuration data (`safety.denied_stages`) and can be extended
//! without a code change.

use bson::Document;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Stage operators that can write to or reshape stored data.
pub const DEFAULT_DENIED_STAGES: &[&str] = &[
    "$out",
    "$merge",
    "$addFields",
    "$set",
    "$unset",
    "$replaceRoot",
    "$replaceWith",
];

/// Error type for pipeline validation failures.
#[derive(Debug, Clone)]
pub struct GuardError {
    /// The kind of validation failure.
    pub kind: GuardErrorKind,
    /// Human-readable error message.
    pub message: String,
}

/// Categories of pipeline validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardErrorKind {
    /// The pipeline is not a JSON array.
    NotASequence,
    /// The pipeline has no stages.
    Empty,
    /// A stage is not a single-operator document.
    MalformedStage,
    /// A stage uses an operator on the deny-list.
    DeniedStage,
}

impl GuardError {
    fn new(kind: GuardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn not_a_sequence() -> Self {
        Self::new(
            GuardErrorKind::NotASequence,
            "pipeline must be an array of stage documents",
        )
    }

    fn empty() -> Self {
        Self::new(GuardErrorKind::Empty, "pipeline must not be empty")
    }

    fn malformed_stage(index: usize) -> Self {
        Self::new(
            GuardErrorKind::MalformedStage,
            format!("pipeline stage {} is not an object", index),
        )
    }

    fn denied_stage(index: usize, operator: &str) -> Self {
        Self::new(
            GuardErrorKind::DeniedStage,
            format!(
                "pipeline stage {} uses '{}', which can modify data and is not allowed",
                index, operator
            ),
        )
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GuardError {}

/// Validates aggregation pipelines against the mutation deny-list.
#[derive(Debug, Clone)]
pub struct PipelineGuard {
    denied: HashSet<String>,
}

impl Default for PipelineGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_STAGES.iter().map(|s| s.to_string()))
    }
}

impl PipelineGuard {
    /// Create a guard with the given denied stage operators.
    pub fn new(denied_stages: impl IntoIterator<Item = String>) -> Self {
        Self {
            denied: denied_stages.into_iter().collect(),
        }
    }

    /// Check a candidate pipeline, returning the parsed stages on success.
    ///
    /// Fails if the input is not an array, the array is empty, or any stage's
    /// top-level key is on the deny-list. Every stage is scanned; the first
    /// offending stage is the one reported.
    pub fn check(&self, pipeline: &Value) -> Result<Vec<Document>, GuardError> {
        let raw_stages = pipeline.as_array().ok_or_else(GuardError::not_a_sequence)?;
        if raw_stages.is_empty() {
            return Err(GuardError::empty());
        }

        let mut stages = Vec::with_capacity(raw_stages.len());
        let mut offender: Option<GuardError> = None;

        for (index, raw) in raw_stages.iter().enumerate() {
            if !raw.is_object() {
                return Err(GuardError::malformed_stage(index));
            }
            let stage: Document =
                bson::to_document(raw).map_err(|_| GuardError::malformed_stage(index))?;

            // Scan all stages rather than bailing on the first hit, so the
            // reported offender is positionally first even if parsing order
            // ever changes.
            for operator in stage.keys() {
                if self.denied.contains(operator) && offender.is_none() {
                    offender = Some(GuardError::denied_stage(index, operator));
                }
            }

            stages.push(stage);
        }

        match offender {
            Some(error) => Err(error),
            None => Ok(stages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_pipeline_passes() {
        let guard = PipelineGuard::default();
        let pipeline = json!([
            {"$match": {"status": "active"}},
            {"$group": {"_id": "$region", "total": {"$sum": "$amount"}}},
            {"$sort": {"total": -1}}
        ]);

        let stages = guard.check(&pipeline).unwrap();
        assert_eq!(stages.len(), 3);
    }

    #[test]
    fn test_every_denied_stage_rejected() {
        let guard = PipelineGuard::default();
        for operator in DEFAULT_DENIED_STAGES {
            let pipeline = json!([
                {"$match": {}},
                { (*operator): {"anything": 1} }
            ]);
            let err = guard.check(&pipeline).unwrap_err();
            assert_eq!(err.kind, GuardErrorKind::DeniedStage, "{}", operator);
            assert!(err.message.contains(*operator));
        }
    }

    #[test]
    fn test_denied_stage_position_independent() {
        let guard = PipelineGuard::default();
        let pipeline = json!([
            {"$out": "evil"},
            {"$match": {}}
        ]);
        assert!(guard.check(&pipeline).is_err());

        let pipeline = json!([
            {"$match": {}},
            {"$limit": 5},
            {"$merge": {"into": "evil"}}
        ]);
        assert!(guard.check(&pipeline).is_err());
    }

    #[test]
    fn test_first_offender_reported() {
        let guard = PipelineGuard::default();
        let pipeline = json!([
            {"$match": {}},
            {"$set": {"a": 1}},
            {"$out": "evil"}
        ]);
        let err = guard.check(&pipeline).unwrap_err();
        assert!(err.message.contains("$set"));
        assert!(err.message.contains("stage 1"));
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let guard = PipelineGuard::default();
        let err = guard.check(&json!([])).unwrap_err();
        assert_eq!(err.kind, GuardErrorKind::Empty);
    }

    #[test]
    fn test_non_sequence_rejected() {
        let guard = PipelineGuard::default();
        for input in [json!({"$match": {}}), json!("$match"), json!(42), json!(null)] {
            let err = guard.check(&input).unwrap_err();
            assert_eq!(err.kind, GuardErrorKind::NotASequence);
        }
    }

    #[test]
    fn test_non_object_stage_rejected() {
        let guard = PipelineGuard::default();
        let err = guard.check(&json!([{"$match": {}}, "oops"])).unwrap_err();
        assert_eq!(err.kind, GuardErrorKind::MalformedStage);
    }

    #[test]
    fn test_configured_deny_list() {
        let guard = PipelineGuard::new(vec!["$evil".to_string()]);
        // $out is allowed here; only the configured set applies.
        assert!(guard.check(&json!([{"$out": "sink"}])).is_ok());
        assert!(guard.check(&json!([{"$evil": 1}])).is_err());
    }
}
