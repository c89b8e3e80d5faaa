//! Shared types used across the registry, inventory and resize commands.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Aggregate result of a per-file batch operation.
///
/// Batches never fail atomically: each item either lands in `succeeded` or is
/// recorded with its error in `failures`, and the remaining items still run.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "E: fmt::Display"))]
pub struct BatchOutcome<E> {
    pub succeeded: Vec<PathBuf>,
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<(PathBuf, E)>,
}

impl<E> BatchOutcome<E> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn success(&mut self, path: PathBuf) {
        self.succeeded.push(path);
    }

    pub fn failure(&mut self, path: PathBuf, error: E) {
        self.failures.push((path, error));
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<E> Default for BatchOutcome<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_failures<S, E>(failures: &[(PathBuf, E)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    E: fmt::Display,
{
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(failures.len()))?;
    for (path, error) in failures {
        seq.serialize_element(&FailureRecord {
            path: path.display().to_string(),
            error: error.to_string(),
        })?;
    }
    seq.end()
}

#[derive(Serialize)]
struct FailureRecord {
    path: String,
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_counts_successes_and_failures() {
        let mut outcome: BatchOutcome<String> = BatchOutcome::new();
        outcome.success("a.png".into());
        outcome.success("b.png".into());
        outcome.failure("c.png".into(), "locked".to_string());

        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert!(!outcome.is_clean());
    }

    #[test]
    fn outcome_serializes_errors_as_strings() {
        let mut outcome: BatchOutcome<String> = BatchOutcome::new();
        outcome.failure("c.png".into(), "locked".to_string());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["failures"][0]["path"], "c.png");
        assert_eq!(json["failures"][0]["error"], "locked");
        assert_eq!(json["succeeded"].as_array().unwrap().len(), 0);
    }
}
