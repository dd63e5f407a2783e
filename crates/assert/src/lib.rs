//! Assertion engine: decides pass/fail for declarative checks over a set of
//! observed resources.
//!
//! An assertion is either a list of quantified selector checks combined with
//! AND/OR, or a single desired-state document compared against every
//! candidate resource through a three-way merge.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    ┌────────────┐    ┌──────────────────┐
//! │ Task runner │───▶│ execute()  │───▶│    Assertion     │
//! │  (request)  │    │ (validate) │    │ condition │ state│
//! └─────────────┘    └────────────┘    └─────┬─────┴──┬───┘
//!                                            │        │
//!                            ResourceListCondition   Merger
//!                                            │
//!                                         Matcher
//!
//!                      Result: AssertPassed │ AssertFailed
//! ```
//!
//! # Example request
//!
//! ```json
//! {
//!   "taskKey": "assert-web-pods",
//!   "includeInfoOn": {"*": true},
//!   "assert": {
//!     "resourceCheckOperator": "AND",
//!     "resourceSelectChecks": [{
//!       "resourceSelector": {"selectorTerms": [{"matchFields": {"status.phase": "Running"}}]},
//!       "resourceSelectOperator": "GTE",
//!       "count": 2
//!     }]
//!   },
//!   "resources": []
//! }
//! ```

mod assertion;
mod condition;
mod executor;
mod model;
mod result;

pub use assertion::Assertion;
pub use condition::{ResourceListCondition, ResourceListConditionConfig};
pub use executor::{Executor, execute};
pub use model::{
    Assert, AssertRequest, CombineOperator, Quantifier, ResourceSelector, SelectCheck,
};
pub use result::{AssertResult, Explanations, Phase, TaskResult, TaskResultList};

use runassert_core::{MatchError, MergeError};

/// Shorthand for fallible engine operations.
pub type AssertOutcome<T> = std::result::Result<T, AssertError>;

/// Errors from the assertion engine.
///
/// None of these carry a partial result: an error aborts the evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertError {
    /// A check or request document is malformed.
    #[error("invalid config for task {task_key:?}: {reason}")]
    InvalidConfig { task_key: String, reason: String },

    /// The request shape is wrong (state and checks, no resources, ...).
    #[error("invalid request for task {task_key:?}: {reason}")]
    InvalidRequest { task_key: String, reason: String },

    #[error("nil or empty resource in task {task_key:?}")]
    NilResource { task_key: String },

    #[error("match failed for task {task_key:?}: {source}")]
    Match {
        task_key: String,
        #[source]
        source: MatchError,
    },

    #[error("merge failed for task {task_key:?}: {source}")]
    Merge {
        task_key: String,
        #[source]
        source: MergeError,
    },
}

impl AssertError {
    pub fn task_key(&self) -> &str {
        match self {
            AssertError::InvalidConfig { task_key, .. }
            | AssertError::InvalidRequest { task_key, .. }
            | AssertError::NilResource { task_key }
            | AssertError::Match { task_key, .. }
            | AssertError::Merge { task_key, .. } => task_key,
        }
    }

    pub(crate) fn invalid_config(task_key: &str, reason: impl Into<String>) -> Self {
        AssertError::InvalidConfig {
            task_key: task_key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_request(task_key: &str, reason: impl Into<String>) -> Self {
        AssertError::InvalidRequest {
            task_key: task_key.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_task() {
        let err = AssertError::invalid_config("t1", "missing select terms");
        assert_eq!(
            err.to_string(),
            r#"invalid config for task "t1": missing select terms"#
        );
        assert_eq!(err.task_key(), "t1");

        let err = AssertError::NilResource {
            task_key: "t2".into(),
        };
        assert_eq!(err.to_string(), r#"nil or empty resource in task "t2""#);
    }

    #[test]
    fn collaborator_error_is_the_source() {
        use std::error::Error;
        let err = AssertError::Merge {
            task_key: "t".into(),
            source: MergeError::Other("boom".into()),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().ends_with("boom"));
    }
}
