//! Error types raised by the engine's collaborators.
//!
//! Both enums carry an `Other` variant so that host-provided implementations
//! can report failures the reference implementations never produce.

use thiserror::Error;

/// Failure while evaluating selector terms against a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("field {path:?} holds a {found}, expected a string")]
    NonStringField { path: String, found: &'static str },

    #[error("invalid selector requirement for key {key:?}: {reason}")]
    InvalidRequirement { key: String, reason: String },

    #[error("{0}")]
    Other(String),
}

/// Failure while computing a three-way merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("can't merge {desired} into {observed} at {path:?}")]
    TypeMismatch {
        path: String,
        observed: &'static str,
        desired: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

/// A string that names none of an enum's variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} {value:?}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variant_names_the_value() {
        let err = UnknownVariant::new("operator", "AtLeast");
        assert_eq!(err.to_string(), r#"unknown operator "AtLeast""#);
    }

    #[test]
    fn non_string_field_displays_path() {
        let err = MatchError::NonStringField {
            path: "spec.replicas".into(),
            found: "number",
        };
        assert!(err.to_string().contains("spec.replicas"));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn type_mismatch_displays_both_kinds() {
        let err = MergeError::TypeMismatch {
            path: "spec.replicas".into(),
            observed: "number",
            desired: "string",
        };
        let msg = err.to_string();
        assert!(msg.contains("string"));
        assert!(msg.contains("number"));
        assert!(msg.contains("spec.replicas"));
    }
}
