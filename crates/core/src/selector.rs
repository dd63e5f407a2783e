//! Selector term model.
//!
//! A [`SelectTerm`] bundles match constraints; every constraint in a term
//! must hold for the term to match. A list of terms is OR-ed by the matcher.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One OR-able group of match constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTerm {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_annotations: BTreeMap<String, String>,

    /// Dotted field path → expected string value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_fields: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_label_expressions: Vec<SelectorRequirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_annotation_expressions: Vec<SelectorRequirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_field_expressions: Vec<SelectorRequirement>,
}

impl SelectTerm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    pub fn match_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_annotations.insert(key.into(), value.into());
        self
    }

    pub fn match_field(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_fields.insert(path.into(), value.into());
        self
    }

    pub fn label_expression(mut self, requirement: SelectorRequirement) -> Self {
        self.match_label_expressions.push(requirement);
        self
    }

    pub fn annotation_expression(mut self, requirement: SelectorRequirement) -> Self {
        self.match_annotation_expressions.push(requirement);
        self
    }

    pub fn field_expression(mut self, requirement: SelectorRequirement) -> Self {
        self.match_field_expressions.push(requirement);
        self
    }

    /// A term with no constraints at all.
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
            && self.match_annotations.is_empty()
            && self.match_fields.is_empty()
            && self.match_label_expressions.is_empty()
            && self.match_annotation_expressions.is_empty()
            && self.match_field_expressions.is_empty()
    }
}

/// A set-based requirement: `key In (a, b)`, `key Exists`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRequirement {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl SelectorRequirement {
    pub fn new(key: impl Into<String>, operator: SelectorOperator, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            operator,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_populates_maps() {
        let term = SelectTerm::new()
            .match_field("kind", "Pod")
            .match_label("app", "web");
        assert_eq!(term.match_fields["kind"], "Pod");
        assert_eq!(term.match_labels["app"], "web");
        assert!(!term.is_empty());
        assert!(SelectTerm::new().is_empty());
    }

    #[test]
    fn deserializes_camel_case() {
        let term: SelectTerm = serde_json::from_value(json!({
            "matchFields": {"status.phase": "Running"},
            "matchLabelExpressions": [
                {"key": "app", "operator": "In", "values": ["a", "b"]},
                {"key": "tier", "operator": "DoesNotExist"}
            ]
        }))
        .unwrap();
        assert_eq!(term.match_fields["status.phase"], "Running");
        assert_eq!(term.match_label_expressions.len(), 2);
        assert_eq!(
            term.match_label_expressions[1].operator,
            SelectorOperator::DoesNotExist
        );
    }

    #[test]
    fn serializes_without_empty_constraints() {
        let term = SelectTerm::new().match_label("app", "web");
        let raw = serde_json::to_string(&term).unwrap();
        assert_eq!(raw, r#"{"matchLabels":{"app":"web"}}"#);
    }
}
