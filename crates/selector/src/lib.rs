//! Reference selector matcher.
//!
//! Evaluates [`SelectTerm`]s against a [`Resource`]:
//!
//! ```text
//! matchFields:            {status.phase: Running}     dotted path == string
//! matchLabels:            {app: web}                  label superset
//! matchAnnotations:       {team: infra}               annotation superset
//! match*Expressions:      key In/NotIn/Exists/DoesNotExist
//! ```
//!
//! All constraints inside one term are AND-ed; the terms themselves are
//! OR-ed and evaluated in order. A term without any constraint never matches.
//!
//! Field selectors compare strings only. A path that resolves to a number,
//! bool, object or array is reported as [`MatchError::NonStringField`]
//! rather than being coerced, so `spec.replicas: 3` never silently equals
//! the selector value `"3"`.

use runassert_core::labels;
use runassert_core::resource::value_kind;
use runassert_core::{
    MatchError, Matcher, Resource, SelectTerm, SelectorOperator, SelectorRequirement,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

/// Stateless [`Matcher`] implementing the selector semantics above.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorMatcher;

impl SelectorMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for SelectorMatcher {
    fn matches(&self, terms: &[SelectTerm], resource: &Resource) -> Result<bool, MatchError> {
        run_match(terms, resource)
    }
}

/// True if any term selects the resource. Stops at the first matching term.
pub fn run_match(terms: &[SelectTerm], resource: &Resource) -> Result<bool, MatchError> {
    for (idx, term) in terms.iter().enumerate() {
        if term_matches(term, resource)? {
            trace!(term = idx, name = resource.name(), "selector term matched");
            return Ok(true);
        }
    }
    Ok(false)
}

fn term_matches(term: &SelectTerm, resource: &Resource) -> Result<bool, MatchError> {
    if term.is_empty() {
        return Ok(false);
    }

    // Field constraints are all resolved so that an ill-typed path is
    // reported no matter which other constraint fails first.
    let mut matched = true;
    for (path, expected) in &term.match_fields {
        if field_str(resource, path)? != Some(expected.as_str()) {
            matched = false;
        }
    }
    for req in &term.match_field_expressions {
        let value = field_str(resource, &req.key)?;
        if !requirement_matches(req, value)? {
            matched = false;
        }
    }
    if !matched {
        return Ok(false);
    }

    let resource_labels = resource.labels();
    if !labels::has_all(&resource_labels, &term.match_labels)
        || !expressions_match(&term.match_label_expressions, &resource_labels)?
    {
        return Ok(false);
    }

    let resource_annotations = resource.annotations();
    if !labels::has_all(&resource_annotations, &term.match_annotations)
        || !expressions_match(&term.match_annotation_expressions, &resource_annotations)?
    {
        return Ok(false);
    }

    Ok(true)
}

fn expressions_match(
    requirements: &[SelectorRequirement],
    set: &BTreeMap<String, String>,
) -> Result<bool, MatchError> {
    for req in requirements {
        if !requirement_matches(req, set.get(&req.key).map(String::as_str))? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn requirement_matches(req: &SelectorRequirement, value: Option<&str>) -> Result<bool, MatchError> {
    let contains = |v: &str| req.values.iter().any(|x| x == v);
    match req.operator {
        SelectorOperator::In | SelectorOperator::NotIn if req.values.is_empty() => {
            Err(MatchError::InvalidRequirement {
                key: req.key.clone(),
                reason: format!("operator {:?} needs at least one value", req.operator),
            })
        }
        SelectorOperator::Exists | SelectorOperator::DoesNotExist if !req.values.is_empty() => {
            Err(MatchError::InvalidRequirement {
                key: req.key.clone(),
                reason: format!("operator {:?} takes no values", req.operator),
            })
        }
        SelectorOperator::In => Ok(value.is_some_and(contains)),
        SelectorOperator::NotIn => Ok(value.is_none_or(|v| !contains(v))),
        SelectorOperator::Exists => Ok(value.is_some()),
        SelectorOperator::DoesNotExist => Ok(value.is_none()),
    }
}

/// Resolve a dotted path to a string. Missing and null fields are `None`.
fn field_str<'a>(resource: &'a Resource, path: &str) -> Result<Option<&'a str>, MatchError> {
    match resource.field(path) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(MatchError::NonStringField {
            path: path.to_string(),
            found: value_kind(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(name: &str, phase: &str) -> Resource {
        Resource::from_value(json!({
            "kind": "Pod",
            "apiVersion": "v1",
            "metadata": {
                "name": name,
                "namespace": "default",
                "labels": {"app": "web", "tier": "frontend"},
                "annotations": {"owner": "infra"}
            },
            "status": {"phase": phase}
        }))
        .unwrap()
    }

    #[test]
    fn match_fields_equality() {
        let terms = [SelectTerm::new()
            .match_field("kind", "Pod")
            .match_field("status.phase", "Running")];
        assert!(run_match(&terms, &pod("a", "Running")).unwrap());
        assert!(!run_match(&terms, &pod("a", "Error")).unwrap());
    }

    #[test]
    fn missing_field_is_no_match() {
        let terms = [SelectTerm::new().match_field("spec.nodeName", "n1")];
        assert!(!run_match(&terms, &pod("a", "Running")).unwrap());
    }

    #[test]
    fn terms_are_ored() {
        let terms = [
            SelectTerm::new().match_field("kind", "Deployment"),
            SelectTerm::new().match_label("app", "web"),
        ];
        assert!(run_match(&terms, &pod("a", "Running")).unwrap());
    }

    #[test]
    fn constraints_in_a_term_are_anded() {
        let terms = [SelectTerm::new()
            .match_field("kind", "Pod")
            .match_label("app", "k8s")];
        assert!(!run_match(&terms, &pod("a", "Running")).unwrap());
    }

    #[test]
    fn empty_term_never_matches() {
        assert!(!run_match(&[SelectTerm::new()], &pod("a", "Running")).unwrap());
        assert!(!run_match(&[], &pod("a", "Running")).unwrap());
    }

    #[test]
    fn annotations_superset() {
        let yes = [SelectTerm::new().match_annotation("owner", "infra")];
        let no = [SelectTerm::new().match_annotation("owner", "apps")];
        assert!(run_match(&yes, &pod("a", "Running")).unwrap());
        assert!(!run_match(&no, &pod("a", "Running")).unwrap());
    }

    #[test]
    fn integer_field_against_string_selector_errors() {
        let sts = Resource::from_value(json!({
            "kind": "StatefulSet",
            "spec": {"replicas": 3}
        }))
        .unwrap();
        let terms = [SelectTerm::new()
            .match_field("kind", "StatefulSet")
            .match_field("spec.replicas", "3")];
        let err = run_match(&terms, &sts).unwrap_err();
        assert_eq!(
            err,
            MatchError::NonStringField {
                path: "spec.replicas".into(),
                found: "number"
            }
        );
    }

    #[test]
    fn string_replicas_match() {
        let sts = Resource::from_value(json!({
            "kind": "StatefulSet",
            "spec": {"replicas": "3"}
        }))
        .unwrap();
        let terms = [SelectTerm::new()
            .match_field("kind", "StatefulSet")
            .match_field("spec.replicas", "3")];
        assert!(run_match(&terms, &sts).unwrap());
    }

    #[test]
    fn label_expressions() {
        let p = pod("a", "Running");
        let check = |req: SelectorRequirement| {
            run_match(&[SelectTerm::new().label_expression(req)], &p).unwrap()
        };
        assert!(check(SelectorRequirement::new("app", SelectorOperator::In, &["web", "db"])));
        assert!(!check(SelectorRequirement::new("app", SelectorOperator::NotIn, &["web"])));
        assert!(check(SelectorRequirement::new("zone", SelectorOperator::NotIn, &["us"])));
        assert!(check(SelectorRequirement::new("tier", SelectorOperator::Exists, &[])));
        assert!(check(SelectorRequirement::new("zone", SelectorOperator::DoesNotExist, &[])));
        assert!(!check(SelectorRequirement::new("zone", SelectorOperator::Exists, &[])));
    }

    #[test]
    fn field_expressions() {
        let terms = [SelectTerm::new().field_expression(SelectorRequirement::new(
            "status.phase",
            SelectorOperator::In,
            &["Running", "Succeeded"],
        ))];
        assert!(run_match(&terms, &pod("a", "Running")).unwrap());
        assert!(!run_match(&terms, &pod("a", "Error")).unwrap());
    }

    #[test]
    fn malformed_requirement_errors() {
        let terms = [SelectTerm::new().label_expression(SelectorRequirement::new(
            "app",
            SelectorOperator::In,
            &[],
        ))];
        assert!(matches!(
            run_match(&terms, &pod("a", "Running")),
            Err(MatchError::InvalidRequirement { .. })
        ));

        let terms = [SelectTerm::new().label_expression(SelectorRequirement::new(
            "app",
            SelectorOperator::Exists,
            &["web"],
        ))];
        assert!(run_match(&terms, &pod("a", "Running")).is_err());
    }

    #[test]
    fn matcher_trait_delegates() {
        let matcher = SelectorMatcher::new();
        let terms = [SelectTerm::new().match_label("app", "web")];
        assert!(matcher.matches(&terms, &pod("a", "Running")).unwrap());
    }
}
