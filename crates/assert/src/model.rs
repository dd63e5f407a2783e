//! Assertion data model: checks, operators and the request envelope.

use runassert_core::{IncludeInfo, Resource, SelectTerm, UnknownVariant};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Per-check success rule applied to the number of selected resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    /// At least one resource is selected. Evaluation stops at the first match.
    #[default]
    Exists,
    /// No resource is selected.
    NotExist,
    /// Exactly `count` resources are selected.
    EqualsCount,
    /// At least `count` resources are selected.
    #[serde(rename = "GTE")]
    Gte,
    /// At most `count` resources are selected.
    #[serde(rename = "LTE")]
    Lte,
}

impl Quantifier {
    /// Whether this quantifier compares against a configured count.
    pub fn needs_count(&self) -> bool {
        matches!(
            self,
            Quantifier::EqualsCount | Quantifier::Gte | Quantifier::Lte
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quantifier::Exists => "Exists",
            Quantifier::NotExist => "NotExist",
            Quantifier::EqualsCount => "EqualsCount",
            Quantifier::Gte => "GTE",
            Quantifier::Lte => "LTE",
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quantifier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Exists" => Ok(Quantifier::Exists),
            "NotExist" => Ok(Quantifier::NotExist),
            "EqualsCount" => Ok(Quantifier::EqualsCount),
            "GTE" => Ok(Quantifier::Gte),
            "LTE" => Ok(Quantifier::Lte),
            other => Err(UnknownVariant::new("operator", other)),
        }
    }
}

/// How the outcomes of several checks are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOperator {
    #[serde(rename = "AND")]
    And,
    #[default]
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for CombineOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineOperator::And => f.write_str("AND"),
            CombineOperator::Or => f.write_str("OR"),
        }
    }
}

/// Selects resources through a list of OR-ed terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSelector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selector_terms: Vec<SelectTerm>,
}

/// One quantified selector check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectCheck {
    #[serde(rename = "resourceSelector", default)]
    pub selector: ResourceSelector,

    /// Defaults to [`Quantifier::Exists`].
    #[serde(
        rename = "resourceSelectOperator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operator: Option<Quantifier>,

    /// Required by the count based quantifiers and only allowed with an
    /// explicit operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl SelectCheck {
    pub fn new(terms: Vec<SelectTerm>) -> Self {
        Self {
            selector: ResourceSelector {
                selector_terms: terms,
            },
            operator: None,
            count: None,
        }
    }

    pub fn with_operator(mut self, operator: Quantifier) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn terms(&self) -> &[SelectTerm] {
        &self.selector.selector_terms
    }

    /// Compact JSON rendering used in explanation lines.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            debug!(error = %e, "failed to render select check");
            String::new()
        })
    }
}

impl fmt::Display for SelectCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

/// What to assert: a desired state, or a list of combined checks.
///
/// Exactly one of the two must be populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assert {
    /// Desired state asserted as a whole. Must carry `kind` and `apiVersion`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Resource>,

    /// Defaults to [`CombineOperator::Or`].
    #[serde(
        rename = "resourceCheckOperator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub check_operator: Option<CombineOperator>,

    #[serde(
        rename = "resourceSelectChecks",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub select_checks: Vec<SelectCheck>,
}

impl Assert {
    /// Assert a desired state.
    pub fn state(state: Resource) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Assert a list of checks combined with `operator`.
    pub fn checks(operator: Option<CombineOperator>, checks: Vec<SelectCheck>) -> Self {
        Self {
            state: None,
            check_operator: operator,
            select_checks: checks,
        }
    }

    /// True when a non-empty desired state is set.
    pub fn has_state(&self) -> bool {
        self.state.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_checks(&self) -> bool {
        !self.select_checks.is_empty()
    }
}

/// Input to a single assertion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertRequest {
    #[serde(default)]
    pub task_key: String,

    #[serde(rename = "includeInfoOn", default, skip_serializing_if = "IncludeInfo::is_empty")]
    pub include_info: IncludeInfo,

    #[serde(default)]
    pub assert: Assert,

    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl AssertRequest {
    pub fn new(task_key: impl Into<String>, assert: Assert, resources: Vec<Resource>) -> Self {
        Self {
            task_key: task_key.into(),
            include_info: IncludeInfo::default(),
            assert,
            resources,
        }
    }

    pub fn with_include_info(mut self, include_info: IncludeInfo) -> Self {
        self.include_info = include_info;
        self
    }

    /// Decode a request document.
    ///
    /// Malformed documents (unknown operators, non-object resources, ...)
    /// are reported as [`AssertError::InvalidConfig`](crate::AssertError::InvalidConfig).
    pub fn from_value(value: serde_json::Value) -> Result<Self, crate::AssertError> {
        let task_key = value
            .get("taskKey")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        serde_json::from_value(value).map_err(|e| crate::AssertError::InvalidConfig {
            task_key,
            reason: e.to_string(),
        })
    }
}
