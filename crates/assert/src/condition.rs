//! Evaluation of a single quantified check against a resource list.

use crate::model::{Quantifier, SelectCheck};
use crate::result::Explanations;
use crate::AssertError;
use runassert_core::{IncludeInfo, Matcher, Resource};
use tracing::debug;

/// Inputs for a [`ResourceListCondition`].
#[derive(Debug, Clone)]
pub struct ResourceListConditionConfig<'a> {
    pub task_key: &'a str,
    pub include_info: IncludeInfo,
    pub condition: &'a SelectCheck,
    pub resources: &'a [Resource],
}

/// One [`SelectCheck`] bound to the resources it is evaluated against.
///
/// Construction validates the check. [`is_success`](Self::is_success) may be
/// called repeatedly; every call starts from a clean slate.
#[derive(Debug)]
pub struct ResourceListCondition<'a> {
    task_key: &'a str,
    condition: &'a SelectCheck,
    operator: Quantifier,
    resources: &'a [Resource],
    include_info: IncludeInfo,

    info: Explanations,
    matched: Vec<usize>,
    success_count: usize,
}

impl<'a> ResourceListCondition<'a> {
    pub fn new(config: ResourceListConditionConfig<'a>) -> Result<Self, AssertError> {
        let ResourceListConditionConfig {
            task_key,
            include_info,
            condition,
            resources,
        } = config;

        if task_key.is_empty() {
            return Err(AssertError::invalid_config(task_key, "missing task key"));
        }
        if condition.terms().is_empty() {
            return Err(AssertError::invalid_config(task_key, "missing select terms"));
        }
        if resources.is_empty() {
            return Err(AssertError::invalid_config(task_key, "missing resources"));
        }
        match (condition.operator, condition.count) {
            (Some(op), None) if op.needs_count() => {
                return Err(AssertError::invalid_config(
                    task_key,
                    format!("operator {op} needs a count"),
                ));
            }
            (None, Some(count)) => {
                return Err(AssertError::invalid_config(
                    task_key,
                    format!("count {count} set without an operator"),
                ));
            }
            _ => {}
        }

        Ok(Self {
            task_key,
            condition,
            operator: condition.operator.unwrap_or_default(),
            resources,
            info: Explanations::new(include_info.clone()),
            include_info,
            matched: Vec::new(),
            success_count: 0,
        })
    }

    /// Effective quantifier, after defaulting.
    pub fn operator(&self) -> Quantifier {
        self.operator
    }

    /// Run the check. Matcher errors and empty resources abort the run.
    pub fn is_success(&mut self, matcher: &dyn Matcher) -> Result<bool, AssertError> {
        self.info = Explanations::new(self.include_info.clone());
        self.matched.clear();
        self.success_count = 0;

        let check = self.condition.to_json_string();
        for (idx, resource) in self.resources.iter().enumerate() {
            if resource.is_empty() {
                return Err(AssertError::NilResource {
                    task_key: self.task_key.to_string(),
                });
            }

            let matched = matcher
                .matches(self.condition.terms(), resource)
                .map_err(|source| AssertError::Match {
                    task_key: self.task_key.to_string(),
                    source,
                })?;

            if matched {
                debug!(
                    task = self.task_key,
                    namespace = resource.namespace(),
                    name = resource.name(),
                    "resource matched condition"
                );
                self.success_count += 1;
                self.matched.push(idx);
                self.info.matched(|| {
                    format!(
                        "Assert condition matched for \"{}\" / \"{}\": {}: \n{}",
                        resource.namespace(),
                        resource.name(),
                        resource.gvk(),
                        check
                    )
                });
            } else {
                debug!(
                    task = self.task_key,
                    namespace = resource.namespace(),
                    name = resource.name(),
                    "resource did not match condition"
                );
                self.info.not_matched(|| {
                    format!(
                        "Assert condition failed for \"{}\" / \"{}\": {}: \n{}",
                        resource.namespace(),
                        resource.name(),
                        resource.gvk(),
                        check
                    )
                });
            }

            if self.operator == Quantifier::Exists && self.success_count > 0 {
                debug!(task = self.task_key, index = idx, "exists satisfied, stopping early");
                return Ok(true);
            }
        }

        let count = self.condition.count;
        let success = match self.operator {
            Quantifier::Exists => self.success_count > 0,
            Quantifier::NotExist => self.success_count == 0,
            Quantifier::EqualsCount => count.is_some_and(|c| self.success_count == c),
            Quantifier::Gte => count.is_some_and(|c| self.success_count >= c),
            Quantifier::Lte => count.is_some_and(|c| self.success_count <= c),
        };
        Ok(success)
    }

    /// Indexes into the resource list of every resource matched in the last run.
    pub fn matched_indices(&self) -> &[usize] {
        &self.matched
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn info(&self) -> &Explanations {
        &self.info
    }

    pub fn into_info(self) -> Explanations {
        self.info
    }
}
