//! Assertion over a resource list, in condition mode or state mode.

use crate::condition::{ResourceListCondition, ResourceListConditionConfig};
use crate::model::{AssertRequest, CombineOperator};
use crate::result::{AssertResult, Explanations, Phase};
use crate::AssertError;
use runassert_core::{IncludeInfo, Matcher, Merger, Resource, labels};
use tracing::{debug, warn};

/// Evaluates the `assert` block of one request.
///
/// Holds the explanations and match bookkeeping of the last evaluation.
pub struct Assertion<'a> {
    request: &'a AssertRequest,
    include_info: IncludeInfo,
    matcher: &'a dyn Matcher,
    merger: &'a dyn Merger,

    info: Explanations,
    matched: Vec<usize>,
    no_match_count: usize,
}

impl<'a> Assertion<'a> {
    pub fn new(request: &'a AssertRequest, matcher: &'a dyn Matcher, merger: &'a dyn Merger) -> Self {
        Self {
            request,
            include_info: request.include_info.clone(),
            matcher,
            merger,
            info: Explanations::new(request.include_info.clone()),
            matched: Vec::new(),
            no_match_count: 0,
        }
    }

    /// Override the verbosity flags carried by the request.
    pub fn with_include_info(mut self, include_info: IncludeInfo) -> Self {
        self.info = Explanations::new(include_info.clone());
        self.include_info = include_info;
        self
    }

    fn task_key(&self) -> &'a str {
        &self.request.task_key
    }

    fn reset(&mut self) {
        self.info = Explanations::new(self.include_info.clone());
        self.matched.clear();
        self.no_match_count = 0;
    }

    /// Evaluate every select check and combine the outcomes.
    ///
    /// OR stops at the first passing check, AND at the first failing one.
    /// Explanations of every evaluated check are kept.
    pub fn assert_all_conditions(&mut self) -> Result<bool, AssertError> {
        self.reset();
        let request = self.request;
        let operator = request.assert.check_operator.unwrap_or_default();

        let mut at_least_one_success = false;
        for (idx, check) in request.assert.select_checks.iter().enumerate() {
            let mut condition = ResourceListCondition::new(ResourceListConditionConfig {
                task_key: &request.task_key,
                include_info: self.include_info.clone(),
                condition: check,
                resources: &request.resources,
            })?;
            let success = condition.is_success(self.matcher)?;
            self.info.absorb(condition.into_info());

            match operator {
                CombineOperator::Or if success => {
                    debug!(task = self.task_key(), check = idx, "OR satisfied, stopping early");
                    return Ok(true);
                }
                CombineOperator::And if !success => {
                    debug!(task = self.task_key(), check = idx, "AND failed, stopping early");
                    return Ok(false);
                }
                _ => {}
            }
            at_least_one_success |= success;
        }
        Ok(at_least_one_success)
    }

    /// Compare the desired state against every resource sharing its identity.
    ///
    /// A candidate matches when merging the desired state onto it changes
    /// nothing. Passes when no candidate failed to match.
    pub fn assert_state(&mut self) -> Result<bool, AssertError> {
        self.reset();
        let task_key = self.task_key();
        let state = match self.request.assert.state.as_ref() {
            Some(state) if !state.is_empty() => state,
            _ => return Err(AssertError::invalid_request(task_key, "missing assert state")),
        };

        let desired_name = state.name();
        let desired_namespace = state.namespace();
        let desired_labels = state.labels();
        let desired_annotations = state.annotations();

        for (idx, resource) in self.request.resources.iter().enumerate() {
            if resource.is_empty() {
                return Err(AssertError::NilResource {
                    task_key: task_key.to_string(),
                });
            }
            if resource.kind() != state.kind() || resource.api_version() != state.api_version() {
                continue;
            }
            if !desired_name.is_empty() && !resource.name().starts_with(desired_name) {
                continue;
            }
            if !desired_namespace.is_empty() && resource.namespace() != desired_namespace {
                continue;
            }
            if !desired_labels.is_empty() && !labels::has_all(&resource.labels(), &desired_labels) {
                continue;
            }
            if !desired_annotations.is_empty()
                && !labels::has_all(&resource.annotations(), &desired_annotations)
            {
                continue;
            }

            if self.is_state_match(state, resource)? {
                debug!(
                    task = task_key,
                    namespace = resource.namespace(),
                    name = resource.name(),
                    "resource matched state"
                );
                self.matched.push(idx);
                self.info.matched(|| {
                    format!(
                        "Assert state matched for \"{}\" / \"{}\": {}",
                        resource.namespace(),
                        resource.name(),
                        resource.gvk()
                    )
                });
            } else {
                debug!(
                    task = task_key,
                    namespace = resource.namespace(),
                    name = resource.name(),
                    "resource did not match state"
                );
                self.no_match_count += 1;
                self.info.not_matched(|| {
                    format!(
                        "Assert state didn't match for \"{}\" / \"{}\": {}",
                        resource.namespace(),
                        resource.name(),
                        resource.gvk()
                    )
                });
            }
        }

        if self.matched.is_empty() && self.no_match_count == 0 {
            let tried = self.request.resources.len();
            warn!(task = task_key, tried, "no resource matched the assert state identity");
            self.no_match_count += 1;
            self.info.not_matched(|| {
                format!("No matches for assert state: Tried against {tried} resources")
            });
            self.info
                .warn(|| "No matches for given assert: Recheck assert state".to_string());
        }

        Ok(self.no_match_count == 0)
    }

    fn is_state_match(&self, state: &Resource, resource: &Resource) -> Result<bool, AssertError> {
        let mut candidate = resource.clone();
        if !state.name().is_empty() {
            candidate.set_name(state.name());
        }
        let merged = self
            .merger
            .merge(candidate.object(), state.object(), state.object())
            .map_err(|source| AssertError::Merge {
                task_key: self.task_key().to_string(),
                source,
            })?;
        Ok(merged == *candidate.object())
    }

    /// Indexes of resources that matched the desired state.
    pub fn matched_indices(&self) -> &[usize] {
        &self.matched
    }

    /// Number of no-match entries, including the synthetic one.
    pub fn no_match_count(&self) -> usize {
        self.no_match_count
    }

    pub fn info(&self) -> &Explanations {
        &self.info
    }

    /// Seal the last evaluation into a result.
    pub fn into_result(self, success: bool) -> AssertResult {
        self.info.into_result(Phase::from_success(success))
    }
}
