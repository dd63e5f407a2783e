//! Request validation and dispatch.

use crate::assertion::Assertion;
use crate::model::AssertRequest;
use crate::result::AssertResult;
use crate::AssertError;
use runassert_apply::ThreeWayMerger;
use runassert_config::{ConfigError, EngineConfig};
use runassert_core::{IncludeInfo, Matcher, Merger};
use runassert_selector::SelectorMatcher;
use tracing::info;

/// Validate `request` and run its assertion.
///
/// Returns a result for both outcomes. Errors mean nothing was decided.
pub fn execute(
    request: &AssertRequest,
    matcher: &dyn Matcher,
    merger: &dyn Merger,
) -> Result<AssertResult, AssertError> {
    run(Assertion::new(request, matcher, merger), request)
}

fn run(mut assertion: Assertion<'_>, request: &AssertRequest) -> Result<AssertResult, AssertError> {
    validate(request)?;

    let success = if request.assert.has_state() {
        assertion.assert_state()?
    } else {
        assertion.assert_all_conditions()?
    };

    let result = assertion.into_result(success);
    info!(task = %request.task_key, phase = %result.phase, "assert completed");
    Ok(result)
}

fn validate(request: &AssertRequest) -> Result<(), AssertError> {
    let task_key = request.task_key.as_str();
    if task_key.is_empty() {
        return Err(AssertError::invalid_request(task_key, "missing task key"));
    }
    match (request.assert.has_state(), request.assert.has_checks()) {
        (true, true) => {
            return Err(AssertError::invalid_request(
                task_key,
                "can't use both assert state and select checks",
            ));
        }
        (false, false) => {
            return Err(AssertError::invalid_request(
                task_key,
                "missing assert state or select checks",
            ));
        }
        _ => {}
    }
    if request.resources.is_empty() {
        return Err(AssertError::invalid_request(task_key, "missing resources"));
    }
    Ok(())
}

/// Owns the collaborators and the default verbosity for many requests.
pub struct Executor {
    matcher: Box<dyn Matcher>,
    merger: Box<dyn Merger>,
    default_include_info: IncludeInfo,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Box::new(SelectorMatcher), Box::new(ThreeWayMerger))
    }
}

impl Executor {
    pub fn new(matcher: Box<dyn Matcher>, merger: Box<dyn Merger>) -> Self {
        Self {
            matcher,
            merger,
            default_include_info: IncludeInfo::default(),
        }
    }

    /// Reference collaborators with the configured default verbosity.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::default().with_default_include_info(config.assert.include_info()?))
    }

    /// Verbosity used for requests that carry no flags of their own.
    pub fn with_default_include_info(mut self, include_info: IncludeInfo) -> Self {
        self.default_include_info = include_info;
        self
    }

    pub fn execute(&self, request: &AssertRequest) -> Result<AssertResult, AssertError> {
        let mut assertion = Assertion::new(request, self.matcher.as_ref(), self.merger.as_ref());
        if request.include_info.is_empty() {
            assertion = assertion.with_include_info(self.default_include_info.clone());
        }
        run(assertion, request)
    }
}
