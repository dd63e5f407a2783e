//! Explanations, warnings and the final phase of an assertion run.

use runassert_core::IncludeInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Terminal outcome of an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AssertPassed,
    AssertFailed,
}

impl Phase {
    pub fn from_success(success: bool) -> Self {
        if success {
            Phase::AssertPassed
        } else {
            Phase::AssertFailed
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Phase::AssertPassed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AssertPassed => f.write_str("AssertPassed"),
            Phase::AssertFailed => f.write_str("AssertFailed"),
        }
    }
}

/// The auditable outcome of one assertion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertResult {
    pub phase: Phase,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub desired_resources_info: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_resources_info: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(default)]
    pub has_run_once: bool,
}

impl AssertResult {
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            debug!(error = %e, "failed to render assert result");
            String::new()
        })
    }
}

/// Collects explanation lines, keeping only what the caller opted in to.
///
/// Messages are built lazily so that disabled verbosity costs nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explanations {
    include: IncludeInfo,
    desired: Vec<String>,
    skipped: Vec<String>,
    warnings: Vec<String>,
}

impl Explanations {
    pub fn new(include: IncludeInfo) -> Self {
        Self {
            include,
            ..Self::default()
        }
    }

    pub fn matched(&mut self, message: impl FnOnce() -> String) {
        if self.include.desired() {
            self.desired.push(message());
        }
    }

    pub fn not_matched(&mut self, message: impl FnOnce() -> String) {
        if self.include.skipped() {
            self.skipped.push(message());
        }
    }

    pub fn warn(&mut self, message: impl FnOnce() -> String) {
        if self.include.warnings() {
            self.warnings.push(message());
        }
    }

    /// Append lines gathered by a nested evaluation, filtered by our own flags.
    pub fn absorb(&mut self, other: Explanations) {
        if self.include.desired() {
            self.desired.extend(other.desired);
        }
        if self.include.skipped() {
            self.skipped.extend(other.skipped);
        }
        if self.include.warnings() {
            self.warnings.extend(other.warnings);
        }
    }

    pub fn desired(&self) -> &[String] {
        &self.desired
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Seal the collected lines into a result. Every finished run has run once.
    pub fn into_result(self, phase: Phase) -> AssertResult {
        AssertResult {
            phase,
            desired_resources_info: self.desired,
            skipped_resources_info: self.skipped,
            warnings: self.warnings,
            has_run_once: true,
        }
    }
}

/// Outcome of a single task as tracked by a host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert_result: Option<AssertResult>,
}

/// Task key → result, for hosts that aggregate many assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskResultList(BTreeMap<String, TaskResult>);

impl TaskResultList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_assert(&mut self, task_key: impl Into<String>, result: AssertResult) {
        self.0.entry(task_key.into()).or_default().assert_result = Some(result);
    }

    pub fn get(&self, task_key: &str) -> Option<&TaskResult> {
        self.0.get(task_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn assert_task_count(&self) -> usize {
        self.assert_phases().count()
    }

    pub fn passed_assert_task_count(&self) -> usize {
        self.assert_phases().filter(Phase::is_passed).count()
    }

    pub fn failed_assert_task_count(&self) -> usize {
        self.assert_phases().filter(|p| !p.is_passed()).count()
    }

    fn assert_phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.0
            .values()
            .filter_map(|r| r.assert_result.as_ref().map(|a| a.phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runassert_core::IncludeInfoKey;

    #[test]
    fn disabled_info_is_dropped() {
        let mut info = Explanations::new(IncludeInfo::new());
        info.matched(|| "m".into());
        info.not_matched(|| "n".into());
        info.warn(|| "w".into());
        let result = info.into_result(Phase::AssertPassed);
        assert!(result.desired_resources_info.is_empty());
        assert!(result.skipped_resources_info.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.has_run_once);
    }

    #[test]
    fn lazy_messages_are_not_built_when_disabled() {
        let mut info = Explanations::new(IncludeInfo::new().enable(IncludeInfoKey::Desired));
        info.not_matched(|| panic!("must not be rendered"));
        info.matched(|| "m".into());
        assert_eq!(info.desired(), ["m".to_string()]);
    }

    #[test]
    fn absorb_respects_own_flags() {
        let all = IncludeInfo::new().enable(IncludeInfoKey::All);
        let mut nested = Explanations::new(all.clone());
        nested.matched(|| "m".into());
        nested.not_matched(|| "n".into());

        let mut outer = Explanations::new(IncludeInfo::new().enable(IncludeInfoKey::Skipped));
        outer.absorb(nested);
        assert!(outer.desired().is_empty());
        assert_eq!(outer.skipped(), ["n".to_string()]);
    }

    #[test]
    fn result_serializes_camel_case() {
        let mut info = Explanations::new(IncludeInfo::new().enable(IncludeInfoKey::All));
        info.warn(|| "recheck".into());
        let raw = info.into_result(Phase::AssertFailed).to_json_string();
        assert_eq!(
            raw,
            r#"{"phase":"AssertFailed","warnings":["recheck"],"hasRunOnce":true}"#
        );
    }

    #[test]
    fn task_result_counts() {
        let mut list = TaskResultList::new();
        let passed = Explanations::default().into_result(Phase::AssertPassed);
        let failed = Explanations::default().into_result(Phase::AssertFailed);
        list.record_assert("a", passed.clone());
        list.record_assert("b", failed);
        list.record_assert("c", passed);
        assert_eq!(list.len(), 3);
        assert_eq!(list.assert_task_count(), 3);
        assert_eq!(list.passed_assert_task_count(), 2);
        assert_eq!(list.failed_assert_task_count(), 1);
        assert_eq!(
            list.get("b").and_then(|r| r.assert_result.as_ref()).map(|r| r.phase),
            Some(Phase::AssertFailed)
        );
    }
}
