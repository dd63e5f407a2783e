//! Verbosity flags that decide which explanations end up in a result.

use crate::error::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of information a caller may opt in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncludeInfoKey {
    /// Wildcard: every kind of information.
    #[serde(rename = "*")]
    All,
    /// Resources that satisfied the assertion.
    #[serde(rename = "desired-resources")]
    Desired,
    /// Resources that did not satisfy the assertion.
    #[serde(rename = "skipped-resources")]
    Skipped,
    /// Resources handled explicitly, i.e. explicit update or delete.
    #[serde(rename = "explicit-resources")]
    Explicit,
    #[serde(rename = "warnings")]
    Warnings,
}

impl IncludeInfoKey {
    pub const ALL_KEYS: [IncludeInfoKey; 5] = [
        IncludeInfoKey::All,
        IncludeInfoKey::Desired,
        IncludeInfoKey::Skipped,
        IncludeInfoKey::Explicit,
        IncludeInfoKey::Warnings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncludeInfoKey::All => "*",
            IncludeInfoKey::Desired => "desired-resources",
            IncludeInfoKey::Skipped => "skipped-resources",
            IncludeInfoKey::Explicit => "explicit-resources",
            IncludeInfoKey::Warnings => "warnings",
        }
    }
}

impl fmt::Display for IncludeInfoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncludeInfoKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_KEYS
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("include info key", s))
    }
}

/// The caller's verbosity flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncludeInfo(BTreeMap<IncludeInfoKey, bool>);

impl IncludeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(mut self, key: IncludeInfoKey) -> Self {
        self.0.insert(key, true);
        self
    }

    pub fn set(&mut self, key: IncludeInfoKey, enabled: bool) {
        self.0.insert(key, enabled);
    }

    pub fn is_enabled(&self, key: IncludeInfoKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether match explanations are collected.
    pub fn desired(&self) -> bool {
        self.is_enabled(IncludeInfoKey::Desired) || self.is_enabled(IncludeInfoKey::All)
    }

    /// Whether no-match explanations are collected.
    pub fn skipped(&self) -> bool {
        self.is_enabled(IncludeInfoKey::Skipped) || self.is_enabled(IncludeInfoKey::All)
    }

    /// Warnings ride along with skipped info.
    pub fn warnings(&self) -> bool {
        self.skipped() || self.is_enabled(IncludeInfoKey::Warnings)
    }
}

impl FromIterator<IncludeInfoKey> for IncludeInfo {
    fn from_iter<I: IntoIterator<Item = IncludeInfoKey>>(iter: I) -> Self {
        Self(iter.into_iter().map(|k| (k, true)).collect())
    }
}
