//! Label and annotation set helpers.

use std::collections::BTreeMap;

/// True when `actual` contains every key/value pair of `required`.
pub fn has_all(actual: &BTreeMap<String, String>, required: &BTreeMap<String, String>) -> bool {
    required
        .iter()
        .all(|(k, v)| actual.get(k).is_some_and(|a| a == v))
}
