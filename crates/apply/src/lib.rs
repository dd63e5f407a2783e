//! Three-way merge of structured documents.
//!
//! `merge(observed, last_applied, desired)` computes what `observed` would
//! look like after applying `desired` on top of it:
//!
//! - keys in `desired` are written onto `observed` (objects recurse)
//! - keys in `last_applied` but no longer in `desired` are removed
//! - keys only present in `observed` are left untouched
//! - lists whose items all carry a `name` are merged item by item,
//!   any other list is replaced wholesale
//!
//! Two non-null values of different JSON kinds at the same path are a
//! [`MergeError::TypeMismatch`]; the merge never coerces `3` into `"3"`.

use runassert_core::resource::value_kind;
use runassert_core::{Document, MergeError, Merger};
use serde_json::Value;
use tracing::trace;

/// Stateless [`Merger`] implementing the semantics above.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeWayMerger;

impl ThreeWayMerger {
    pub fn new() -> Self {
        Self
    }
}

impl Merger for ThreeWayMerger {
    fn merge(
        &self,
        observed: &Document,
        last_applied: &Document,
        desired: &Document,
    ) -> Result<Document, MergeError> {
        merge(observed, last_applied, desired)
    }
}

/// Merge `desired` onto a copy of `observed` using `last_applied` as baseline.
pub fn merge(
    observed: &Document,
    last_applied: &Document,
    desired: &Document,
) -> Result<Document, MergeError> {
    let mut merged = observed.clone();
    merge_object(&mut merged, Some(last_applied), desired, "")?;
    Ok(merged)
}

fn merge_object(
    observed: &mut Document,
    last_applied: Option<&Document>,
    desired: &Document,
    path: &str,
) -> Result<(), MergeError> {
    if let Some(last) = last_applied {
        for key in last.keys().filter(|k| !desired.contains_key(*k)) {
            if observed.remove(key).is_some() {
                trace!(path = %join(path, key), "removed field no longer desired");
            }
        }
    }

    for (key, desired_value) in desired {
        let last_value = last_applied.and_then(|l| l.get(key));
        match observed.get_mut(key) {
            Some(observed_value) => {
                merge_value(observed_value, last_value, desired_value, &join(path, key))?
            }
            None => {
                observed.insert(key.clone(), desired_value.clone());
            }
        }
    }
    Ok(())
}

fn merge_value(
    observed: &mut Value,
    last_applied: Option<&Value>,
    desired: &Value,
    path: &str,
) -> Result<(), MergeError> {
    if let (Value::Object(o), Value::Object(d)) = (&mut *observed, desired) {
        return merge_object(o, last_applied.and_then(Value::as_object), d, path);
    }
    if let (Value::Array(o), Value::Array(d)) = (&mut *observed, desired) {
        return merge_list(o, last_applied.and_then(Value::as_array), d, path);
    }
    if observed.is_null() || desired.is_null() || value_kind(observed) == value_kind(desired) {
        *observed = desired.clone();
        return Ok(());
    }
    Err(MergeError::TypeMismatch {
        path: path.to_string(),
        observed: value_kind(observed),
        desired: value_kind(desired),
    })
}

fn merge_list(
    observed: &mut Vec<Value>,
    last_applied: Option<&Vec<Value>>,
    desired: &[Value],
    path: &str,
) -> Result<(), MergeError> {
    if desired.is_empty() || !is_named_list(desired) || !is_named_list(observed) {
        *observed = desired.to_vec();
        return Ok(());
    }

    if let Some(last) = last_applied.filter(|l| is_named_list(l)) {
        observed.retain(|item| {
            let name = item_name(item);
            let dropped = last.iter().any(|l| item_name(l) == name)
                && !desired.iter().any(|d| item_name(d) == name);
            !dropped
        });
    }

    for desired_item in desired {
        let name = item_name(desired_item);
        let last_item = last_applied.and_then(|l| l.iter().find(|i| item_name(i) == name));
        match observed.iter_mut().find(|o| item_name(o) == name) {
            Some(observed_item) => merge_value(
                observed_item,
                last_item,
                desired_item,
                &format!("{path}[{}]", name.unwrap_or_default()),
            )?,
            None => observed.push(desired_item.clone()),
        }
    }
    Ok(())
}

fn item_name(item: &Value) -> Option<&str> {
    item.get("name").and_then(Value::as_str)
}

fn is_named_list(items: &[Value]) -> bool {
    items.iter().all(|i| item_name(i).is_some())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn desired_fields_overlay_observed() {
        let observed = doc(json!({"spec": {"replicas": 1, "paused": false}}));
        let desired = doc(json!({"spec": {"replicas": 3}}));
        let merged = merge(&observed, &desired, &desired).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"spec": {"replicas": 3, "paused": false}})
        );
    }

    #[test]
    fn fields_dropped_from_desired_are_removed() {
        let observed = doc(json!({"a": 1, "b": 2, "c": 3}));
        let last = doc(json!({"a": 1, "b": 2}));
        let desired = doc(json!({"a": 5}));
        let merged = merge(&observed, &last, &desired).unwrap();
        assert_eq!(Value::Object(merged), json!({"a": 5, "c": 3}));
    }

    #[test]
    fn subset_desired_leaves_observed_unchanged() {
        let observed = doc(json!({
            "kind": "Pod",
            "metadata": {"name": "p", "labels": {"hi": "there", "extra": "x"}},
            "status": {"phase": "Running", "podIP": "10.0.0.1"}
        }));
        let desired = doc(json!({
            "kind": "Pod",
            "metadata": {"labels": {"hi": "there"}},
            "status": {"phase": "Running"}
        }));
        let merged = merge(&observed, &desired, &desired).unwrap();
        assert_eq!(merged, observed);
    }

    #[test]
    fn number_versus_string_is_a_type_mismatch() {
        let observed = doc(json!({"spec": {"replicas": 3}}));
        let desired = doc(json!({"spec": {"replicas": "3"}}));
        let err = merge(&observed, &desired, &desired).unwrap_err();
        assert_eq!(
            err,
            MergeError::TypeMismatch {
                path: "spec.replicas".into(),
                observed: "number",
                desired: "string",
            }
        );
    }

    #[test]
    fn object_versus_scalar_is_a_type_mismatch() {
        let observed = doc(json!({"spec": "none"}));
        let desired = doc(json!({"spec": {"replicas": 1}}));
        assert!(merge(&observed, &desired, &desired).is_err());
    }

    #[test]
    fn null_is_replaceable() {
        let observed = doc(json!({"status": null}));
        let desired = doc(json!({"status": {"phase": "Running"}}));
        let merged = merge(&observed, &desired, &desired).unwrap();
        assert_eq!(Value::Object(merged), json!({"status": {"phase": "Running"}}));
    }

    #[test]
    fn named_lists_merge_by_name() {
        let observed = doc(json!({"containers": [
            {"name": "app", "image": "app:1", "ports": [80]},
            {"name": "sidecar", "image": "proxy:1"}
        ]}));
        let desired = doc(json!({"containers": [
            {"name": "app", "image": "app:2"},
            {"name": "init", "image": "busybox"}
        ]}));
        let merged = merge(&observed, &desired, &desired).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"containers": [
                {"name": "app", "image": "app:2", "ports": [80]},
                {"name": "sidecar", "image": "proxy:1"},
                {"name": "init", "image": "busybox"}
            ]})
        );
    }

    #[test]
    fn named_list_items_dropped_from_desired_are_removed() {
        let observed = doc(json!({"containers": [{"name": "a"}, {"name": "b"}, {"name": "c"}]}));
        let last = doc(json!({"containers": [{"name": "a"}, {"name": "b"}]}));
        let desired = doc(json!({"containers": [{"name": "a"}]}));
        let merged = merge(&observed, &last, &desired).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"containers": [{"name": "a"}, {"name": "c"}]})
        );
    }

    #[test]
    fn plain_lists_are_replaced() {
        let observed = doc(json!({"args": ["a", "b"]}));
        let desired = doc(json!({"args": ["c"]}));
        let merged = merge(&observed, &desired, &desired).unwrap();
        assert_eq!(Value::Object(merged), json!({"args": ["c"]}));
    }

    #[test]
    fn merger_trait_delegates() {
        let observed = doc(json!({"a": 1}));
        let desired = doc(json!({"a": 2}));
        let merged = ThreeWayMerger::new()
            .merge(&observed, &desired, &desired)
            .unwrap();
        assert_eq!(merged["a"], json!(2));
    }
}
