//! Resource document: an untyped, Kubernetes-shaped record.
//!
//! A resource is a JSON object. Identity lives at the usual places
//! (`kind`, `apiVersion`, `metadata.name`, `metadata.namespace`) and every
//! other field is reachable with a dotted path such as `status.phase`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A structured document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// An observed or desired resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Document);

impl Resource {
    pub fn new(object: Document) -> Self {
        Self(object)
    }

    /// Build a resource from a JSON value. Fails unless the value is an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn object(&self) -> &Document {
        &self.0
    }

    pub fn into_object(self) -> Document {
        self.0
    }

    /// True when the underlying object has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kind(&self) -> &str {
        self.str_at(&["kind"])
    }

    pub fn api_version(&self) -> &str {
        self.str_at(&["apiVersion"])
    }

    pub fn name(&self) -> &str {
        self.str_at(&["metadata", "name"])
    }

    pub fn namespace(&self) -> &str {
        self.str_at(&["metadata", "namespace"])
    }

    /// String-valued labels. Non-string entries are ignored.
    pub fn labels(&self) -> BTreeMap<String, String> {
        self.string_map_at("labels")
    }

    /// String-valued annotations. Non-string entries are ignored.
    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.string_map_at("annotations")
    }

    /// Overwrite `metadata.name`, creating `metadata` when needed.
    pub fn set_name(&mut self, name: &str) {
        let metadata = self
            .0
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        if let Value::Object(meta) = metadata {
            meta.insert("name".into(), Value::String(name.to_string()));
        }
    }

    /// Look up a field by dotted path, e.g. `spec.template.metadata.labels`.
    ///
    /// Numeric segments index into arrays: `spec.containers.0.image`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Group/version/kind rendered as `apps/v1, Kind=Deployment`.
    pub fn gvk(&self) -> String {
        let (group, version) = match self.api_version().split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", self.api_version()),
        };
        format!("{group}/{version}, Kind={}", self.kind())
    }

    fn str_at(&self, path: &[&str]) -> &str {
        let mut current = match path.first().and_then(|p| self.0.get(*p)) {
            Some(v) => v,
            None => return "",
        };
        for part in &path[1..] {
            current = match current.get(*part) {
                Some(v) => v,
                None => return "",
            };
        }
        current.as_str().unwrap_or("")
    }

    fn string_map_at(&self, key: &str) -> BTreeMap<String, String> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Document> for Resource {
    fn from(object: Document) -> Self {
        Self(object)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} / {:?}: {}", self.namespace(), self.name(), self.gvk())
    }
}

/// Short name of a JSON value's kind, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
