use crate::CollectionTag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const KEY_FIELD: &str = "Key";
const VALUE_FIELD: &str = "Value";
const REF_VALUE_FIELD: &str = "value";
const REF_TYPE_FIELD: &str = "$type";

/// Identifier of an entity, unique only within its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub i64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference that carries the collection it points into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TaggedRef {
    pub tag: CollectionTag,
    pub key: EntityKey,
}

/// Fields of one entity, addressed by dotted paths (`resources.Boost`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: EntityKey,
    fields: Map<String, Value>,
}

impl Record {
    /// Decodes `{ "Key": { "value": k }, "Value": { ... } }`. Returns `None`
    /// when the key is missing or not an integer.
    pub(crate) fn from_entry(entry: Value) -> Option<Self> {
        let Value::Object(mut entry) = entry else {
            return None;
        };
        let key = decode_key(entry.get(KEY_FIELD)?)?;
        let fields = match entry.remove(VALUE_FIELD) {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        Some(Self { key, fields })
    }

    #[must_use]
    pub const fn key(&self) -> EntityKey {
        self.key
    }

    #[must_use]
    pub fn str_field(&self, path: &str) -> Option<&str> {
        self.field(path)?.as_str()
    }

    #[must_use]
    pub fn f64_field(&self, path: &str) -> Option<f64> {
        self.field(path)?.as_f64()
    }

    #[must_use]
    pub fn bool_field(&self, path: &str) -> Option<bool> {
        self.field(path)?.as_bool()
    }

    /// `true` only when the field is present and literally `true`.
    #[must_use]
    pub fn flag(&self, path: &str) -> bool {
        self.bool_field(path).unwrap_or(false)
    }

    /// Target key of a reference field; `None` for missing or null references.
    /// The target is not checked for existence, see [`crate::resolve`].
    #[must_use]
    pub fn reference(&self, path: &str) -> Option<EntityKey> {
        decode_key(self.field(path)?)
    }

    #[must_use]
    pub fn tagged_reference(&self, path: &str) -> Option<TaggedRef> {
        let raw = self.field(path)?;
        let key = decode_key(raw)?;
        let tag = raw
            .get(REF_TYPE_FIELD)
            .and_then(Value::as_str)
            .map_or(CollectionTag::Untagged, CollectionTag::from_type_name);
        Some(TaggedRef { tag, key })
    }

    /// Keys of a reference list, skipping null and malformed entries.
    #[must_use]
    pub fn references(&self, path: &str) -> Vec<EntityKey> {
        match self.field(path) {
            Some(Value::Array(items)) => items.iter().filter_map(decode_key).collect(),
            _ => Vec::new(),
        }
    }

    fn field(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

fn decode_key(value: &Value) -> Option<EntityKey> {
    value
        .as_object()?
        .get(REF_VALUE_FIELD)?
        .as_i64()
        .map(EntityKey)
}
