use crate::{EntityKey, Record, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tias_snapshot::SnapshotStore;

/// Records of one collection indexed by key.
#[derive(Debug, Clone, Default)]
pub struct View {
    collection: String,
    records: BTreeMap<EntityKey, Record>,
}

impl View {
    #[must_use]
    pub fn empty(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            records: BTreeMap::new(),
        }
    }

    /// Indexes an entity-record array. Non-array documents give an empty
    /// view; entries without a usable key are skipped. The first record
    /// wins when a key repeats.
    #[must_use]
    pub fn from_document(collection: &str, document: Value) -> Self {
        let mut view = Self::empty(collection);
        let Value::Array(entries) = document else {
            log::warn!("Collection {collection} is not an array; treating it as empty");
            return view;
        };

        let mut skipped = 0usize;
        for entry in entries {
            let Some(record) = Record::from_entry(entry) else {
                skipped += 1;
                continue;
            };
            if view.records.contains_key(&record.key()) {
                log::debug!("Duplicate key {} in {collection}; keeping first", record.key());
                continue;
            }
            view.records.insert(record.key(), record);
        }
        if skipped > 0 {
            log::debug!("Skipped {skipped} entries without a key in {collection}");
        }
        view
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&Record> {
        self.records.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        self.records.contains_key(&key)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.records.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loads and indexes one collection. A collection absent from the store is an empty view.
pub fn build_view(store: &SnapshotStore, collection_key: &str) -> Result<View> {
    match store.collection(collection_key)? {
        Some(document) => {
            let view = View::from_document(collection_key, document);
            log::debug!("View {collection_key}: {} records", view.len());
            Ok(view)
        }
        None => {
            log::debug!("Collection {collection_key} missing from snapshot; using empty view");
            Ok(View::empty(collection_key))
        }
    }
}

/// Follows `field_path` on `record` into `target`.
///
/// `None` when the field is absent, the reference is null, or the key is not
/// present in `target`.
#[must_use]
pub fn resolve(target: &View, record: &Record, field_path: &str) -> Option<EntityKey> {
    let key = record.reference(field_path)?;
    if target.contains(key) {
        Some(key)
    } else {
        log::debug!(
            "Dangling reference {}.{field_path} -> {} in {}",
            record.key(),
            key,
            target.collection()
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn indexes_records_by_key() {
        let view = View::from_document(
            "nations",
            json!([
                { "Key": { "value": 2 }, "Value": { "displayName": "France" } },
                { "Key": { "value": 1 }, "Value": { "displayName": "Japan" } },
                { "Value": { "displayName": "keyless" } },
                { "Key": { "value": 1 }, "Value": { "displayName": "duplicate" } }
            ]),
        );
        assert_eq!(view.len(), 2);
        assert_eq!(view.keys().collect::<Vec<_>>(), vec![EntityKey(1), EntityKey(2)]);
        assert_eq!(
            view.get(EntityKey(1)).and_then(|r| r.str_field("displayName")),
            Some("Japan")
        );
    }

    #[test]
    fn non_array_documents_are_empty() {
        assert!(View::from_document("globals", json!({ "a": 1 })).is_empty());
    }

    #[test]
    fn resolve_checks_target_membership() {
        let nations = View::from_document(
            "nations",
            json!([{ "Key": { "value": 5 }, "Value": {} }]),
        );
        let cps = View::from_document(
            "cps",
            json!([
                { "Key": { "value": 1 }, "Value": { "nation": { "value": 5 } } },
                { "Key": { "value": 2 }, "Value": { "nation": { "value": 9 } } },
                { "Key": { "value": 3 }, "Value": { "nation": null } },
                { "Key": { "value": 4 }, "Value": {} }
            ]),
        );
        let resolved: Vec<_> = cps.records().map(|cp| resolve(&nations, cp, "nation")).collect();
        assert_eq!(resolved, vec![Some(EntityKey(5)), None, None, None]);
    }
}
