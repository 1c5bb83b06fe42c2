use super::{Collection, DocumentStore, Record, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-process store backing tests and local development. Documents live
/// in per-collection vectors so listing preserves insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn field_matches(record: &Record, field: &str, value: &str) -> bool {
    record
        .fields
        .get(field)
        .and_then(Value::as_str)
        .map(|v| v == value)
        .unwrap_or(false)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let record = Record {
            id: Uuid::new_v4().to_string(),
            version: 1,
            fields,
        };

        let mut collections = self
            .collections
            .write()
            .expect("memory store lock poisoned");
        collections
            .entry(collection)
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Record>, StoreError> {
        let collections = self.collections.read().expect("memory store lock poisoned");

        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.read().expect("memory store lock poisoned");

        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|r| field_matches(r, field, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.read().expect("memory store lock poisoned");

        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        expected_version: u64,
        patch: Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let mut collections = self
            .collections
            .write()
            .expect("memory store lock poisoned");

        let record = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if record.version != expected_version {
            return Err(StoreError::Conflict {
                collection,
                id: id.to_string(),
                expected: expected_version,
                found: record.version,
            });
        }

        for (key, value) in patch {
            record.fields.insert(key, value);
        }
        record.version += 1;

        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[actix_web::test]
    async fn insert_assigns_fresh_ids_and_version_one() {
        let store = MemoryStore::new();

        let a = store
            .insert(Collection::OdRequests, fields(&[("register_no", "R1")]))
            .await
            .unwrap();
        let b = store
            .insert(Collection::OdRequests, fields(&[("register_no", "R2")]))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.version, 1);
    }

    #[actix_web::test]
    async fn find_eq_matches_only_the_requested_field_value() {
        let store = MemoryStore::new();
        store
            .insert(Collection::OdRequests, fields(&[("register_no", "R1")]))
            .await
            .unwrap();
        store
            .insert(Collection::OdRequests, fields(&[("register_no", "R2")]))
            .await
            .unwrap();

        let hits = store
            .find_eq(Collection::OdRequests, "register_no", "R1")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let none = store
            .find_eq(Collection::OdRequests, "register_no", "R9")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[actix_web::test]
    async fn list_preserves_insertion_order() {
        let store = MemoryStore::new();
        for reg in ["R1", "R2", "R3"] {
            store
                .insert(Collection::OdRequests, fields(&[("register_no", reg)]))
                .await
                .unwrap();
        }

        let all = store.list(Collection::OdRequests).await.unwrap();
        let order: Vec<_> = all
            .iter()
            .map(|r| r.fields["register_no"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["R1", "R2", "R3"]);
    }

    #[actix_web::test]
    async fn update_bumps_version_and_merges_patch() {
        let store = MemoryStore::new();
        let rec = store
            .insert(Collection::OdRequests, fields(&[("status", "pending")]))
            .await
            .unwrap();

        let updated = store
            .update(
                Collection::OdRequests,
                &rec.id,
                1,
                fields(&[("status", "forwarded_to_hod")]),
            )
            .await
            .unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.fields["status"], json!("forwarded_to_hod"));
    }

    #[actix_web::test]
    async fn stale_version_update_is_a_conflict() {
        let store = MemoryStore::new();
        let rec = store
            .insert(Collection::OdRequests, fields(&[("status", "pending")]))
            .await
            .unwrap();

        store
            .update(
                Collection::OdRequests,
                &rec.id,
                1,
                fields(&[("status", "approved_by_tutor")]),
            )
            .await
            .unwrap();

        let err = store
            .update(
                Collection::OdRequests,
                &rec.id,
                1,
                fields(&[("status", "rejected_by_tutor")]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict { found: 2, .. }));
    }

    #[actix_web::test]
    async fn update_of_unknown_id_is_not_found() {
        let store = MemoryStore::new();

        let err = store
            .update(Collection::OdRequests, "missing", 1, Map::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
