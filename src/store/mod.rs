pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use thiserror::Error;

/// The collections the service reads and writes. Reference collections
/// (departments, faculty, hods) are seeded out of band and never written
/// by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Departments,
    Faculty,
    Hods,
    OdRequests,
    Users,
    RefreshTokens,
}

/// A stored document: schemaless `fields` plus the store-owned envelope.
/// `version` starts at 1 and increments on every update.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub version: u64,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: Collection, id: String },

    #[error("version conflict on {collection}/{id}: expected {expected}, found {found}")]
    Conflict {
        collection: Collection,
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("malformed document {id} in {collection}: {reason}")]
    Malformed {
        collection: Collection,
        id: String,
        reason: String,
    },

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Collection store contract: create with assigned id, fetch by id,
/// single-field equality query, unfiltered listing, and a
/// compare-and-swap update guarded by the version the caller read.
/// Listing order is insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Record, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Record>, StoreError>;

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Record>, StoreError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Record>, StoreError>;

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        expected_version: u64,
        patch: Map<String, Value>,
    ) -> Result<Record, StoreError>;
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Decode a record into a typed model. The model's `id` and `version`
/// fields are filled from the envelope.
pub fn decode<T: DeserializeOwned>(
    collection: Collection,
    record: &Record,
) -> Result<T, StoreError> {
    let mut fields = record.fields.clone();
    fields.insert("id".into(), json!(record.id));
    fields.insert("version".into(), json!(record.version));

    serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Malformed {
        collection,
        id: record.id.clone(),
        reason: e.to_string(),
    })
}

/// Encode a typed model into document fields, stripping the envelope
/// keys so the store stays the sole owner of id and version.
pub fn encode<T: Serialize>(value: &T) -> Map<String, Value> {
    let mut fields = match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    fields.remove("id");
    fields.remove("version");
    fields
}
