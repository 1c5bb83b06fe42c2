use super::{Collection, DocumentStore, Record, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{MySqlPool, Row, mysql::MySqlRow};
use uuid::Uuid;

/// MySQL-backed document store. All collections share one `documents`
/// table; the schemaless payload is stored as JSON text and equality
/// filters run through MySQL's JSON functions. `seq` keeps insertion
/// order for listings.
pub struct MySqlStore {
    pool: MySqlPool,
}

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    id CHAR(36) NOT NULL UNIQUE,
    collection VARCHAR(32) NOT NULL,
    version BIGINT UNSIGNED NOT NULL DEFAULT 1,
    fields LONGTEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    INDEX idx_documents_collection (collection)
)
"#;

impl MySqlStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPool::connect(database_url).await?;

        sqlx::query(CREATE_TABLE_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn row_to_record(collection: Collection, row: &MySqlRow) -> Result<Record, StoreError> {
    let id: String = row.get("id");
    let version: u64 = row.get("version");
    let raw: String = row.get("fields");

    let fields: Map<String, Value> =
        serde_json::from_str(&raw).map_err(|e| StoreError::Malformed {
            collection,
            id: id.clone(),
            reason: e.to_string(),
        })?;

    Ok(Record {
        id,
        version,
        fields,
    })
}

#[async_trait]
impl DocumentStore for MySqlStore {
    async fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let id = Uuid::new_v4().to_string();
        let payload = Value::Object(fields.clone()).to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, version, fields)
            VALUES (?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(collection.to_string())
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        Ok(Record {
            id,
            version: 1,
            fields,
        })
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, version, fields
            FROM documents
            WHERE collection = ? AND id = ?
            "#,
        )
        .bind(collection.to_string())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_record(collection, &r)).transpose()
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, version, fields
            FROM documents
            WHERE collection = ?
              AND JSON_UNQUOTE(JSON_EXTRACT(fields, ?)) = ?
            ORDER BY seq
            "#,
        )
        .bind(collection.to_string())
        .bind(format!("$.{}", field))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| row_to_record(collection, r))
            .collect()
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, version, fields
            FROM documents
            WHERE collection = ?
            ORDER BY seq
            "#,
        )
        .bind(collection.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| row_to_record(collection, r))
            .collect()
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        expected_version: u64,
        patch: Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let patch_json = Value::Object(patch).to_string();

        // version guard makes this a compare-and-swap; the increment
        // guarantees a matched row always counts as affected
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET fields = JSON_MERGE_PATCH(fields, ?), version = version + 1
            WHERE collection = ? AND id = ? AND version = ?
            "#,
        )
        .bind(&patch_json)
        .bind(collection.to_string())
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // distinguish a missing document from a lost race
            return match self.get(collection, id).await? {
                Some(current) => Err(StoreError::Conflict {
                    collection,
                    id: id.to_string(),
                    expected: expected_version,
                    found: current.version,
                }),
                None => Err(StoreError::NotFound {
                    collection,
                    id: id.to_string(),
                }),
            };
        }

        self.get(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }
}
