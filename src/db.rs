use crate::store::{SharedStore, mysql::MySqlStore};
use std::sync::Arc;

pub async fn init_store(database_url: &str) -> SharedStore {
    let store = MySqlStore::connect(database_url)
        .await
        .expect("Failed to connect to document store");

    Arc::new(store)
}
