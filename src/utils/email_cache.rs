use crate::store::{Collection, SharedStore};
use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::time::Duration;

/// true  => email is TAKEN
/// false => email is AVAILABLE (usually we store only taken)
pub static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Mark a single email as taken
pub async fn mark_taken(email: &str) {
    EMAIL_CACHE.insert(email.to_lowercase(), true).await;
}

/// Check if an email is taken
pub async fn is_taken(email: &str) -> bool {
    EMAIL_CACHE.get(&email.to_lowercase()).await.unwrap_or(false)
}

/// Batch mark emails as taken
async fn batch_mark(emails: &[String]) {
    let futures: Vec<_> = emails
        .iter()
        .map(|e| EMAIL_CACHE.insert(e.to_lowercase(), true))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load registered emails into the in-memory cache (batched)
pub async fn warmup_email_cache(store: &SharedStore, batch_size: usize) -> Result<()> {
    let records = store.list(Collection::Users).await?;

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    for record in &records {
        let Some(email) = record.fields.get("email").and_then(Value::as_str) else {
            continue;
        };

        batch.push(email.to_string());
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining emails
    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!("Email cache warmup complete: {} users", total_count);

    Ok(())
}
