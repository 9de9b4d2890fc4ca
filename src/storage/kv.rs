use serde::de::DeserializeOwned;
use serde::Serialize;

use super::schema::Database;
use super::types::StoreError;

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    // ========================================================================
    // Key-Value Operations
    // ========================================================================

    /// Get a value by key, `None` if the key was never written.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Set a value (UPSERT). The previous value, if any, is overwritten.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a key. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All keys starting with `prefix`, ordered by key.
    ///
    /// The prefix is matched literally: `summary-` does not match
    /// `summaryXfoo`, and `_` in a prefix is not a wildcard.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT key FROM kv_store WHERE key LIKE ? ESCAPE '\\' ORDER BY key")
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }

    /// Delete every key. Returns the number of entries removed.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Read and decode a JSON value.
    ///
    /// A value that no longer decodes (hand-edited, older format) is treated
    /// as absent so callers fall back to their defaults.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored value is not valid JSON, ignoring");
                Ok(None)
            }
        }
    }

    /// Encode a value as JSON and store it under `key`.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }
}
