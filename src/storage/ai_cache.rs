use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use sqlx::QueryBuilder;
use std::fmt;

use super::schema::Database;
use super::types::{CacheStats, StoreError};
use crate::news::Language;

/// Key prefixes owned by the AI response cache.
const AI_KEY_PREFIXES: [&str; 6] = [
    "summary-",
    "rewrite-",
    "sentiment-",
    "healthtip-",
    "daily-challenge-",
    "nutritional-tip-",
];

/// Hex characters of the food-log digest kept in the key.
const DIGEST_HEX_LEN: usize = 16;

/// Location of one cached model response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Summary(String),
    Rewrite(String),
    Sentiment(String),
    HealthTip(String),
    DailyChallenge { date: NaiveDate, language: Language },
    NutritionalTip { digest: String, date: NaiveDate },
}

impl CacheKey {
    /// Key for a nutritional tip about `food_log` on `date`.
    ///
    /// Logs that differ only in surrounding whitespace share an entry.
    pub fn nutritional_tip(food_log: &str, date: NaiveDate) -> Self {
        let hash = Sha256::digest(food_log.trim().as_bytes());
        let mut digest = String::with_capacity(DIGEST_HEX_LEN);
        for byte in hash.iter().take(DIGEST_HEX_LEN / 2) {
            digest.push_str(&format!("{byte:02x}"));
        }
        CacheKey::NutritionalTip { digest, date }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Summary(id) => write!(f, "summary-{id}"),
            CacheKey::Rewrite(id) => write!(f, "rewrite-{id}"),
            CacheKey::Sentiment(id) => write!(f, "sentiment-{id}"),
            CacheKey::HealthTip(id) => write!(f, "healthtip-{id}"),
            CacheKey::DailyChallenge { date, language } => {
                write!(f, "daily-challenge-{date}-{}", language.as_str())
            }
            CacheKey::NutritionalTip { digest, date } => {
                write!(f, "nutritional-tip-nutrition-{digest}-{date}")
            }
        }
    }
}

/// `WHERE (key LIKE 'summary-%' OR key LIKE 'rewrite-%' ...)`
fn push_ai_key_filter(builder: &mut QueryBuilder<'_, sqlx::Sqlite>) {
    builder.push(" WHERE (");
    let mut separated = builder.separated(" OR ");
    for prefix in AI_KEY_PREFIXES {
        separated.push("key LIKE ");
        separated.push_bind_unseparated(format!("{prefix}%"));
    }
    separated.push_unseparated(")");
}

impl Database {
    // ========================================================================
    // AI Response Cache
    // ========================================================================

    pub async fn cached(&self, key: &CacheKey) -> Result<Option<String>, StoreError> {
        self.get(&key.to_string()).await
    }

    pub async fn store_cached(&self, key: &CacheKey, value: &str) -> Result<(), StoreError> {
        self.set(&key.to_string(), value).await
    }

    /// Drop one cached response so the next request regenerates it.
    pub async fn invalidate(&self, key: &CacheKey) -> Result<bool, StoreError> {
        self.remove(&key.to_string()).await
    }

    /// Entry count, value bytes and oldest/newest write time of the AI cache.
    ///
    /// User data (saved list, comments, reactions, settings, session) is not
    /// counted.
    pub async fn cache_stats(&self) -> Result<CacheStats, StoreError> {
        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*), SUM(LENGTH(CAST(value AS BLOB))), MIN(updated_at), MAX(updated_at) FROM kv_store",
        );
        push_ai_key_filter(&mut builder);

        let row: (i64, Option<i64>, Option<String>, Option<String>) =
            builder.build_query_as().fetch_one(&self.pool).await?;

        Ok(CacheStats {
            total_entries: row.0,
            total_size_bytes: row.1.unwrap_or(0),
            oldest_entry: row.2,
            newest_entry: row.3,
        })
    }

    /// Delete every cached AI response. Returns the number of entries removed.
    pub async fn purge_ai_cache(&self) -> Result<u64, StoreError> {
        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("DELETE FROM kv_store");
        push_ai_key_filter(&mut builder);

        let result = builder.build().execute(&self.pool).await?;
        tracing::info!(removed = result.rows_affected(), "AI cache purged");
        Ok(result.rows_affected())
    }
}
