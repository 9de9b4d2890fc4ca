use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::news::{Article, Language, Summary};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while opening the store
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process has locked the database
    #[error("Another instance of healthwire appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map lock-related sqlx errors to `InstanceLocked`
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

/// Errors raised by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to encode stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Comment is empty")]
    EmptyComment,

    #[error("Please enter username and password")]
    MissingCredentials,
}

// ============================================================================
// Reactions
// ============================================================================

/// The three fixed reaction categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Heart,
    Share,
}

impl FromStr for ReactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(ReactionKind::Like),
            "heart" => Ok(ReactionKind::Heart),
            "share" => Ok(ReactionKind::Share),
            other => Err(format!(
                "unknown reaction '{other}' (expected like, heart or share)"
            )),
        }
    }
}

/// Reaction counters for one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reactions {
    pub like: u64,
    pub heart: u64,
    pub share: u64,
}

impl Reactions {
    pub fn total(&self) -> u64 {
        self.like
            .saturating_add(self.heart)
            .saturating_add(self.share)
    }

    /// Share of likes and hearts among all reactions, rounded to a whole
    /// percent. Zero when there are no reactions.
    pub fn positive_percent(&self) -> u64 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let positive = self.like.saturating_add(self.heart) as f64;
        (positive / total as f64 * 100.0).round() as u64
    }

    pub(crate) fn bump(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Share => &mut self.share,
        };
        *counter = counter.saturating_add(1);
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshInterval {
    #[default]
    Daily,
    Weekly,
}

impl FromStr for RefreshInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(RefreshInterval::Daily),
            "weekly" => Ok(RefreshInterval::Weekly),
            other => Err(format!("unknown refresh interval '{other}'")),
        }
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefreshInterval::Daily => "daily",
            RefreshInterval::Weekly => "weekly",
        })
    }
}

/// How much text the assistant is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiVerbosity {
    #[default]
    Standard,
    Detailed,
}

impl FromStr for AiVerbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(AiVerbosity::Standard),
            "detailed" => Ok(AiVerbosity::Detailed),
            other => Err(format!("unknown AI verbosity '{other}'")),
        }
    }
}

impl fmt::Display for AiVerbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AiVerbosity::Standard => "standard",
            AiVerbosity::Detailed => "detailed",
        })
    }
}

/// The user's settings record, written back whole on every save.
///
/// Field names match the stored JSON record
/// (`{"language", "refreshInterval", "notifications", "aiVerbosity"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub language: Language,
    pub refresh_interval: RefreshInterval,
    pub notifications: bool,
    pub ai_verbosity: AiVerbosity,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::English,
            refresh_interval: RefreshInterval::Daily,
            notifications: true,
            ai_verbosity: AiVerbosity::Standard,
        }
    }
}

// ============================================================================
// Saved Articles
// ============================================================================

/// Snapshot of an article at the moment it was saved.
///
/// Not refreshed afterwards; a saved copy may lag behind the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedArticle {
    #[serde(flatten)]
    pub article: Article,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

// ============================================================================
// AI Cache Statistics
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: i64,
    pub total_size_bytes: i64,
    pub oldest_entry: Option<String>,
    pub newest_entry: Option<String>,
}
