mod ai_cache;
mod engagement;
mod kv;
mod saved;
mod schema;
mod settings;
mod types;

pub use ai_cache::CacheKey;
pub use schema::Database;
pub use types::{
    AiVerbosity, CacheStats, DatabaseError, ReactionKind, Reactions, RefreshInterval,
    SavedArticle, Settings, StoreError,
};
