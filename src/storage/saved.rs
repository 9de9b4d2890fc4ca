use super::schema::Database;
use super::types::{SavedArticle, StoreError};
use crate::news::Language;

const SAVED_KEY: &str = "saved";

impl Database {
    // ========================================================================
    // Saved Articles
    // ========================================================================

    /// Every saved snapshot, in the order they were saved.
    pub async fn saved_articles(&self) -> Result<Vec<SavedArticle>, StoreError> {
        Ok(self
            .get_json::<Vec<SavedArticle>>(SAVED_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Append a snapshot. Returns `false` if an article with the same id is
    /// already saved; the existing snapshot is left untouched.
    pub async fn save_article(&self, snapshot: SavedArticle) -> Result<bool, StoreError> {
        let mut saved = self.saved_articles().await?;
        if saved.iter().any(|s| s.article.id == snapshot.article.id) {
            return Ok(false);
        }

        tracing::debug!(article_id = %snapshot.article.id, "Saving article");
        saved.push(snapshot);
        self.set_json(SAVED_KEY, &saved).await?;
        Ok(true)
    }

    /// Remove a saved article regardless of its language.
    pub async fn remove_saved(&self, article_id: &str) -> Result<bool, StoreError> {
        let mut saved = self.saved_articles().await?;
        let before = saved.len();
        saved.retain(|s| s.article.id != article_id);
        if saved.len() == before {
            return Ok(false);
        }

        self.set_json(SAVED_KEY, &saved).await?;
        Ok(true)
    }

    pub async fn saved_count(&self, language: Language) -> Result<usize, StoreError> {
        Ok(self
            .saved_articles()
            .await?
            .iter()
            .filter(|s| s.article.language == language)
            .count())
    }
}
