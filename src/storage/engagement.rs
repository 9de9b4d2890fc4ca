use super::schema::Database;
use super::types::{ReactionKind, Reactions, StoreError};

fn comments_key(article_id: &str) -> String {
    format!("comments-{article_id}")
}

fn reactions_key(article_id: &str) -> String {
    format!("reactions-{article_id}")
}

impl Database {
    // ========================================================================
    // Comments
    // ========================================================================

    pub async fn comments(&self, article_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .get_json::<Vec<String>>(&comments_key(article_id))
            .await?
            .unwrap_or_default())
    }

    /// Append a comment and return the updated list.
    ///
    /// # Errors
    ///
    /// `StoreError::EmptyComment` if the text is blank after trimming.
    pub async fn add_comment(
        &self,
        article_id: &str,
        text: &str,
    ) -> Result<Vec<String>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyComment);
        }

        let mut comments = self.comments(article_id).await?;
        comments.push(text.to_string());
        self.set_json(&comments_key(article_id), &comments).await?;
        Ok(comments)
    }

    // ========================================================================
    // Reactions
    // ========================================================================

    pub async fn reactions(&self, article_id: &str) -> Result<Reactions, StoreError> {
        Ok(self
            .get_json::<Reactions>(&reactions_key(article_id))
            .await?
            .unwrap_or_default())
    }

    /// Increment one counter and return the updated counts.
    pub async fn add_reaction(
        &self,
        article_id: &str,
        kind: ReactionKind,
    ) -> Result<Reactions, StoreError> {
        let mut reactions = self.reactions(article_id).await?;
        reactions.bump(kind);
        self.set_json(&reactions_key(article_id), &reactions).await?;
        Ok(reactions)
    }
}
