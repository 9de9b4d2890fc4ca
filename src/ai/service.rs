use chrono::NaiveDate;

use super::clean::{clean_output, parse_summary};
use super::client::GeminiClient;
use super::{prompts, AiError};
use crate::config::Config;
use crate::news::{Article, Category, Language, Sentiment, Summary};
use crate::storage::{AiVerbosity, CacheKey, Database};

pub const SUMMARY_FAILED: &str = "Failed to summarize. Retry?";
pub const REWRITE_FAILED: &str = "Failed to rewrite. Retry?";
pub const HEALTH_TIP_FAILED: &str = "Failed to generate health tip. Retry?";
pub const DAILY_CHALLENGE_FALLBACK: &str = "Stay active today!";
pub const NUTRITION_FALLBACK: &str = "Maintain a balanced diet!";

/// Generation tasks with the response cache in front of them.
///
/// Every successful answer is written to the store under its [`CacheKey`]
/// and served from there on later calls. Fallback answers are never
/// cached, so a later call retries the model.
#[derive(Debug, Clone)]
pub struct Assistant {
    client: GeminiClient,
    db: Database,
    model: String,
    nutrition_model: String,
    verbosity: AiVerbosity,
}

impl Assistant {
    pub fn new(client: GeminiClient, db: Database, config: &Config) -> Self {
        Self {
            client,
            db,
            model: config.model.clone(),
            nutrition_model: config.nutrition_model.clone(),
            verbosity: AiVerbosity::default(),
        }
    }

    pub fn with_verbosity(mut self, verbosity: AiVerbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn verbosity(&self) -> AiVerbosity {
        self.verbosity
    }

    /// Cached value for `key`. With `skip_cache` the entry is dropped and
    /// `None` returned. Empty values count as missing.
    async fn lookup(&self, key: &CacheKey, skip_cache: bool) -> Result<Option<String>, AiError> {
        if skip_cache {
            self.db.invalidate(key).await?;
            return Ok(None);
        }
        Ok(self.db.cached(key).await?.filter(|v| !v.is_empty()))
    }

    /// Write-through to the cache. A failed write costs a regeneration
    /// later, never the answer in hand.
    async fn remember(&self, key: &CacheKey, value: &str) {
        if let Err(e) = self.db.store_cached(key, value).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache AI response");
        }
    }

    /// Map a client error to the task's user-facing message. A missing key
    /// is a configuration problem and passes through unchanged.
    fn task_failed(key: &CacheKey, err: AiError, message: &'static str) -> AiError {
        match err {
            AiError::MissingApiKey => AiError::MissingApiKey,
            err => {
                tracing::warn!(key = %key, error = %err, "Generation failed");
                AiError::Generation(message)
            }
        }
    }

    /// TL;DR plus takeaways for a feed card.
    pub async fn summary(
        &self,
        article: &Article,
        language: Language,
        skip_cache: bool,
    ) -> Result<Summary, AiError> {
        let key = CacheKey::Summary(article.id.clone());
        if let Some(raw) = self.lookup(&key, skip_cache).await? {
            match serde_json::from_str::<Summary>(&raw) {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Cached summary is corrupt, regenerating")
                }
            }
        }

        let prompt = prompts::summary(&article.content, language, self.verbosity);
        let raw = self
            .client
            .generate(&self.model, &prompt)
            .await
            .map_err(|e| Self::task_failed(&key, e, SUMMARY_FAILED))?;

        let Some(summary) = parse_summary(&raw) else {
            tracing::warn!(
                key = %key,
                response_len = raw.len(),
                "Model answer is not a summary object"
            );
            return Err(AiError::Generation(SUMMARY_FAILED));
        };

        self.remember(&key, &serde_json::to_string(&summary)?).await;
        Ok(summary)
    }

    /// Friendly retelling of the article.
    pub async fn rewrite(
        &self,
        article: &Article,
        language: Language,
        skip_cache: bool,
    ) -> Result<String, AiError> {
        let key = CacheKey::Rewrite(article.id.clone());
        if let Some(cached) = self.lookup(&key, skip_cache).await? {
            return Ok(cached);
        }

        let prompt = prompts::rewrite(&article.content, language, self.verbosity);
        self.generate_text(&key, &self.model, &prompt, REWRITE_FAILED)
            .await
    }

    pub async fn health_tip(&self, article: &Article, language: Language) -> Result<String, AiError> {
        let key = CacheKey::HealthTip(article.id.clone());
        if let Some(cached) = self.lookup(&key, false).await? {
            return Ok(cached);
        }

        let prompt = prompts::health_tip(&article.content, language);
        self.generate_text(&key, &self.model, &prompt, HEALTH_TIP_FAILED)
            .await
    }

    async fn generate_text(
        &self,
        key: &CacheKey,
        model: &str,
        prompt: &str,
        message: &'static str,
    ) -> Result<String, AiError> {
        let raw = self
            .client
            .generate(model, prompt)
            .await
            .map_err(|e| Self::task_failed(key, e, message))?;

        let text = clean_output(&raw);
        if text.is_empty() {
            tracing::warn!(key = %key, "Model answer was empty after cleaning");
            return Err(AiError::Generation(message));
        }

        self.remember(key, &text).await;
        Ok(text)
    }

    /// Sentiment label. Never fails on the model's account: errors and
    /// unrecognised answers become neutral, and errors are not cached.
    pub async fn sentiment(&self, article: &Article, language: Language) -> Result<Sentiment, AiError> {
        let key = CacheKey::Sentiment(article.id.clone());
        if let Some(cached) = self.lookup(&key, false).await? {
            return Ok(Sentiment::from_model_output(&cached));
        }

        let prompt = prompts::sentiment(&article.content, language);
        match self.client.generate(&self.model, &prompt).await {
            Ok(raw) => {
                let sentiment = Sentiment::from_model_output(&raw);
                self.remember(&key, sentiment.as_str()).await;
                Ok(sentiment)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Sentiment analysis failed, using neutral");
                Ok(Sentiment::Neutral)
            }
        }
    }

    /// One challenge per date and language.
    pub async fn daily_challenge(
        &self,
        categories: &[Category],
        language: Language,
        date: NaiveDate,
    ) -> Result<String, AiError> {
        let key = CacheKey::DailyChallenge { date, language };
        if let Some(cached) = self.lookup(&key, false).await? {
            return Ok(cached);
        }

        let prompt = prompts::daily_challenge(categories, language);
        Ok(self
            .generate_or_fallback(&key, &self.model, &prompt, DAILY_CHALLENGE_FALLBACK)
            .await)
    }

    /// Tip for a free-text food log, cached per log and date.
    ///
    /// # Errors
    ///
    /// `AiError::EmptyInput` if the log is blank.
    pub async fn nutritional_tip(
        &self,
        food_log: &str,
        language: Language,
        date: NaiveDate,
    ) -> Result<String, AiError> {
        let food_log = food_log.trim();
        if food_log.is_empty() {
            return Err(AiError::EmptyInput);
        }

        let key = CacheKey::nutritional_tip(food_log, date);
        if let Some(cached) = self.lookup(&key, false).await? {
            return Ok(cached);
        }

        let prompt = prompts::nutritional_tip(food_log, language);
        Ok(self
            .generate_or_fallback(&key, &self.nutrition_model, &prompt, NUTRITION_FALLBACK)
            .await)
    }

    async fn generate_or_fallback(
        &self,
        key: &CacheKey,
        model: &str,
        prompt: &str,
        fallback: &str,
    ) -> String {
        let result = self.client.generate(model, prompt).await.map(|raw| clean_output(&raw));
        match result {
            Ok(text) if !text.is_empty() => {
                self.remember(key, &text).await;
                text
            }
            Ok(_) => {
                tracing::warn!(key = %key, "Model answer was empty after cleaning, using fallback");
                fallback.to_string()
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Generation failed, using fallback");
                fallback.to_string()
            }
        }
    }
}
