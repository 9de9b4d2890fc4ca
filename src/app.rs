use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::ai::{Assistant, GeminiClient};
use crate::config::Config;
use crate::news::{Catalog, Language};
use crate::storage::{Database, Settings};

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Create a custom redirect policy with loop detection and limited hops.
///
/// - Limits redirects to 3 hops maximum
/// - Detects redirect loops (same URL appearing twice in chain)
/// - Logs redirect chain for debugging
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        // Outer bound; the Gemini client applies its own per-request timeout
        .timeout(Duration::from_secs(config.request_timeout_secs.max(1) * 2))
        .user_agent(concat!("healthwire/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    Ok(client)
}

// ============================================================================
// Application State
// ============================================================================

/// Everything a command needs: config, store, dataset and assistant.
pub struct App {
    pub config: Config,
    pub db: Database,
    pub catalog: Catalog,
    pub assistant: Assistant,
    pub settings: Settings,
    /// Language of this invocation: the saved setting unless overridden.
    pub language: Language,
}

impl App {
    pub async fn new(config: Config, db: Database) -> Result<Self> {
        let catalog = match &config.articles_path {
            Some(path) => Catalog::from_path(path).with_context(|| {
                format!("Failed to load article dataset '{}'", path.display())
            })?,
            None => Catalog::bundled().context("Bundled article dataset is invalid")?,
        };

        let http = build_http_client(&config)?;
        let client = GeminiClient::from_config(http, &config)?;
        if !client.has_api_key() {
            tracing::info!("No Gemini API key configured; only cached AI responses are available");
        }

        Self::assemble(config, db, catalog, client).await
    }

    /// Build from already-constructed parts.
    pub async fn assemble(
        config: Config,
        db: Database,
        catalog: Catalog,
        client: GeminiClient,
    ) -> Result<Self> {
        let settings = db.settings().await.context("Failed to load settings")?;
        let assistant =
            Assistant::new(client, db.clone(), &config).with_verbosity(settings.ai_verbosity);

        Ok(Self {
            config,
            db,
            catalog,
            assistant,
            language: settings.language,
            settings,
        })
    }

    pub fn with_language(mut self, language: Option<Language>) -> Self {
        if let Some(language) = language {
            self.language = language;
        }
        self
    }

    /// "Today" for headlines: the requested date, else the newest date in
    /// the dataset for the active language, else the local calendar date.
    pub fn news_date(&self, requested: Option<NaiveDate>) -> NaiveDate {
        requested
            .or_else(|| self.catalog.latest_date(self.language))
            .unwrap_or_else(local_today)
    }
}

/// Calendar date used for per-day caches (daily challenge, nutrition tips).
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
