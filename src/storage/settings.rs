use super::schema::Database;
use super::types::{Settings, StoreError};

const SETTINGS_KEY: &str = "settings";
const USER_KEY: &str = "user";

impl Database {
    // ========================================================================
    // Settings
    // ========================================================================

    /// The saved settings record, or defaults if none was saved.
    pub async fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self
            .get_json::<Settings>(SETTINGS_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Overwrite the whole settings record.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.set_json(SETTINGS_KEY, settings).await?;
        tracing::debug!(?settings, "Settings saved");
        Ok(())
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Mark `username` as logged in.
    ///
    /// There is no credential check; the password only has to be present.
    /// It is never stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, StoreError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(StoreError::MissingCredentials);
        }

        self.set(USER_KEY, username).await?;
        tracing::info!(user = %username, "Logged in");
        Ok(username.to_string())
    }

    pub async fn logout(&self) -> Result<bool, StoreError> {
        self.remove(USER_KEY).await
    }

    pub async fn current_user(&self) -> Result<Option<String>, StoreError> {
        self.get(USER_KEY).await
    }
}
