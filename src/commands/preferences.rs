use anyhow::Result;
use std::io::Write;

use crate::app::App;
use crate::news::Language;
use crate::storage::{AiVerbosity, RefreshInterval, Settings};

/// Fields to change; `None` keeps the saved value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub language: Option<Language>,
    pub refresh_interval: Option<RefreshInterval>,
    pub notifications: Option<bool>,
    pub ai_verbosity: Option<AiVerbosity>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.language.is_none()
            && self.refresh_interval.is_none()
            && self.notifications.is_none()
            && self.ai_verbosity.is_none()
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(interval) = self.refresh_interval {
            settings.refresh_interval = interval;
        }
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
        if let Some(verbosity) = self.ai_verbosity {
            settings.ai_verbosity = verbosity;
        }
    }
}

fn write_settings(out: &mut impl Write, settings: &Settings) -> Result<()> {
    writeln!(out, "Language:          {}", settings.language.display_name())?;
    writeln!(out, "Refresh interval:  {}", settings.refresh_interval)?;
    writeln!(
        out,
        "Notifications:     {}",
        if settings.notifications { "on" } else { "off" }
    )?;
    writeln!(out, "AI verbosity:      {}", settings.ai_verbosity)?;
    Ok(())
}

pub async fn settings_show(app: &App, out: &mut impl Write) -> Result<()> {
    write_settings(out, &app.db.settings().await?)
}

/// Read the saved record, apply the changes and write the whole record back.
pub async fn settings_set(app: &App, out: &mut impl Write, update: &SettingsUpdate) -> Result<()> {
    let mut settings = app.db.settings().await?;
    if update.is_empty() {
        writeln!(out, "Nothing to change.")?;
        return write_settings(out, &settings);
    }

    update.apply(&mut settings);
    app.db.save_settings(&settings).await?;
    writeln!(out, "Settings saved.")?;
    write_settings(out, &settings)
}

pub async fn cache_stats(app: &App, out: &mut impl Write) -> Result<()> {
    let stats = app.db.cache_stats().await?;
    writeln!(out, "Cached AI responses: {}", stats.total_entries)?;
    writeln!(out, "Total size:          {} bytes", stats.total_size_bytes)?;
    if let (Some(oldest), Some(newest)) = (&stats.oldest_entry, &stats.newest_entry) {
        writeln!(out, "Oldest entry:        {oldest}")?;
        writeln!(out, "Newest entry:        {newest}")?;
    }
    Ok(())
}

pub async fn cache_clear(app: &App, out: &mut impl Write) -> Result<()> {
    let removed = app.db.purge_ai_cache().await?;
    writeln!(out, "Removed {removed} cached AI response(s).")?;
    Ok(())
}
