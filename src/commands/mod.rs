//! One handler per screen of the reader.
//!
//! Handlers write to any `io::Write` so tests can capture the output.
//! Everything that came from the model or from the user is passed through
//! [`strip_control_chars`] before it reaches the terminal.

mod account;
mod card;
mod insights;
mod library;
mod news;
mod preferences;

use std::borrow::Cow;

use crate::news::Article;
use crate::util::strip_control_chars;

pub use account::{login, logout, whoami};
pub use insights::{dashboard, metrics, nutrition};
pub use library::{comment, react, save, saved, unsave};
pub use news::{article, feed, home, FeedOptions};
pub use preferences::{cache_clear, cache_stats, settings_set, settings_show, SettingsUpdate};

pub(crate) const ARTICLE_NOT_FOUND: &str = "Article not found";

/// Terminal-safe rendering of untrusted text.
pub(crate) fn safe(s: &str) -> Cow<'_, str> {
    strip_control_chars(s)
}

pub(crate) fn find_article<'a>(app: &'a crate::app::App, id: &str) -> anyhow::Result<&'a Article> {
    app.catalog
        .find(id.trim())
        .ok_or_else(|| anyhow::anyhow!(ARTICLE_NOT_FOUND))
}
