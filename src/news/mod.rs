//! The article dataset and everything derived from it without AI help.
//!
//! - [`article`] - `Article`, `Language`, `Category`, `Summary`, `Sentiment`
//! - [`catalog`] - bundled dataset, feed paging, headlines, home listing
//! - [`dashboard`] - per-language statistics and nutrition suggestions
//! - [`reference`] - static normal ranges for common health metrics

mod article;
mod catalog;
mod dashboard;
pub mod reference;

pub use article::{Article, Category, Language, Sentiment, Summary};
pub use catalog::{
    Catalog, CatalogError, FeedPage, FeedQuery, HomeView, PREVIEW_CHARS, TICKER_SEPARATOR,
};
pub use dashboard::{suggest_for_insight, DashboardStats};
