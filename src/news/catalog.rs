use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use super::article::{Article, Category, Language};

/// Dataset compiled into the binary.
const BUNDLED_ARTICLES: &str = include_str!("../../data/articles.json");

/// Maximum size of an alternate dataset file (1 MB).
const MAX_DATASET_SIZE: u64 = 1_048_576;

/// Number of characters kept for home-page previews.
pub const PREVIEW_CHARS: usize = 100;

/// Separator between titles in the breaking-news ticker.
pub const TICKER_SEPARATOR: &str = " ... ";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read article dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid article dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Article dataset too large ({0} bytes)")]
    TooLarge(u64),

    #[error("Duplicate article id '{0}' in dataset")]
    DuplicateId(String),
}

/// Selection of one feed page.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub language: Language,
    /// `None` means every category.
    pub category: Option<Category>,
    pub offset: usize,
    pub page_size: usize,
}

impl FeedQuery {
    pub fn first_page(language: Language, category: Option<Category>, page_size: usize) -> Self {
        Self {
            language,
            category,
            offset: 0,
            page_size,
        }
    }
}

/// One page of the filtered feed.
#[derive(Debug)]
pub struct FeedPage<'a> {
    pub articles: Vec<&'a Article>,
    /// Number of articles matching the filter across all pages.
    pub total: usize,
    pub has_more: bool,
}

/// Home listing: everything but the last two articles until expanded.
#[derive(Debug)]
pub struct HomeView<'a> {
    pub ticker: String,
    pub articles: Vec<&'a Article>,
    /// Articles held back until the listing is expanded.
    pub hidden: usize,
}

/// The static, read-only article dataset.
#[derive(Debug, Clone)]
pub struct Catalog {
    articles: Vec<Article>,
}

impl Catalog {
    /// Parse the dataset bundled with the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_ARTICLES)
    }

    /// Load an alternate dataset from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_DATASET_SIZE {
            return Err(CatalogError::TooLarge(size));
        }
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            articles = catalog.articles.len(),
            "Loaded article dataset"
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let articles: Vec<Article> = serde_json::from_str(json)?;
        Self::from_articles(articles)
    }

    pub fn from_articles(articles: Vec<Article>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(articles.len());
        for article in &articles {
            if !seen.insert(article.id.as_str()) {
                return Err(CatalogError::DuplicateId(article.id.clone()));
            }
        }
        Ok(Self { articles })
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Articles in `language`, in dataset order.
    pub fn by_language(&self, language: Language) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.language == language)
            .collect()
    }

    /// Newest publication date among the language's articles.
    pub fn latest_date(&self, language: Language) -> Option<NaiveDate> {
        self.articles
            .iter()
            .filter(|a| a.language == language)
            .map(|a| a.date)
            .max()
    }

    pub fn page(&self, query: &FeedQuery) -> FeedPage<'_> {
        let filtered: Vec<&Article> = self
            .articles
            .iter()
            .filter(|a| a.language == query.language)
            .filter(|a| query.category.map_or(true, |c| a.category == c))
            .collect();

        let total = filtered.len();
        let articles = filtered
            .into_iter()
            .skip(query.offset)
            .take(query.page_size)
            .collect();

        FeedPage {
            articles,
            total,
            has_more: total > query.offset.saturating_add(query.page_size),
        }
    }

    /// Titles published on `date`, joined for the scrolling ticker.
    pub fn headlines(
        &self,
        language: Language,
        category: Option<Category>,
        date: NaiveDate,
    ) -> String {
        self.articles
            .iter()
            .filter(|a| a.language == language && a.date == date)
            .filter(|a| category.map_or(true, |c| a.category == c))
            .map(|a| a.title.as_str())
            .collect::<Vec<_>>()
            .join(TICKER_SEPARATOR)
    }

    pub fn home(&self, language: Language, show_all: bool) -> HomeView<'_> {
        let articles = self.by_language(language);
        let shown = if show_all || articles.len() <= 2 {
            articles.len()
        } else {
            articles.len() - 2
        };

        let ticker = articles[..shown]
            .iter()
            .map(|a| a.title.as_str())
            .collect::<Vec<_>>()
            .join(TICKER_SEPARATOR);

        let hidden = articles.len() - shown;
        let mut articles = articles;
        articles.truncate(shown);

        HomeView {
            ticker,
            articles,
            hidden,
        }
    }
}
