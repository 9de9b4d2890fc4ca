use anyhow::Result;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::io::Write;

use super::card::{write_header, Card};
use super::{find_article, safe};
use crate::app::App;
use crate::news::{Category, FeedQuery, PREVIEW_CHARS};
use crate::util::preview;

#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    pub category: Option<Category>,
    /// 1-based page number.
    pub page: usize,
    /// Regenerate summaries instead of reading them from the cache.
    pub refresh: bool,
    pub date: Option<NaiveDate>,
}

pub async fn home(app: &App, out: &mut impl Write, show_all: bool) -> Result<()> {
    let view = app.catalog.home(app.language, show_all);

    if let Some(user) = app.db.current_user().await? {
        writeln!(out, "Hello, {}!", safe(&user))?;
    }
    writeln!(out, "Breaking: {}", safe(&view.ticker))?;
    writeln!(out)?;

    for article in &view.articles {
        writeln!(out, "[{}] {}", article.id, safe(&article.title))?;
        writeln!(out, "    {}", article.date)?;
        writeln!(out, "    {}", safe(&preview(&article.content, PREVIEW_CHARS)))?;
        writeln!(out)?;
    }

    if view.hidden > 0 {
        writeln!(
            out,
            "{} more article(s). Run `healthwire home --all` to see everything.",
            view.hidden
        )?;
    }
    Ok(())
}

/// Headlines, then one card per article of the requested page.
///
/// Summaries and sentiments for the page are generated concurrently
/// (bounded by `max_concurrent_requests`); cards are printed in feed order.
pub async fn feed(app: &App, out: &mut impl Write, options: FeedOptions) -> Result<()> {
    let page_size = app.config.page_size.max(1);
    let page_number = options.page.max(1);
    let mut query = FeedQuery::first_page(app.language, options.category, page_size);
    query.offset = (page_number - 1).saturating_mul(page_size);
    let page = app.catalog.page(&query);

    let date = app.news_date(options.date);
    let headlines = app.catalog.headlines(app.language, options.category, date);
    if headlines.is_empty() {
        writeln!(out, "Headlines ({date}): none")?;
    } else {
        writeln!(out, "Headlines ({date}): {}", safe(&headlines))?;
    }
    writeln!(out)?;

    if page.articles.is_empty() {
        writeln!(out, "No articles.")?;
        return Ok(());
    }

    let concurrency = app.config.max_concurrent_requests.max(1);
    let refresh = options.refresh;
    let cards: Vec<Result<Card<'_>>> = stream::iter(page.articles.iter().copied())
        .map(|article| async move {
            let summary = app
                .assistant
                .summary(article, article.language, refresh)
                .await;
            let sentiment = app.assistant.sentiment(article, article.language).await?;
            Ok::<_, anyhow::Error>(Card {
                article,
                summary: Some(summary),
                sentiment: Some(sentiment),
                reactions: app.db.reactions(&article.id).await?,
                comments: app.db.comments(&article.id).await?,
            })
        })
        .buffered(concurrency)
        .collect()
        .await;

    for card in cards {
        card?.write(out)?;
    }

    let shown = query.offset + page.articles.len();
    writeln!(out, "Showing {shown} of {} article(s).", page.total)?;
    if page.has_more {
        writeln!(
            out,
            "More: healthwire feed --page {}{}",
            page_number + 1,
            options
                .category
                .map(|c| format!(" --category {c}"))
                .unwrap_or_default()
        )?;
    }
    Ok(())
}

/// Full article: original text, friendly rewrite with a health tip, and
/// the sentiment label.
pub async fn article(app: &App, out: &mut impl Write, id: &str, regenerate: bool) -> Result<()> {
    let article = find_article(app, id)?;
    let language = article.language;

    let rewritten = app.assistant.rewrite(article, language, regenerate).await?;
    let tip = app.assistant.health_tip(article, language).await?;
    let sentiment = app.assistant.sentiment(article, language).await?;

    write_header(out, article, Some(sentiment))?;
    writeln!(out)?;
    writeln!(out, "Original:")?;
    writeln!(out, "{}", safe(&article.content))?;
    writeln!(out)?;
    writeln!(out, "In plain words:")?;
    writeln!(out, "{}", safe(&rewritten))?;
    writeln!(out)?;
    writeln!(out, "Health Tip: {}", safe(&tip))?;
    Ok(())
}
