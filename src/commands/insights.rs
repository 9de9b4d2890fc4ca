use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Write;

use super::safe;
use crate::app::{local_today, App};
use crate::news::reference::{DISCLAIMER, REFERENCE_RANGES};
use crate::news::{suggest_for_insight, Category, DashboardStats};
use crate::util::capitalize;

pub async fn dashboard(app: &App, out: &mut impl Write, date: Option<NaiveDate>) -> Result<()> {
    let articles = app.catalog.by_language(app.language);

    let mut reaction_totals = HashMap::with_capacity(articles.len());
    for article in &articles {
        let total = app.db.reactions(&article.id).await?.total();
        if total > 0 {
            reaction_totals.insert(article.id.clone(), total);
        }
    }
    let saved = app.db.saved_count(app.language).await?;
    let stats = DashboardStats::compute(&articles, saved, &reaction_totals);

    writeln!(out, "Health Dashboard ({})", app.language.display_name())?;
    writeln!(out)?;
    writeln!(out, "Quick Stats")?;
    writeln!(out, "  Total Articles: {}", stats.total)?;
    writeln!(out, "  Saved Articles: {}", stats.saved)?;
    match stats.most_reacted {
        Some((article, total)) => writeln!(
            out,
            "  Most Reacted Article: {} ({total} reactions)",
            safe(&article.title)
        )?,
        None => writeln!(out, "  Most Reacted Article: none yet")?,
    }
    writeln!(out)?;

    writeln!(out, "Articles by Category")?;
    for (category, count) in &stats.category_counts {
        writeln!(out, "  {:<10} {count}", capitalize(category.as_str()))?;
    }
    writeln!(out)?;

    writeln!(out, "Recent Articles")?;
    for article in &stats.recent {
        writeln!(out, "  [{}] {}", article.id, safe(&article.title))?;
    }
    writeln!(out)?;

    let challenge = app
        .assistant
        .daily_challenge(&Category::ALL, app.language, date.unwrap_or_else(local_today))
        .await?;
    writeln!(out, "Daily Health Challenge: {}", safe(&challenge))?;
    Ok(())
}

/// Nutritional insight for a food log plus related nutrition articles.
pub async fn nutrition(
    app: &App,
    out: &mut impl Write,
    food_log: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let insight = app
        .assistant
        .nutritional_tip(food_log, app.language, date.unwrap_or_else(local_today))
        .await?;
    writeln!(out, "Nutritional Insight: {}", safe(&insight))?;

    let articles = app.catalog.by_language(app.language);
    let suggestions = suggest_for_insight(&articles, &insight);
    if !suggestions.is_empty() {
        writeln!(out)?;
        writeln!(out, "Suggested reading:")?;
        for article in suggestions {
            writeln!(out, "  [{}] {}", article.id, safe(&article.title))?;
        }
    }
    Ok(())
}

/// Normal ranges for common adult health metrics.
pub fn metrics(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Normal Health Metrics for Adults")?;
    writeln!(out)?;
    for range in REFERENCE_RANGES {
        writeln!(out, "{}: {}", range.metric, range.normal_range)?;
        writeln!(out, "    {}", range.notes)?;
    }
    writeln!(out)?;
    writeln!(out, "*{DISCLAIMER}")?;
    Ok(())
}
