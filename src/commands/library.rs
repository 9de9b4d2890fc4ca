use anyhow::Result;
use std::io::Write;

use super::card::{write_comments, write_header, write_reactions, write_summary};
use super::{find_article, safe};
use crate::app::App;
use crate::news::Summary;
use crate::storage::{CacheKey, ReactionKind, SavedArticle};

/// Save a snapshot of the article, including its summary if one was
/// already generated. Never calls the model.
pub async fn save(app: &App, out: &mut impl Write, id: &str) -> Result<()> {
    let article = find_article(app, id)?;

    let summary = app
        .db
        .cached(&CacheKey::Summary(article.id.clone()))
        .await?
        .and_then(|raw| serde_json::from_str::<Summary>(&raw).ok());

    let snapshot = SavedArticle {
        article: article.clone(),
        summary,
    };
    if app.db.save_article(snapshot).await? {
        writeln!(out, "Saved: {}", safe(&article.title))?;
    } else {
        writeln!(out, "Already saved: {}", safe(&article.title))?;
    }
    Ok(())
}

pub async fn unsave(app: &App, out: &mut impl Write, id: &str) -> Result<()> {
    if app.db.remove_saved(id.trim()).await? {
        writeln!(out, "Removed {} from saved articles.", safe(id.trim()))?;
    } else {
        writeln!(out, "{} is not saved.", safe(id.trim()))?;
    }
    Ok(())
}

/// Saved snapshots in the active language.
pub async fn saved(app: &App, out: &mut impl Write) -> Result<()> {
    let saved: Vec<SavedArticle> = app
        .db
        .saved_articles()
        .await?
        .into_iter()
        .filter(|s| s.article.language == app.language)
        .collect();

    if saved.is_empty() {
        writeln!(out, "No saved articles yet.")?;
        return Ok(());
    }

    writeln!(out, "Saved Articles ({})", saved.len())?;
    writeln!(out)?;
    for snapshot in &saved {
        write_header(out, &snapshot.article, None)?;
        if let Some(summary) = &snapshot.summary {
            write_summary(out, summary)?;
        }
        write_reactions(out, &app.db.reactions(&snapshot.article.id).await?)?;
        write_comments(out, &app.db.comments(&snapshot.article.id).await?)?;
        writeln!(out)?;
    }
    Ok(())
}

pub async fn comment(app: &App, out: &mut impl Write, id: &str, text: &str) -> Result<()> {
    let article = find_article(app, id)?;
    let comments = app.db.add_comment(&article.id, text).await?;
    write_comments(out, &comments)?;
    Ok(())
}

pub async fn react(app: &App, out: &mut impl Write, id: &str, kind: ReactionKind) -> Result<()> {
    let article = find_article(app, id)?;
    let reactions = app.db.add_reaction(&article.id, kind).await?;
    write_reactions(out, &reactions)?;
    Ok(())
}
