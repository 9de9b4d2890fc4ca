use std::io::{self, Write};

use super::safe;
use crate::ai::AiError;
use crate::news::{Article, Sentiment, Summary};
use crate::storage::Reactions;
use crate::util::capitalize;

/// Data shown on one feed card.
pub(crate) struct Card<'a> {
    pub article: &'a Article,
    pub summary: Option<Result<Summary, AiError>>,
    pub sentiment: Option<Sentiment>,
    pub reactions: Reactions,
    pub comments: Vec<String>,
}

pub(crate) fn write_header(
    out: &mut impl Write,
    article: &Article,
    sentiment: Option<Sentiment>,
) -> io::Result<()> {
    match sentiment {
        Some(s) => writeln!(
            out,
            "[{}] {}  ({})",
            article.id,
            safe(&article.title),
            capitalize(s.as_str())
        )?,
        None => writeln!(out, "[{}] {}", article.id, safe(&article.title))?,
    }
    writeln!(
        out,
        "    {} | {}",
        capitalize(article.category.as_str()),
        article.date
    )
}

pub(crate) fn write_summary(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    writeln!(out, "    TL;DR: {}", safe(&summary.tldr))?;
    for takeaway in &summary.takeaways {
        writeln!(out, "      - {}", safe(takeaway))?;
    }
    Ok(())
}

pub(crate) fn write_reactions(out: &mut impl Write, reactions: &Reactions) -> io::Result<()> {
    writeln!(
        out,
        "    Reactions: like {}  heart {}  share {}  ({}% positive)",
        reactions.like,
        reactions.heart,
        reactions.share,
        reactions.positive_percent()
    )
}

pub(crate) fn write_comments(out: &mut impl Write, comments: &[String]) -> io::Result<()> {
    if comments.is_empty() {
        return Ok(());
    }
    writeln!(out, "    Comments ({}):", comments.len())?;
    for comment in comments {
        writeln!(out, "      > {}", safe(comment))?;
    }
    Ok(())
}

impl Card<'_> {
    pub(crate) fn write(&self, out: &mut impl Write) -> io::Result<()> {
        write_header(out, self.article, self.sentiment)?;
        match &self.summary {
            Some(Ok(summary)) => write_summary(out, summary)?,
            Some(Err(e)) => writeln!(out, "    {e}")?,
            None => {}
        }
        write_reactions(out, &self.reactions)?;
        write_comments(out, &self.comments)?;
        writeln!(out)
    }
}
