use std::collections::HashMap;

use super::article::{Article, Category};

/// Number of articles listed under "recent" and under nutrition suggestions.
const SHORTLIST_LEN: usize = 3;

/// Aggregates shown on the dashboard for one language.
#[derive(Debug)]
pub struct DashboardStats<'a> {
    pub total: usize,
    /// Count per category, in `Category::ALL` order.
    pub category_counts: Vec<(Category, usize)>,
    pub saved: usize,
    /// Article with the most reactions, `None` until anything was reacted to.
    pub most_reacted: Option<(&'a Article, u64)>,
    pub recent: Vec<&'a Article>,
}

impl<'a> DashboardStats<'a> {
    /// `reaction_totals` maps article id to its total reaction count; missing
    /// ids count as zero.
    pub fn compute(
        articles: &[&'a Article],
        saved: usize,
        reaction_totals: &HashMap<String, u64>,
    ) -> Self {
        let category_counts = Category::ALL
            .into_iter()
            .map(|c| (c, articles.iter().filter(|a| a.category == c).count()))
            .collect();

        // Later article wins ties
        let mut most_reacted: Option<(&Article, u64)> = None;
        for article in articles {
            let total = reaction_totals.get(&article.id).copied().unwrap_or(0);
            if total > 0 && total >= most_reacted.map_or(0, |(_, best)| best) {
                most_reacted = Some((article, total));
            }
        }

        Self {
            total: articles.len(),
            category_counts,
            saved,
            most_reacted,
            recent: articles.iter().take(SHORTLIST_LEN).copied().collect(),
        }
    }
}

/// Nutrition articles related to what the nutritional insight talks about.
///
/// The first nutrient mentioned (sugar, then protein, then fat) selects a
/// title keyword; without any of them, the first nutrition articles are
/// returned.
pub fn suggest_for_insight<'a>(articles: &[&'a Article], insight: &str) -> Vec<&'a Article> {
    let insight = insight.to_lowercase();
    let keyword = if insight.contains("sugar") {
        Some("diet")
    } else if insight.contains("protein") {
        Some("protein")
    } else if insight.contains("fat") {
        Some("fat")
    } else {
        None
    };

    articles
        .iter()
        .filter(|a| a.category == Category::Nutrition)
        .filter(|a| keyword.map_or(true, |k| a.title.to_lowercase().contains(k)))
        .take(SHORTLIST_LEN)
        .copied()
        .collect()
}
