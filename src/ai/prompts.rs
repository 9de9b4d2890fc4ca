//! Prompt text for each generation task.

use crate::news::{Category, Language};
use crate::storage::AiVerbosity;

pub(crate) fn summary(content: &str, language: Language, verbosity: AiVerbosity) -> String {
    let lang = language.display_name();
    let shape = match verbosity {
        AiVerbosity::Standard => {
            r#"{ "tldr": "2-line summary", "takeaways": ["point1", "point2", "point3"] }"#
        }
        AiVerbosity::Detailed => {
            r#"{ "tldr": "4-line summary", "takeaways": ["point1", "point2", "point3", "point4", "point5"] }"#
        }
    };
    format!(
        "Summarize this health article in {lang}: {content}.\n\
         The summary and takeaways must be entirely in {lang}.\n\
         Output strictly in JSON: {shape}.\n\
         Keep it factual, simple, and health-focused.\n\
         Do not include any markdown, code blocks, or extra text outside the JSON."
    )
}

pub(crate) fn rewrite(content: &str, language: Language, verbosity: AiVerbosity) -> String {
    let lang = language.display_name();
    let depth = match verbosity {
        AiVerbosity::Standard => "Use short sentences, avoid jargon.",
        AiVerbosity::Detailed => {
            "Use short sentences, avoid jargon, and explain why each point matters for everyday health."
        }
    };
    format!(
        "Rewrite this health article in {lang} in a friendly, simple tone, \
         like explaining to a friend: {content}.\n\
         The entire rewritten article must be in {lang} only.\n\
         {depth}\n\
         Do not include any markdown or extra text.\n\
         Provide a full, complete, and accurate random variation each time."
    )
}

pub(crate) fn sentiment(content: &str, language: Language) -> String {
    let lang = language.display_name();
    format!(
        "Analyze the sentiment of this health article in {lang}: {content}.\n\
         Respond with only one word: positive, negative, or neutral."
    )
}

pub(crate) fn health_tip(content: &str, language: Language) -> String {
    let lang = language.display_name();
    format!(
        "Based on this health article in {lang}: {content}.\n\
         Generate a short, relevant health tip entirely in {lang}.\n\
         Keep it to 1-2 sentences. No extra text or markdown."
    )
}

pub(crate) fn daily_challenge(categories: &[Category], language: Language) -> String {
    let lang = language.display_name();
    let categories = categories
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Generate a simple daily health challenge in {lang} based on these categories: {categories}.\n\
         Make it 1-2 sentences, motivational, and actionable. No extra text or markdown."
    )
}

pub(crate) fn nutritional_tip(food_log: &str, language: Language) -> String {
    let lang = language.display_name();
    format!(
        "Analyze this food log in {lang}: {food_log}.\n\
         Identify common nutrients (e.g., sugar, protein, fat) and provide a 1-2 sentence tip \
         to improve health, entirely in {lang}.\n\
         No extra text or markdown."
    )
}
