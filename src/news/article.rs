use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the dataset is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Telugu];

    /// Storage and CLI identifier (`english`, `hindi`, `telugu`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Telugu => "telugu",
        }
    }

    /// Name embedded in prompts so the model answers in this language.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" => Ok(Language::Hindi),
            "telugu" | "te" => Ok(Language::Telugu),
            other => Err(format!(
                "unknown language '{other}' (expected english, hindi or telugu)"
            )),
        }
    }
}

/// Topic an article is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Disease,
    Nutrition,
    Fitness,
    Accident,
    General,
}

impl Category {
    /// Dashboard order.
    pub const ALL: [Category; 5] = [
        Category::Disease,
        Category::Nutrition,
        Category::Fitness,
        Category::Accident,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Disease => "disease",
            Category::Nutrition => "nutrition",
            Category::Fitness => "fitness",
            Category::Accident => "accident",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// A pre-seeded health-news item. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub language: Language,
    /// Publication date, `YYYY-MM-DD`.
    pub date: chrono::NaiveDate,
}

/// AI-generated digest shown on feed cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub tldr: String,
    #[serde(default)]
    pub takeaways: Vec<String>,
}

/// Sentiment label attached to an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Lenient parse of a model answer: anything unrecognised is neutral.
    pub fn from_model_output(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
