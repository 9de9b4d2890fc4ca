//! Integration tests for the caching assistant against a mocked Gemini API.
//!
//! Each test starts its own mock server and in-memory store, so the number
//! of requests the server sees tells whether an answer came from the cache.

use chrono::NaiveDate;
use healthwire::ai::{
    AiError, Assistant, GeminiClient, DAILY_CHALLENGE_FALLBACK, NUTRITION_FALLBACK,
    SUMMARY_FAILED,
};
use healthwire::config::Config;
use healthwire::news::{Article, Category, Language, Sentiment};
use healthwire::storage::{AiVerbosity, CacheKey, Database};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    }))
}

fn article(id: &str) -> Article {
    Article {
        id: id.to_string(),
        title: "Ten-Minute Walks After Meals Improve Blood Sugar Control".to_string(),
        content: "Short walks after eating lower glucose spikes.".to_string(),
        category: Category::Fitness,
        language: Language::English,
        date: "2025-09-24".parse().unwrap(),
    }
}

fn date() -> NaiveDate {
    "2025-09-24".parse().unwrap()
}

async fn setup(server: &MockServer) -> (Assistant, Database) {
    let client = GeminiClient::new(
        reqwest::Client::new(),
        &server.uri(),
        Some(SecretString::from("test-key".to_string())),
    )
    .unwrap()
    .with_min_interval(0)
    .with_retry_base_delay(Duration::from_millis(1));
    let db = Database::open(":memory:").await.unwrap();
    let assistant = Assistant::new(client, db.clone(), &Config::default());
    (assistant, db)
}

// ============================================================================
// Summary
// ============================================================================

#[tokio::test]
async fn test_summary_is_generated_once_then_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(reply(
            "```json\n{\"tldr\": \"Walk after meals.\", \"takeaways\": [\"10 minutes\", \"Lower spikes\", \"Easy habit\"]}\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    let first = assistant
        .summary(&article("en-005"), Language::English, false)
        .await
        .unwrap();
    let second = assistant
        .summary(&article("en-005"), Language::English, false)
        .await
        .unwrap();

    assert_eq!(first.tldr, "Walk after meals.");
    assert_eq!(first.takeaways.len(), 3);
    assert_eq!(first, second);

    let stored = db.get("summary-en-005").await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(value["tldr"], "Walk after meals.");
}

#[tokio::test]
async fn test_summary_skip_cache_regenerates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("{\"tldr\": \"Fresh.\", \"takeaways\": []}"))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    db.store_cached(
        &CacheKey::Summary("en-005".into()),
        "{\"tldr\": \"Stale.\", \"takeaways\": []}",
    )
    .await
    .unwrap();

    let cached = assistant
        .summary(&article("en-005"), Language::English, false)
        .await
        .unwrap();
    assert_eq!(cached.tldr, "Stale.");

    let fresh = assistant
        .summary(&article("en-005"), Language::English, true)
        .await
        .unwrap();
    assert_eq!(fresh.tldr, "Fresh.");
}

#[tokio::test]
async fn test_summary_failure_is_reported_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("I'm sorry, I can't summarize that."))
        .expect(2)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    for _ in 0..2 {
        let err = assistant
            .summary(&article("en-005"), Language::English, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Generation(msg) if msg == SUMMARY_FAILED));
    }
    assert!(db.get("summary-en-005").await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_cached_summary_is_regenerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("{\"tldr\": \"Rebuilt.\", \"takeaways\": []}"))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    db.set("summary-en-005", "{not json").await.unwrap();

    let summary = assistant
        .summary(&article("en-005"), Language::English, false)
        .await
        .unwrap();
    assert_eq!(summary.tldr, "Rebuilt.");
}

#[tokio::test]
async fn test_detailed_verbosity_changes_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("4-line summary"))
        .respond_with(reply("{\"tldr\": \"Long.\", \"takeaways\": [\"a\",\"b\",\"c\",\"d\",\"e\"]}"))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, _db) = setup(&server).await;
    let assistant = assistant.with_verbosity(AiVerbosity::Detailed);
    let summary = assistant
        .summary(&article("en-005"), Language::English, false)
        .await
        .unwrap();
    assert_eq!(summary.takeaways.len(), 5);
}

// ============================================================================
// Rewrite, Health Tip, Sentiment
// ============================================================================

#[tokio::test]
async fn test_rewrite_regenerate_replaces_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("A new friendly version. null"))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    db.store_cached(&CacheKey::Rewrite("en-005".into()), "Old version.")
        .await
        .unwrap();

    let text = assistant
        .rewrite(&article("en-005"), Language::English, true)
        .await
        .unwrap();
    assert_eq!(text, "A new friendly version.");
    assert_eq!(
        db.get("rewrite-en-005").await.unwrap().as_deref(),
        Some("A new friendly version.")
    );
}

#[tokio::test]
async fn test_prompt_names_article_language() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("entirely in Hindi"))
        .respond_with(reply("रोज़ टहलें।"))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, _db) = setup(&server).await;
    let tip = assistant
        .health_tip(&article("hi-003"), Language::Hindi)
        .await
        .unwrap();
    assert_eq!(tip, "रोज़ टहलें।");
}

#[tokio::test]
async fn test_sentiment_normalised_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("  Positive\n"))
        .expect(1)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    let sentiment = assistant
        .sentiment(&article("en-005"), Language::English)
        .await
        .unwrap();
    assert_eq!(sentiment, Sentiment::Positive);
    assert_eq!(
        db.get("sentiment-en-005").await.unwrap().as_deref(),
        Some("positive")
    );

    let again = assistant
        .sentiment(&article("en-005"), Language::English)
        .await
        .unwrap();
    assert_eq!(again, Sentiment::Positive);
}

// ============================================================================
// Daily Challenge and Nutrition
// ============================================================================

#[tokio::test]
async fn test_daily_challenge_fallback_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    let challenge = assistant
        .daily_challenge(&Category::ALL, Language::Telugu, date())
        .await
        .unwrap();
    assert_eq!(challenge, DAILY_CHALLENGE_FALLBACK);
    assert!(db
        .get("daily-challenge-2025-09-24-telugu")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_daily_challenge_cached_per_date_and_language() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("disease, nutrition, fitness, accident, general"))
        .respond_with(reply("Take the stairs three times today."))
        .expect(2)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    for _ in 0..2 {
        let challenge = assistant
            .daily_challenge(&Category::ALL, Language::English, date())
            .await
            .unwrap();
        assert_eq!(challenge, "Take the stairs three times today.");
    }
    // A different language is a different entry
    assistant
        .daily_challenge(&Category::ALL, Language::Hindi, date())
        .await
        .unwrap();

    let keys = db.keys_with_prefix("daily-challenge-").await.unwrap();
    assert_eq!(
        keys,
        vec![
            "daily-challenge-2025-09-24-english",
            "daily-challenge-2025-09-24-hindi"
        ]
    );
}

#[tokio::test]
async fn test_nutritional_tip_uses_nutrition_model_and_log_digest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
        .respond_with(reply("Cut back on sugar and add lentils."))
        .expect(2)
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    let tip = assistant
        .nutritional_tip("rice, sweets, tea with sugar", Language::English, date())
        .await
        .unwrap();
    assert_eq!(tip, "Cut back on sugar and add lentils.");

    // Same log (modulo whitespace) hits the cache; a new log does not
    assistant
        .nutritional_tip("  rice, sweets, tea with sugar ", Language::English, date())
        .await
        .unwrap();
    assistant
        .nutritional_tip("eggs and toast", Language::English, date())
        .await
        .unwrap();

    assert_eq!(
        db.keys_with_prefix("nutritional-tip-nutrition-")
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_nutritional_tip_rejects_blank_log() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let (assistant, _db) = setup(&server).await;
    let err = assistant
        .nutritional_tip("   ", Language::English, date())
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::EmptyInput));
}

#[tokio::test]
async fn test_nutritional_tip_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let (assistant, db) = setup(&server).await;
    let tip = assistant
        .nutritional_tip("rice", Language::English, date())
        .await
        .unwrap();
    assert_eq!(tip, NUTRITION_FALLBACK);
    assert_eq!(db.cache_stats().await.unwrap().total_entries, 0);
}
