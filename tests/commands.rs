//! Integration tests for the command handlers.
//!
//! Each test assembles an `App` over the bundled dataset, an in-memory
//! store and a mocked Gemini API, and captures the handler output.

use healthwire::app::App;
use healthwire::ai::GeminiClient;
use healthwire::commands::{self, FeedOptions, SettingsUpdate};
use healthwire::config::Config;
use healthwire::news::{Catalog, Category, Language};
use healthwire::storage::{AiVerbosity, CacheKey, Database, ReactionKind};
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

async fn mount_defaults(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_string_contains("Summarize this health article"))
        .respond_with(reply(
            "{\"tldr\": \"Short version.\", \"takeaways\": [\"One\", \"Two\", \"Three\"]}",
        ))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Analyze the sentiment"))
        .respond_with(reply("positive"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Rewrite this health article"))
        .respond_with(reply("Here is the friendly version."))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Generate a short, relevant health tip"))
        .respond_with(reply("Drink water."))
        .mount(server)
        .await;
}

async fn test_app(server: &MockServer) -> App {
    let config = Config {
        page_size: 2,
        max_concurrent_requests: 1,
        ..Config::default()
    };
    let client = GeminiClient::new(
        reqwest::Client::new(),
        &server.uri(),
        Some(SecretString::from("test-key".to_string())),
    )
    .unwrap()
    .with_min_interval(0)
    .with_retry_base_delay(Duration::from_millis(1));
    let db = Database::open(":memory:").await.unwrap();
    App::assemble(config, db, Catalog::bundled().unwrap(), client)
        .await
        .unwrap()
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Feed and Article
// ============================================================================

#[tokio::test]
async fn test_feed_page_with_category() {
    let server = MockServer::start().await;
    mount_defaults(&server).await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    let options = FeedOptions {
        category: Some(Category::Nutrition),
        page: 1,
        ..FeedOptions::default()
    };
    commands::feed(&app, &mut out, options).await.unwrap();
    let out = text(out);

    assert!(out.starts_with("Headlines (2025-09-24): Mediterranean Diet"));
    let first = out.find("[en-002]").unwrap();
    let second = out.find("[en-003]").unwrap();
    assert!(first < second);
    assert!(!out.contains("[en-004]"));
    assert!(out.contains("(Positive)"));
    assert!(out.contains("    TL;DR: Short version."));
    assert!(out.contains("Showing 2 of 4 article(s)."));
    assert!(out.contains("More: healthwire feed --page 2 --category nutrition"));

    // Summaries were cached by the feed
    assert!(app
        .db
        .cached(&CacheKey::Summary("en-002".into()))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_feed_last_page_has_no_more_hint() {
    let server = MockServer::start().await;
    mount_defaults(&server).await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    let options = FeedOptions {
        category: Some(Category::Nutrition),
        page: 2,
        ..FeedOptions::default()
    };
    commands::feed(&app, &mut out, options).await.unwrap();
    let out = text(out);

    assert!(out.contains("[en-004]"));
    assert!(out.contains("[en-011]"));
    assert!(out.contains("Showing 4 of 4 article(s)."));
    assert!(!out.contains("More:"));
}

#[tokio::test]
async fn test_feed_shows_failure_message_per_card() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    let options = FeedOptions {
        page: 1,
        ..FeedOptions::default()
    };
    commands::feed(&app, &mut out, options).await.unwrap();
    let out = text(out);

    assert_eq!(out.matches("Failed to summarize. Retry?").count(), 2);
    assert!(out.contains("(Neutral)"));
}

#[tokio::test]
async fn test_article_view() {
    let server = MockServer::start().await;
    mount_defaults(&server).await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    commands::article(&app, &mut out, "en-005", false)
        .await
        .unwrap();
    let out = text(out);

    assert!(out.starts_with("[en-005] "));
    assert!(out.contains("Original:"));
    assert!(out.contains("In plain words:\nHere is the friendly version."));
    assert!(out.contains("Health Tip: Drink water."));
}

#[tokio::test]
async fn test_feed_refresh_regenerates_page_summaries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Summarize this health article"))
        .respond_with(reply("{\"tldr\": \"Again.\", \"takeaways\": []}"))
        .expect(4)
        .mount(&server)
        .await;
    mount_defaults(&server).await;
    let app = test_app(&server).await;

    let options = FeedOptions {
        category: Some(Category::Fitness),
        page: 1,
        ..FeedOptions::default()
    };
    // Two summaries generated, then served from the cache
    for _ in 0..2 {
        let mut out = Vec::new();
        commands::feed(&app, &mut out, options.clone()).await.unwrap();
        assert!(text(out).contains("    TL;DR: Again."));
    }

    let mut out = Vec::new();
    let refresh = FeedOptions {
        refresh: true,
        ..options
    };
    commands::feed(&app, &mut out, refresh).await.unwrap();
    let out = text(out);
    assert!(out.contains("[en-005]"));
    assert!(out.contains("[en-006]"));
}

#[tokio::test]
async fn test_article_regenerate_requests_new_rewrite() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Rewrite this health article"))
        .respond_with(reply("Another friendly version."))
        .expect(2)
        .mount(&server)
        .await;
    mount_defaults(&server).await;
    let app = test_app(&server).await;

    for regenerate in [false, false, true] {
        let mut out = Vec::new();
        commands::article(&app, &mut out, "en-005", regenerate)
            .await
            .unwrap();
        assert!(text(out).contains("In plain words:\nAnother friendly version."));
    }
}

#[tokio::test]
async fn test_unknown_article() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    let err = commands::article(&app, &mut out, "en-999", false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Article not found");

    let err = commands::save(&app, &mut out, "en-999").await.unwrap_err();
    assert_eq!(err.to_string(), "Article not found");
}

// ============================================================================
// Home
// ============================================================================

#[tokio::test]
async fn test_home_holds_back_two_articles() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;
    app.db.login("asha", "pw").await.unwrap();

    let mut out = Vec::new();
    commands::home(&app, &mut out, false).await.unwrap();
    let out = text(out);

    assert!(out.starts_with("Hello, asha!\nBreaking: "));
    assert!(out.contains("[en-010]"));
    assert!(!out.contains("[en-011]"));
    assert!(out.contains("2 more article(s)."));

    let mut out = Vec::new();
    commands::home(&app, &mut out, true).await.unwrap();
    assert!(text(out).contains("[en-012]"));
}

#[tokio::test]
async fn test_home_ticker_lists_every_shown_title() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;

    let english = app.catalog.by_language(Language::English);
    let titles: Vec<&str> = english
        .iter()
        .take(10)
        .map(|a| a.title.as_str())
        .collect();
    let expected = format!("Breaking: {}", titles.join(" ... "));

    let mut out = Vec::new();
    commands::home(&app, &mut out, false).await.unwrap();
    let out = text(out);
    let ticker = out.lines().next().unwrap();
    assert_eq!(ticker, expected);
    assert!(ticker.ends_with(titles[9]));
}

// ============================================================================
// Library
// ============================================================================

#[tokio::test]
async fn test_save_snapshots_cached_summary() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;
    app.db
        .store_cached(
            &CacheKey::Summary("en-001".into()),
            "{\"tldr\": \"Get tested.\", \"takeaways\": [\"Every three years\"]}",
        )
        .await
        .unwrap();

    let mut out = Vec::new();
    commands::save(&app, &mut out, "en-001").await.unwrap();
    commands::save(&app, &mut out, "en-001").await.unwrap();
    commands::react(&app, &mut out, "en-001", ReactionKind::Like)
        .await
        .unwrap();
    commands::comment(&app, &mut out, "en-001", "Booked my test")
        .await
        .unwrap();
    let out = text(out);
    assert!(out.contains("Saved: New Guidelines"));
    assert!(out.contains("Already saved: New Guidelines"));

    let mut listing = Vec::new();
    commands::saved(&app, &mut listing).await.unwrap();
    let listing = text(listing);
    assert!(listing.starts_with("Saved Articles (1)"));
    assert!(listing.contains("    TL;DR: Get tested."));
    assert!(listing.contains("Reactions: like 1  heart 0  share 0  (100% positive)"));
    assert!(listing.contains("      > Booked my test"));
}

#[tokio::test]
async fn test_saved_list_follows_language() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    commands::save(&app, &mut out, "hi-001").await.unwrap();

    let mut listing = Vec::new();
    commands::saved(&app, &mut listing).await.unwrap();
    assert_eq!(text(listing), "No saved articles yet.\n");

    let app = app.with_language(Some(Language::Hindi));
    let mut listing = Vec::new();
    commands::saved(&app, &mut listing).await.unwrap();
    assert!(text(listing).contains("[hi-001]"));
}

// ============================================================================
// Settings and Cache
// ============================================================================

#[tokio::test]
async fn test_settings_set_persists() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    commands::settings_set(&app, &mut out, &SettingsUpdate::default())
        .await
        .unwrap();
    assert!(text(out).starts_with("Nothing to change."));

    let update = SettingsUpdate {
        language: Some(Language::Telugu),
        ai_verbosity: Some(AiVerbosity::Detailed),
        ..SettingsUpdate::default()
    };
    let mut out = Vec::new();
    commands::settings_set(&app, &mut out, &update).await.unwrap();
    let out = text(out);
    assert!(out.starts_with("Settings saved."));
    assert!(out.contains("Language:          Telugu"));
    assert!(out.contains("AI verbosity:      detailed"));

    let settings = app.db.settings().await.unwrap();
    assert_eq!(settings.language, Language::Telugu);
    assert!(settings.notifications);
}

#[tokio::test]
async fn test_cache_clear_reports_count() {
    let server = MockServer::start().await;
    let app = test_app(&server).await;
    app.db
        .store_cached(&CacheKey::Sentiment("en-001".into()), "positive")
        .await
        .unwrap();
    app.db.add_comment("en-001", "Kept").await.unwrap();

    let mut out = Vec::new();
    commands::cache_stats(&app, &mut out).await.unwrap();
    commands::cache_clear(&app, &mut out).await.unwrap();
    let out = text(out);
    assert!(out.contains("Cached AI responses: 1"));
    assert!(out.contains("Removed 1 cached AI response(s)."));
    assert_eq!(app.db.comments("en-001").await.unwrap(), vec!["Kept"]);
}

// ============================================================================
// Dashboard and Nutrition
// ============================================================================

#[tokio::test]
async fn test_nutrition_prints_insight_and_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Analyze this food log"))
        .respond_with(reply("Add more protein with eggs and lentils."))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    commands::nutrition(
        &app,
        &mut out,
        "white rice and tea",
        Some("2025-09-24".parse().unwrap()),
    )
    .await
    .unwrap();
    let out = text(out);

    assert!(out.starts_with("Nutritional Insight: Add more protein with eggs and lentils."));
    assert!(out.contains("Suggested reading:\n  [en-003] How Much Protein Do Older Adults Really Need?"));
    assert!(!out.contains("[en-002]"));
    assert!(!out.contains("[en-004]"));
}

#[tokio::test]
async fn test_nutrition_fallback_suggests_nutrition_articles() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    let app = test_app(&server).await;

    let mut out = Vec::new();
    commands::nutrition(&app, &mut out, "rice", Some("2025-09-24".parse().unwrap()))
        .await
        .unwrap();
    let out = text(out);

    assert!(out.starts_with("Nutritional Insight: Maintain a balanced diet!"));
    assert!(out.contains("[en-002]"));
    assert!(out.contains("[en-003]"));
    assert!(out.contains("[en-004]"));
    assert!(!out.contains("[en-011]"));
}

#[tokio::test]
async fn test_dashboard_stats_and_challenge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("daily health challenge"))
        .respond_with(reply("Walk 5,000 steps today."))
        .mount(&server)
        .await;
    let app = test_app(&server).await;
    app.db
        .add_reaction("en-007", ReactionKind::Share)
        .await
        .unwrap();

    let mut out = Vec::new();
    commands::dashboard(&app, &mut out, Some("2025-09-24".parse().unwrap()))
        .await
        .unwrap();
    let out = text(out);

    assert!(out.contains("Total Articles: 12"));
    assert!(out.contains("Saved Articles: 0"));
    assert!(out.contains("(1 reactions)"));
    assert!(out.contains("Nutrition  4"));
    assert!(out.contains("Daily Health Challenge: Walk 5,000 steps today."));
}
