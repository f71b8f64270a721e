//! Summarization gateway policy and the Gemini backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use common::ScriptedSummarizer;
use mockito::Matcher;
use serde_json::json;
use webwatcher::change_detector::ChangeDetector;
use webwatcher::summarizer::{
    FALLBACK_SUMMARY, GeminiSummarizer, SummarizationGateway, Summarizer, SummaryRequest,
};

fn price_change() -> SummaryRequest {
    let diff = ChangeDetector::default().detect("Price: $10", "Price: $12");
    SummaryRequest::changes(&diff, Some("price"))
}

fn gateway(backend: Arc<ScriptedSummarizer>) -> SummarizationGateway {
    SummarizationGateway::new(backend, Duration::ZERO, Duration::from_secs(5))
}

#[tokio::test]
async fn first_success_is_returned_trimmed() {
    let backend = Arc::new(ScriptedSummarizer::always("  Price rose to $12.\n"));

    let summary = gateway(backend.clone()).summarize(&price_change()).await;

    assert_eq!(summary, "Price rose to $12.");
    assert_eq!(backend.calls(), 1);
    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("- Price: $10\n+ Price: $12"));
    assert!(prompt.contains("price"));
}

#[tokio::test]
async fn one_failure_is_retried() {
    let backend = Arc::new(
        ScriptedSummarizer::always("Price rose.").then(Err(anyhow!("503 from upstream"))),
    );

    let summary = gateway(backend.clone()).summarize(&price_change()).await;

    assert_eq!(summary, "Price rose.");
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn two_failures_yield_fallback_without_third_attempt() {
    let backend = Arc::new(
        ScriptedSummarizer::always("never reached")
            .then(Err(anyhow!("boom")))
            .then(Ok("   ".to_string())),
    );

    let summary = gateway(backend.clone()).summarize(&price_change()).await;

    assert_eq!(summary, FALLBACK_SUMMARY);
    assert_eq!(backend.calls(), 2);
}

struct Hanging;

#[async_trait]
impl Summarizer for Hanging {
    async fn summarize(&self, _prompt: &str) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}

#[tokio::test(start_paused = true)]
async fn hung_backend_times_out_into_fallback() {
    let gateway = SummarizationGateway::new(
        Arc::new(Hanging),
        Duration::from_secs(2),
        Duration::from_secs(60),
    );

    let summary = gateway.summarize(&price_change()).await;

    assert_eq!(summary, FALLBACK_SUMMARY);
}

#[tokio::test]
async fn gemini_posts_prompt_with_key_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{ "parts": [{ "text": "summarize this" }] }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "- Price rose" }, { "text": " to $12" }] }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let backend = GeminiSummarizer::new("test-key", "gemini-1.5-flash", &server.url()).unwrap();
    let summary = backend.summarize("summarize this").await.unwrap();

    assert_eq!(summary, "- Price rose to $12");
    mock.assert_async().await;
}

#[tokio::test]
async fn gemini_error_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", Matcher::Any)
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let backend = GeminiSummarizer::new("k", "gemini-1.5-flash", &server.url()).unwrap();
    let err = backend.summarize("p").await.unwrap_err();

    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn gemini_response_without_text_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let backend = GeminiSummarizer::new("k", "gemini-1.5-flash", &server.url()).unwrap();

    assert!(backend.summarize("p").await.is_err());
}
