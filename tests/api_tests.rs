use std::{sync::Arc, time::Duration};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use curator_api::{
    api::{create_router, AppState},
    db::{MemoryStore, Stores},
    metrics::Metrics,
    models::Article,
    services::summarizer::{Summarizer, SummarizerGateway, SummaryError, SummaryOptions},
};

const CONTENT: &str = "Rust and Docker make a solid combo for shipping small, fast network services.";

struct StaticSummarizer;

#[async_trait::async_trait]
impl Summarizer for StaticSummarizer {
    async fn summarize(&self, _content: &str, _options: &SummaryOptions) -> Result<String, SummaryError> {
        Ok("  A generated summary.  ".to_string())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

struct FailingSummarizer;

#[async_trait::async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _content: &str, _options: &SummaryOptions) -> Result<String, SummaryError> {
        Err(SummaryError::ProviderError("quota exceeded".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn create_test_server_with(gateway: SummarizerGateway) -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let metrics = Metrics::new().unwrap();
    let state = AppState::new(
        Stores::metered(store.clone(), metrics.clone()),
        gateway,
        metrics,
    );
    let server = TestServer::new(create_router(state)).unwrap();
    (server, store)
}

fn create_test_server() -> (TestServer, Arc<MemoryStore>) {
    create_test_server_with(SummarizerGateway::unavailable())
}

fn seeded_article(tags: &[&str], like_count: i64) -> Article {
    let now = Utc::now();
    Article {
        id: Uuid::new_v4(),
        title: "Seeded article".to_string(),
        content: CONTENT.to_string(),
        author: "Ferris".to_string(),
        summary: "Seeded".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        view_count: 0,
        like_count,
        is_ai_generated: false,
        created_at: now,
        updated_at: now,
    }
}

async fn create_article(server: &TestServer, title: &str, tags: Option<Vec<&str>>) -> Value {
    let mut body = json!({
        "title": title,
        "content": CONTENT,
        "author": "Ferris Crab",
    });
    if let Some(tags) = tags {
        body["tags"] = json!(tags);
    }

    let response = server.post("/api/v1/articles").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn create_user(server: &TestServer, username: &str, interests: &[&str]) -> Value {
    let response = server
        .post("/api/v1/users")
        .json(&json!({ "username": username, "interests": interests }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _) = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-me-123"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "trace-me-123");
}

#[tokio::test]
async fn test_create_article_without_provider_uses_extraction() {
    let (server, _) = create_test_server();

    let article = create_article(&server, "Shipping services", None).await;

    assert_eq!(article["summary"], CONTENT);
    assert_eq!(article["isAiGenerated"], false);
    assert_eq!(article["tags"], json!(["rust", "docker"]));
    assert_eq!(article["viewCount"], 0);
}

#[tokio::test]
async fn test_create_article_with_provider_marks_ai_summary() {
    let (server, _) = create_test_server_with(SummarizerGateway::new(
        Arc::new(StaticSummarizer),
        Duration::from_secs(1),
    ));

    let article = create_article(&server, "Shipping services", Some(vec!["ops"])).await;

    assert_eq!(article["summary"], "A generated summary.");
    assert_eq!(article["isAiGenerated"], true);
    assert_eq!(article["tags"], json!(["ops"]));
}

#[tokio::test]
async fn test_create_article_provider_failure_falls_back() {
    let (server, _) = create_test_server_with(SummarizerGateway::new(
        Arc::new(FailingSummarizer),
        Duration::from_secs(1),
    ));

    let article = create_article(&server, "Shipping services", None).await;

    assert_eq!(article["summary"], CONTENT);
    assert_eq!(article["isAiGenerated"], false);
}

#[tokio::test]
async fn test_create_article_validation_error() {
    let (server, _) = create_test_server();

    let response = server
        .post("/api/v1/articles")
        .json(&json!({ "title": "Hi", "content": CONTENT, "author": "Ferris" }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_list_articles_paginates_and_filters() {
    let (server, _) = create_test_server();
    for i in 0..3 {
        create_article(&server, &format!("Rust article {}", i), Some(vec!["rust"])).await;
    }
    create_article(&server, "Python article", Some(vec!["python"])).await;

    let response = server
        .get("/api/v1/articles")
        .add_query_param("limit", 2)
        .add_query_param("tags", "rust,go")
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 3);
    assert_eq!(page["hasNext"], true);
    assert_eq!(page["hasPrevious"], false);

    let response = server
        .get("/api/v1/articles")
        .add_query_param("limit", 0)
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_list_articles_offset_limits() {
    let (server, _) = create_test_server();
    create_article(&server, "Shipping services", None).await;

    let response = server
        .get("/api/v1/articles")
        .add_query_param("offset", i64::MAX)
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["total"], 1);
    assert_eq!(page["hasNext"], false);
    assert_eq!(page["hasPrevious"], true);

    server
        .get("/api/v1/articles")
        .add_query_param("offset", usize::MAX)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_get_article_counts_views() {
    let (server, _) = create_test_server();
    let article = create_article(&server, "Shipping services", None).await;
    let path = format!("/api/v1/articles/{}", article["id"].as_str().unwrap());

    let first: Value = server.get(&path).await.json();
    assert_eq!(first["viewCount"], 0);

    let mut views = 0;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let current: Value = server.get(&path).await.json();
        views = current["viewCount"].as_i64().unwrap();
        if views >= 1 {
            break;
        }
    }
    assert!(views >= 1);

    server
        .get(&format!("/api/v1/articles/{}", Uuid::new_v4()))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_users_duplicate_username_conflicts() {
    let (server, _) = create_test_server();
    let user = create_user(&server, "ferris", &["rust"]).await;

    let response = server
        .post("/api/v1/users")
        .json(&json!({ "username": "ferris" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let fetched: Value = server
        .get(&format!("/api/v1/users/{}", user["id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(fetched["username"], "ferris");
    assert_eq!(fetched["interests"], json!(["rust"]));

    let users: Vec<Value> = server.get("/api/v1/users").await.json();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_interactions_flow() {
    let (server, _) = create_test_server();
    let user = create_user(&server, "reader", &[]).await;
    let article = create_article(&server, "Shipping services", None).await;
    let (user_id, article_id) = (user["id"].clone(), article["id"].clone());

    let response = server
        .post("/api/v1/interactions")
        .json(&json!({ "userId": user_id, "articleId": article_id, "interactionType": "like" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let interaction: Value = response.json();
    assert_eq!(interaction["interactionType"], "like");

    let duplicate = server
        .post("/api/v1/interactions")
        .json(&json!({ "userId": user_id, "articleId": article_id, "interactionType": "like" }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let bad_reference = server
        .post("/api/v1/interactions")
        .json(&json!({ "userId": Uuid::new_v4(), "articleId": article_id, "interactionType": "view" }))
        .await;
    bad_reference.assert_status_bad_request();
    let body: Value = bad_reference.json();
    assert_eq!(body["error"], "Invalid user ID");

    server
        .post("/api/v1/interactions")
        .json(&json!({ "userId": user_id, "articleId": article_id, "interactionType": "share" }))
        .await
        .assert_status(StatusCode::CREATED);

    let user_path = format!("/api/v1/interactions/user/{}", user_id.as_str().unwrap());
    let all: Vec<Value> = server.get(&user_path).await.json();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["interactionType"], "share");

    let likes: Vec<Value> = server
        .get(&user_path)
        .add_query_param("interactionType", "like")
        .await
        .json();
    assert_eq!(likes.len(), 1);

    let by_article: Vec<Value> = server
        .get(&format!(
            "/api/v1/interactions/article/{}",
            article_id.as_str().unwrap()
        ))
        .await
        .json();
    assert_eq!(by_article.len(), 2);

    let reloaded: Value = server
        .get(&format!("/api/v1/users/{}", user_id.as_str().unwrap()))
        .await
        .json();
    assert_eq!(reloaded["interactionCount"], 2);
}

#[tokio::test]
async fn test_recommendations_rank_interest_first() {
    let (server, store) = create_test_server();
    let user = create_user(&server, "u1_reader", &["rust"]).await;
    let a1 = seeded_article(&["rust"], 0);
    let a2 = seeded_article(&[], 10);
    store.insert_article(a1.clone()).await;
    store.insert_article(a2.clone()).await;

    let response = server
        .get(&format!(
            "/api/v1/recommendations/{}",
            user["id"].as_str().unwrap()
        ))
        .add_query_param("limit", 2)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![a1.id.to_string(), a2.id.to_string()]);
    assert_eq!(body["total"], 2);
    assert_eq!(body["strategy"], "hybrid");
    assert_eq!(body["confidence"], 0.85);
}

#[tokio::test]
async fn test_recommendations_exclude_and_unknown_user() {
    let (server, store) = create_test_server();
    let user = create_user(&server, "reader", &[]).await;
    let seen = seeded_article(&[], 100);
    let unseen = seeded_article(&[], 1);
    store.insert_article(seen.clone()).await;
    store.insert_article(unseen.clone()).await;

    server
        .post("/api/v1/interactions")
        .json(&json!({ "userId": user["id"], "articleId": seen.id, "interactionType": "bookmark" }))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = server
        .get(&format!(
            "/api/v1/recommendations/{}",
            user["id"].as_str().unwrap()
        ))
        .await
        .json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["recommendations"][0]["id"], unseen.id.to_string());

    server
        .get(&format!("/api/v1/recommendations/{}", Uuid::new_v4()))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_metrics_endpoint_reports_activity() {
    let (server, _) = create_test_server_with(SummarizerGateway::new(
        Arc::new(FailingSummarizer),
        Duration::from_secs(1),
    ));
    let user = create_user(&server, "reader", &[]).await;
    create_article(&server, "Shipping services", None).await;
    server
        .get(&format!(
            "/api/v1/recommendations/{}",
            user["id"].as_str().unwrap()
        ))
        .await
        .assert_status_ok();
    server
        .get(&format!("/api/v1/users/{}", Uuid::new_v4()))
        .await
        .assert_status_not_found();

    let response = server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.header("content-type").to_str().unwrap().starts_with("text/plain"));
    let body = response.text();
    assert!(body.contains(r#"articles_created_total{with_ai_summary="false"} 1"#));
    assert!(body.contains(r#"ai_summaries_generated_total{provider="failing",success="false"} 1"#));
    assert!(body.contains(r#"recommendations_generated_total{strategy="hybrid"} 1"#));
    assert!(body.contains(
        r#"http_requests_total{method="POST",route="/api/v1/articles",status_code="201"} 1"#
    ));
    assert!(body.contains(
        r#"http_request_errors_total{error_type="Not Found",method="GET",route="/api/v1/users/:id"} 1"#
    ));
    assert!(body.contains(r#"db_query_duration_seconds_count{collection="articles",operation="create"} 1"#));
}
