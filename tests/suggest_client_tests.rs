//! Suggestion client against a local fixture server.

use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use bettersearch::Config;
use bettersearch::clients::{SuggestionClient, SuggestionSource};
use bettersearch::constants::http::FIREFOX_ANDROID_USER_AGENT;
use bettersearch::domain::EngineId;
use bettersearch::models::SearchEngine;
use bettersearch::state::build_shared_http_client;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

type Params = Query<HashMap<String, String>>;

async fn opensearch(Query(params): Params) -> String {
    let q = params.get("q").cloned().unwrap_or_default();
    json!([q, [format!("{q} lang"), format!("{q} book"), 7], [], []]).to_string()
}

async fn top_level(Query(params): Params) -> String {
    let q = params.get("query").cloned().unwrap_or_default();
    json!([format!("{q} one"), format!("{q} two")]).to_string()
}

async fn names(Query(params): Params) -> String {
    let q = params.get("query").cloned().unwrap_or_default();
    json!({ "names": [q, format!("{q}_gamedev")] }).to_string()
}

async fn echo_agent(headers: HeaderMap) -> String {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    json!(["q", [agent]]).to_string()
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn malformed() -> &'static str {
    "<html>not json</html>"
}

async fn wrong_shape() -> &'static str {
    r#"{"suggestions": []}"#
}

async fn spawn_fixture() -> String {
    let app = Router::new()
        .route("/opensearch", get(opensearch))
        .route("/toplevel", get(top_level))
        .route("/names", get(names))
        .route("/agent", get(echo_agent))
        .route("/unavailable", get(unavailable))
        .route("/malformed", get(malformed))
        .route("/shape", get(wrong_shape));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn engine(index: usize, suggestion_url: String) -> SearchEngine {
    SearchEngine {
        id: EngineId::from_index(index),
        name: format!("fixture {index}"),
        suggestion_url,
        search_url: "https://example.com/?q=".to_string(),
    }
}

fn client() -> SuggestionClient {
    SuggestionClient::with_timeout(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn opensearch_engines_read_second_element() {
    let base = spawn_fixture().await;
    let ddg = engine(0, format!("{base}/opensearch?q="));

    let suggestions = client().fetch_suggestions("rust", &ddg).await;
    assert_eq!(suggestions, ["rust lang", "rust book"]);
}

#[tokio::test]
async fn query_is_percent_encoded() {
    let base = spawn_fixture().await;
    let ddg = engine(0, format!("{base}/opensearch?q="));

    let suggestions = client().fetch_suggestions("a&b c", &ddg).await;
    assert_eq!(suggestions, ["a&b c lang", "a&b c book"]);
}

#[tokio::test]
async fn swisscows_reads_top_level_array() {
    let base = spawn_fixture().await;
    let swisscows = engine(5, format!("{base}/toplevel?query="));

    let suggestions = client().fetch_suggestions("rust", &swisscows).await;
    assert_eq!(suggestions, ["rust one", "rust two"]);
}

#[tokio::test]
async fn reddit_reads_names_object() {
    let base = spawn_fixture().await;
    let reddit = engine(10, format!("{base}/names?query="));

    let suggestions = client().fetch_suggestions("rust", &reddit).await;
    assert_eq!(suggestions, ["rust", "rust_gamedev"]);
}

#[tokio::test]
async fn startpage_gets_browser_user_agent() {
    let base = spawn_fixture().await;
    let startpage = engine(4, format!("{base}/agent?q="));
    let other = engine(1, format!("{base}/agent?q="));

    let suggestions = client().fetch_suggestions("x", &startpage).await;
    assert_eq!(suggestions, [FIREFOX_ANDROID_USER_AGENT]);

    let suggestions = client().fetch_suggestions("x", &other).await;
    assert_ne!(suggestions, [FIREFOX_ANDROID_USER_AGENT]);
}

#[tokio::test]
async fn startpage_agent_overrides_configured_default() {
    let base = spawn_fixture().await;
    let config = Config::default();
    let shared = SuggestionClient::with_shared_client(build_shared_http_client(&config).unwrap());
    let startpage = engine(4, format!("{base}/agent?q="));
    let other = engine(1, format!("{base}/agent?q="));

    let suggestions = shared.fetch_suggestions("x", &startpage).await;
    assert_eq!(suggestions, [FIREFOX_ANDROID_USER_AGENT]);

    let suggestions = shared.fetch_suggestions("x", &other).await;
    assert_eq!(suggestions, [config.suggestions.user_agent]);
}

#[tokio::test]
async fn rejected_request_yields_no_suggestions() {
    let base = spawn_fixture().await;
    let ddg = engine(0, format!("{base}/unavailable?q="));

    assert!(client().fetch_suggestions("rust", &ddg).await.is_empty());
}

#[tokio::test]
async fn malformed_body_yields_single_error_row() {
    let base = spawn_fixture().await;
    let ddg = engine(0, format!("{base}/malformed?q="));

    let suggestions = client().fetch_suggestions("rust", &ddg).await;
    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0].starts_with("Error: "));
}

#[tokio::test]
async fn unexpected_shape_yields_single_error_row() {
    let base = spawn_fixture().await;
    let ddg = engine(0, format!("{base}/shape?q="));

    let suggestions = client().fetch_suggestions("rust", &ddg).await;
    assert_eq!(suggestions, ["Error: Unexpected suggestion response shape"]);
}

#[tokio::test]
async fn unreachable_host_yields_single_error_row() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let ddg = engine(0, format!("http://{addr}/opensearch?q="));

    let suggestions = client().fetch_suggestions("rust", &ddg).await;
    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0].starts_with("Error: "));
}

#[tokio::test]
async fn blank_query_makes_no_request() {
    let ddg = engine(0, "http://127.0.0.1:9/unused?q=".to_string());
    assert!(client().fetch_suggestions("   ", &ddg).await.is_empty());
}
