use movie_explorer::api::{ApiClient, MovieApi};
use movie_explorer::config::Config;
use movie_explorer::error::ApiError;
use movie_explorer::models::{MediaKind, SearchResult};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn config_for(server: &MockServer) -> Config {
    Config {
        tmdb_api_key: Some(API_KEY.to_string()),
        tmdb_base: server.uri(),
        llm_endpoint: Some(format!("{}/insight", server.uri())),
        ..Config::default()
    }
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&config_for(server)).expect("client builds")
}

async fn forbid_requests(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_normalizes_and_filters_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "Inception"))
        .and(query_param("include_adult", "false"))
        .and(query_param("language", "en-US"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                {
                    "id": 27205,
                    "media_type": "movie",
                    "title": "Inception",
                    "vote_average": 8.8,
                    "release_date": "2010-07-16",
                    "original_language": "en"
                },
                { "id": 525, "media_type": "person", "name": "Christopher Nolan" },
                {
                    "id": 1416,
                    "media_type": "tv",
                    "name": "Inception: The Cobol Job",
                    "first_air_date": "2010-12-07"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client_for(&server)
        .search("Inception", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0],
        SearchResult {
            id: 27205,
            media_type: MediaKind::Movie,
            title: "Inception".to_string(),
            name: None,
            poster_path: None,
            backdrop_path: None,
            overview: None,
            release_date: Some("2010-07-16".to_string()),
            vote_average: Some(8.8),
            original_language: Some("en".to_string()),
        }
    );
    assert_eq!(results[1].media_type, MediaKind::Tv);
    assert_eq!(results[1].title, "Inception: The Cobol Job");
    assert_eq!(results[1].release_date.as_deref(), Some("2010-12-07"));
    assert_eq!(results[1].vote_average, None);
}

#[tokio::test]
async fn missing_key_fails_without_network_calls() {
    let server = MockServer::start().await;
    forbid_requests(&server).await;
    let config = Config {
        tmdb_api_key: None,
        ..config_for(&server)
    };
    let client = ApiClient::new(&config).unwrap();
    let cancel = CancellationToken::new();

    assert!(matches!(
        client.search("Dune", &cancel).await,
        Err(ApiError::Config(_))
    ));
    assert!(matches!(
        client.details(MediaKind::Movie, 438631, &cancel).await,
        Err(ApiError::Config(_))
    ));
    assert!(matches!(
        client.watch_providers(MediaKind::Tv, 1399, &cancel).await,
        Err(ApiError::Config(_))
    ));
}

#[tokio::test]
async fn error_status_keeps_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/1"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"status_code":7,"status_message":"Invalid API key"}"#),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .details(MediaKind::Movie, 1, &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        ApiError::Request { status, body, path } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
            assert!(path.starts_with("/movie/1"));
            assert!(!path.contains(API_KEY));
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search("Heat", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn details_payload_is_returned_unmodified() {
    let server = MockServer::start().await;
    let payload = json!({
        "id": 1399,
        "name": "Game of Thrones",
        "first_air_date": "2011-04-17",
        "vote_average": 8.4,
        "number_of_seasons": 8,
        "images": { "backdrops": [], "posters": [] },
        "credits": { "cast": [{ "name": "Emilia Clarke", "character": "Daenerys", "order": 0 }], "crew": [] },
        "videos": { "results": [{ "site": "YouTube", "type": "Trailer", "key": "abc", "name": "Trailer" }] }
    });
    Mock::given(method("GET"))
        .and(path("/tv/1399"))
        .and(query_param("append_to_response", "images,credits,videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let details = client_for(&server)
        .details(MediaKind::Tv, 1399, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(details.display_title(), "Game of Thrones");
    assert_eq!(details.year(), "2011");
    assert_eq!(serde_json::to_value(&details).unwrap(), payload);
}

#[tokio::test]
async fn watch_providers_are_returned_for_every_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/watch/providers"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 27205,
            "results": {
                "US": { "link": "https://www.themoviedb.org/movie/27205/watch", "flatrate": [
                    { "provider_id": 8, "provider_name": "Netflix", "logo_path": "/n.jpg", "display_priority": 0 }
                ]},
                "DE": { "buy": [{ "provider_id": 2, "provider_name": "Apple TV", "logo_path": "/a.jpg" }] }
            }
        })))
        .mount(&server)
        .await;

    let providers = client_for(&server)
        .watch_providers(MediaKind::Movie, 27205, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(providers.results.as_ref().map(|r| r.len()), Some(2));
    assert_eq!(providers.subscription("US")[0].provider_name, "Netflix");
    assert!(providers.subscription("DE").is_empty());
}

#[tokio::test]
async fn insight_without_endpoint_is_a_local_placeholder() {
    let server = MockServer::start().await;
    forbid_requests(&server).await;
    let config = Config {
        llm_endpoint: None,
        ..config_for(&server)
    };
    let answer = ApiClient::new(&config)
        .unwrap()
        .ai_insight("Blade Runner", &CancellationToken::new())
        .await
        .unwrap();
    assert!(answer.contains("Blade Runner"));
    assert!(answer.contains("LLM_ENDPOINT"));
}

#[tokio::test]
async fn insight_posts_query_and_returns_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/insight"))
        .and(body_json(json!({
            "query": "What should I know about the title \"Arrival\"? Keep it concise for a quick read."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "A linguist decodes an alien language."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client_for(&server)
        .ai_insight("Arrival", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(answer, "A linguist decodes an alien language.");
}

#[tokio::test]
async fn insight_failures_become_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/insight"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let answer = client_for(&server)
        .ai_insight("Arrival", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(answer, "AI insight request failed (503). Try again later.");
}

#[tokio::test]
async fn insight_malformed_answer_becomes_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/insight"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "wrong shape" })))
        .mount(&server)
        .await;

    let answer = client_for(&server)
        .ai_insight("Arrival", &CancellationToken::new())
        .await
        .unwrap();
    assert!(answer.contains("could not be read"));
}

#[tokio::test]
async fn cancelling_aborts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = client.search("Slow", &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn cancelled_token_short_circuits_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/insight"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "answer": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(client.search("x", &cancel).await.unwrap_err().is_cancelled());
    assert!(client
        .details(MediaKind::Movie, 1, &cancel)
        .await
        .unwrap_err()
        .is_cancelled());
    assert!(client
        .ai_insight("x", &cancel)
        .await
        .unwrap_err()
        .is_cancelled());
}
