//! Integration tests for the HTTP transport and the engine wired from config.
//!
//! Each test stands up a local `wiremock` server, so no real network traffic
//! is made.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use pricewatch_core::{AppConfig, Environment, ProductDescriptor};
use pricewatch_scraper::{
    ErrorReason, ExtractionOutcome, FetchRequest, FetchStatus, HtmlPageQuery, HttpTransport,
    MemoryRecorder, PriceExtractionEngine, Transport,
};
use rust_decimal::Decimal;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_transport() -> HttpTransport {
    HttpTransport::new("pricewatch-test/0.1", 0, 0).expect("failed to build test transport")
}

fn get(url: String) -> FetchRequest {
    FetchRequest::get(url, Duration::from_secs(5))
}

fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "debug".to_owned(),
        catalog_path: PathBuf::from("config/catalog.yaml"),
        output_path: PathBuf::from("prices.csv"),
        timeseries_api_key: Some("ts-key".to_owned()),
        marketplace_api_token: Some("mp-token".to_owned()),
        timeseries_base_url: server.uri(),
        timeseries_domain: "4".to_owned(),
        marketplace_base_url: server.uri(),
        request_timeout_secs: 5,
        user_agent: "pricewatch-test/0.1".to_owned(),
        inter_request_delay_ms: 0,
        max_retries: 0,
        retry_backoff_base_secs: 0,
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_returns_body_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>ok</p>", "text/html; charset=utf-8")
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let result = test_transport()
        .fetch(&get(format!("{}/page", server.uri())))
        .await;

    assert_eq!(result.status, FetchStatus::Success);
    assert_eq!(result.body, "<p>ok</p>");
    assert_eq!(result.content_type.as_deref(), Some("text/html; charset=utf-8"));
}

#[tokio::test]
async fn request_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer abc"))
        .and(header("user-agent", "Mozilla/5.0 test"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let request = get(server.uri())
        .with_header("Authorization", "Bearer abc")
        .with_header("User-Agent", "Mozilla/5.0 test");
    let result = test_transport().fetch(&request).await;

    assert!(result.is_success(), "got {:?}", result.status);
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let result = test_transport().fetch(&get(server.uri())).await;

    assert_eq!(result.status, FetchStatus::HttpError(404));
    assert_eq!(result.body, "gone");
}

#[tokio::test]
async fn no_retry_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_transport().fetch(&get(server.uri())).await;
    assert_eq!(result.status, FetchStatus::HttpError(503));
}

#[tokio::test]
async fn opt_in_retry_recovers_from_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new("pricewatch-test/0.1", 2, 0).unwrap();
    let result = transport.fetch(&get(server.uri())).await;

    assert!(result.is_success());
    assert_eq!(result.body, "recovered");
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new("pricewatch-test/0.1", 3, 0).unwrap();
    let result = transport.fetch(&get(server.uri())).await;
    assert_eq!(result.status, FetchStatus::HttpError(401));
}

#[tokio::test]
async fn timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let request = FetchRequest::get(server.uri(), Duration::from_millis(200));
    let result = test_transport().fetch(&request).await;

    match result.status {
        FetchStatus::NetworkError(message) => {
            assert!(message.contains("timeout"), "message: {message}");
        }
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_network_error_without_query() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let request = get(format!("http://{addr}/product?key=secret-key"));
    let result = test_transport().fetch(&request).await;

    match result.status {
        FetchStatus::NetworkError(message) => {
            assert!(!message.contains("secret-key"), "message leaks query: {message}");
        }
        other => panic!("expected network error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Engine wired from config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn engine_extracts_from_both_apis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param("key", "ts-key"))
        .and(query_param("domain", "4"))
        .and(query_param("asin", "B0EXAMPLE"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"products": [{"listPrice": 45900}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/offers/iphone-13-128"))
        .and(header("authorization", "Bearer mp-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"price": {"value": 199.5}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let engine = PriceExtractionEngine::from_config(
        &config,
        Arc::new(test_transport()),
        Arc::new(HtmlPageQuery),
    );
    let catalog = vec![
        ProductDescriptor::new("Pixel 8a", "keepa").with_param("asin", "B0EXAMPLE"),
        ProductDescriptor::new("iPhone 13", "backmarket").with_param("sku", "iphone-13-128"),
    ];
    let mut recorder = MemoryRecorder::new();

    let outcomes = engine
        .run_once(&catalog, &mut recorder, &CancellationToken::new())
        .await;

    let prices: Vec<_> = outcomes
        .iter()
        .map(|o| o.observation().map(|obs| obs.price))
        .collect();
    assert_eq!(
        prices,
        [
            Some(Decimal::from_str("459.00").unwrap()),
            Some(Decimal::from_str("199.5").unwrap()),
        ]
    );
    assert_eq!(recorder.observations().len(), 2);
}

#[tokio::test]
async fn engine_scrapes_served_page_with_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/f-14404-pixel.html"))
        .and(header("user-agent", "pricewatch-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div class="prdtBlocPrice"><span class="price">459,99 €</span></div></body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let engine = PriceExtractionEngine::from_config(
        &config,
        Arc::new(test_transport()),
        Arc::new(HtmlPageQuery),
    );
    let product = ProductDescriptor::new("Pixel 8a", "cdiscount")
        .with_param("url", &format!("{}/f-14404-pixel.html", server.uri()));

    let outcome = engine.extract_one(&product).await;

    assert_eq!(
        outcome.observation().map(|o| o.price),
        Some(Decimal::from_str("459.99").unwrap())
    );
}

#[tokio::test]
async fn missing_credential_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.timeseries_api_key = None;
    let engine = PriceExtractionEngine::from_config(
        &config,
        Arc::new(test_transport()),
        Arc::new(HtmlPageQuery),
    );

    let outcome = engine
        .extract_one(&ProductDescriptor::new("Pixel 8a", "time_series").with_param("asin", "B0"))
        .await;

    assert!(
        matches!(&outcome, ExtractionOutcome::Failure(err) if err.reason == ErrorReason::MissingCredential),
        "got {outcome:?}"
    );
}
