//! Integration tests for the HTTP Shop Service client.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use stockcart_core::{CartItem, Price, Product};
use stockcart_integration_tests::product_json;
use stockcart_shop::{CheckoutError, FetchError, HttpShopClient, ShopApiConfig, ShopService};
use url::Url;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> HttpShopClient {
    let mut config = ShopApiConfig::new(Url::parse(&format!("{}/api/", server.uri())).unwrap());
    config.token = token.map(|t| t.to_string().into());
    HttpShopClient::new(&config).unwrap()
}

// =============================================================================
// Product List
// =============================================================================

#[tokio::test]
async fn test_get_products_decodes_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json("A", "Americano", 6500, 12),
            product_json("B", "Brownie", 4000, 0),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let products = client(&server, None).get_products().await.unwrap();

    assert_eq!(
        products,
        vec![
            Product::new("A", "Americano", Price::from_minor(6500), 12),
            Product::new("B", "Brownie", Price::from_minor(4000), 0),
        ]
    );
}

#[tokio::test]
async fn test_get_products_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer k3Jd9aQ2pL0z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let products = client(&server, Some("k3Jd9aQ2pL0z")).get_products().await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_get_products_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let err = client(&server, None).get_products().await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_get_products_negative_stock_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "code": "A", "name": "Americano", "price": 6500, "remain": -3 }
        ])))
        .mount(&server)
        .await;

    let err = client(&server, None).get_products().await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_get_products_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let err = client(&server, None).get_products().await.unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "database offline");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_get_products_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client(&server, None).get_products().await.unwrap_err();
    assert!(matches!(err, FetchError::RateLimited(7)));
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_posts_cart_lines() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkout"))
        .and(body_json(json!([
            { "code": "A", "name": "Americano", "price": 6500, "remain": 12, "quantity": 2 }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let product = Product::new("A", "Americano", Price::from_minor(6500), 12);
    let items = [CartItem::from_product(&product, 2)];

    client(&server, None).checkout(&items).await.unwrap();
}

#[tokio::test]
async fn test_checkout_rejection_carries_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkout"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "insufficient stock for A" })),
        )
        .mount(&server)
        .await;

    let product = Product::new("A", "Americano", Price::from_minor(6500), 1);
    let items = [CartItem::from_product(&product, 1)];

    let err = client(&server, None).checkout(&items).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Rejected(ref m) if m == "insufficient stock for A"));
}

#[tokio::test]
async fn test_checkout_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkout"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .expect(1)
        .mount(&server)
        .await;

    let product = Product::new("A", "Americano", Price::from_minor(6500), 1);
    let items = [CartItem::from_product(&product, 1)];

    let err = client(&server, None).checkout(&items).await.unwrap_err();
    assert!(matches!(err, CheckoutError::RateLimited(3)));
}

#[tokio::test]
async fn test_checkout_transport_failure() {
    // Nothing listens on the server once it is dropped
    let server = MockServer::start().await;
    let client = client(&server, None);
    drop(server);

    let product = Product::new("A", "Americano", Price::from_minor(6500), 1);
    let items = [CartItem::from_product(&product, 1)];

    let err = client.checkout(&items).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Http(_)));
}
