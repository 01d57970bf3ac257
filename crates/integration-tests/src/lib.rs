//! Integration tests for Stockcart.
//!
//! Tests run the HTTP Shop Service client and the store against a `wiremock`
//! server standing in for the external Shop Service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockcart-integration-tests
//! ```

use serde_json::{Value, json};
use stockcart_shop::{HttpShopClient, ShopApiConfig, ShopStore};
use url::Url;
use wiremock::MockServer;

/// Product JSON as the Shop Service returns it.
#[must_use]
pub fn product_json(code: &str, name: &str, price: i64, remain: u32) -> Value {
    json!({ "code": code, "name": name, "price": price, "remain": remain })
}

/// Build a store whose client points at `server`.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn store_for(server: &MockServer) -> ShopStore<HttpShopClient> {
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = HttpShopClient::new(&ShopApiConfig::new(base_url)).unwrap();
    ShopStore::new(client)
}
