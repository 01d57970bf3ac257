//! Shop Service client over HTTP/JSON.
//!
//! Uses `reqwest` for HTTP. Every request carries a fresh `x-request-id` so
//! failures can be correlated with the service's logs.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use stockcart_core::{CartItem, Product};
use tracing::{Span, debug, instrument};
use uuid::Uuid;

use super::ShopService;
use crate::config::ShopApiConfig;
use crate::error::{CheckoutError, FetchError};

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest slice of a response body kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the Shop Service HTTP API.
#[derive(Clone)]
pub struct HttpShopClient {
    inner: Arc<HttpShopClientInner>,
}

struct HttpShopClientInner {
    client: reqwest::Client,
    products_url: String,
    checkout_url: String,
    token: Option<SecretString>,
}

impl HttpShopClient {
    /// Create a new Shop Service client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ShopApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpShopClientInner {
                client,
                products_url: config.endpoint("products"),
                checkout_url: config.endpoint("checkout"),
                token: config.token.clone(),
            }),
        })
    }

    /// Start a request with the common headers.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        let builder = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id)
            .header("Accept", "application/json");

        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

impl ShopService for HttpShopClient {
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    async fn get_products(&self) -> Result<Vec<Product>, FetchError> {
        let response = self
            .request(Method::GET, &self.inner.products_url)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(retry_after(&response)));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "Shop service returned non-success status for product list"
            );
            return Err(FetchError::Status {
                status,
                body: excerpt(&body),
            });
        }

        let products: Vec<Product> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse product list"
            );
            FetchError::Parse(e)
        })?;

        debug!(count = products.len(), "Fetched product list");
        Ok(products)
    }

    #[instrument(skip(self, items), fields(lines = items.len(), request_id = tracing::field::Empty))]
    async fn checkout(&self, items: &[CartItem]) -> Result<(), CheckoutError> {
        let response = self
            .request(Method::POST, &self.inner.checkout_url)
            .json(items)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CheckoutError::RateLimited(retry_after(&response)));
        }
        if status.is_success() {
            debug!(status = %status, "Checkout accepted");
            return Ok(());
        }

        let body = response.text().await?;
        let message = rejection_message(status, &body);
        tracing::warn!(status = %status, message = %message, "Checkout rejected");
        Err(CheckoutError::Rejected(message))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Seconds from the `Retry-After` header, defaulting to 1.
fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Best human-readable reason from a rejected checkout.
///
/// Prefers a JSON `message` or `error` string, then the raw body, then the
/// status line.
fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(message)) = fields.get(key)
                && !message.is_empty()
            {
                return message.clone();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        excerpt(trimmed)
    }
}
