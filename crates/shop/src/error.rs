//! Errors surfaced by the Shop Service seam.
//!
//! Both error types are recoverable: a failed fetch keeps the previous
//! catalog, a failed checkout keeps the cart. Callers report them to the
//! operator and may retry.

use stockcart_core::CatalogError;
use thiserror::Error;

/// Loading the catalog failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body is not a product list.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The product list decoded but is not a valid catalog.
    #[error("Malformed catalog: {0}")]
    Malformed(#[from] CatalogError),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl FetchError {
    /// Message suitable for showing to the operator.
    ///
    /// Transport errors are summarized so request URLs stay out of the
    /// register output.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Shop service unreachable".to_string(),
            Self::Status { status, .. } => format!("Shop service answered {status}"),
            Self::Parse(_) | Self::Malformed(_) => {
                "Shop service sent an unreadable product list".to_string()
            }
            Self::RateLimited(secs) => format!("Shop service busy, retry in {secs}s"),
        }
    }
}

/// Submitting the cart failed. The cart is left untouched.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The service refused the sale (usually a stock conflict).
    #[error("Checkout rejected: {0}")]
    Rejected(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Another submission has not resolved yet.
    #[error("Checkout already in progress")]
    InProgress,
}

impl CheckoutError {
    /// Message suitable for showing to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Http(_) => "Shop service unreachable".to_string(),
            Self::RateLimited(secs) => format!("Shop service busy, retry in {secs}s"),
            Self::InProgress => "A checkout is already being submitted".to_string(),
        }
    }
}
