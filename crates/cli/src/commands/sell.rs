//! One-shot sale: build a cart from arguments and check out.

#![allow(clippy::print_stdout)]

use std::str::FromStr;

use stockcart_core::CurrencyCode;
use stockcart_shop::{CheckoutOutcome, ShopService, ShopStore};
use thiserror::Error;
use tracing::{info, warn};

use crate::render;

/// Errors parsing a `CODE[=QTY]` argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineSpecError {
    #[error("product code is empty")]
    EmptyCode,
    #[error("invalid quantity '{0}' (expected a positive integer)")]
    InvalidQuantity(String),
}

/// Errors building the cart.
#[derive(Debug, Error)]
pub enum SellError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),
}

/// A requested cart line: `CODE` or `CODE=QTY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    pub code: String,
    pub quantity: u32,
}

impl FromStr for LineSpec {
    type Err = LineSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, quantity) = match s.split_once('=') {
            Some((code, qty)) => {
                let quantity = qty
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|q| *q > 0)
                    .ok_or_else(|| LineSpecError::InvalidQuantity(qty.to_string()))?;
                (code, quantity)
            }
            None => (s, 1),
        };

        let code = code.trim();
        if code.is_empty() {
            return Err(LineSpecError::EmptyCode);
        }
        Ok(Self {
            code: code.to_string(),
            quantity,
        })
    }
}

/// Add each requested line one unit at a time, then check out.
///
/// Requests beyond the stock ceiling are capped and reported, never an error.
///
/// # Errors
///
/// Returns an error for unknown products or if the checkout fails.
pub async fn run<S: ShopService>(
    store: &ShopStore<S>,
    lines: &[LineSpec],
    currency: CurrencyCode,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in lines {
        if store.catalog().find(&line.code).is_none() {
            return Err(SellError::UnknownProduct(line.code.clone()).into());
        }

        let mut added = 0u32;
        while added < line.quantity && store.add_to_cart(&line.code) {
            added += 1;
        }
        if added < line.quantity {
            warn!(
                code = %line.code,
                requested = line.quantity,
                added,
                "Stock limit reached, quantity capped"
            );
            println!(
                "{}: only {added} of {} added (stock limit)",
                line.code, line.quantity
            );
        }
    }

    print!("{}", render::cart_table(&store.cart(), currency));

    match store.checkout().await? {
        CheckoutOutcome::EmptyCart => println!("Nothing to sell"),
        CheckoutOutcome::Completed(receipt) => {
            println!(
                "Sale completed at {}: {} ({} lines)",
                receipt.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
                receipt.total.display(currency),
                receipt.lines.len()
            );
            match receipt.refresh.await {
                Ok(Ok(())) => info!("Catalog refreshed after sale"),
                Ok(Err(e)) => warn!(error = %e, "Catalog refresh after sale failed"),
                Err(e) => warn!(error = %e, "Catalog refresh task aborted"),
            }
        }
    }
    Ok(())
}
