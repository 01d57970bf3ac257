//! Catalog products and cart lines.

use serde::{Deserialize, Serialize};

use super::{Price, ProductCode};

/// A product as reported by the Shop Service at the last fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product key.
    pub code: ProductCode,
    /// Display name.
    pub name: String,
    /// Unit price in minor units.
    pub price: Price,
    /// Remaining stock at the time of the fetch.
    pub remain: u32,
}

impl Product {
    /// Create a product.
    #[must_use]
    pub fn new(
        code: impl Into<ProductCode>,
        name: impl Into<String>,
        price: Price,
        remain: u32,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
            remain,
        }
    }

    /// Whether no stock is left.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.remain == 0
    }
}

/// One cart line: a product snapshot plus the chosen quantity.
///
/// Serializes flat (`code`, `name`, `price`, `remain`, `quantity`), which is
/// the shape the Shop Service checkout endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub code: ProductCode,
    pub name: String,
    pub price: Price,
    pub remain: u32,
    pub quantity: u32,
}

impl CartItem {
    /// Start a line for `product` with the given quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            code: product.code.clone(),
            name: product.name.clone(),
            price: product.price,
            remain: product.remain,
            quantity,
        }
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}
