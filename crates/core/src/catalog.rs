//! Catalog View data: the product list as last fetched from the Shop Service.
//!
//! A [`Catalog`] is only ever replaced wholesale. There is deliberately no API
//! for mutating a single product; stock changes arrive through the next fetch.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Product, ProductCode};

/// Reasons a fetched product list cannot become a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two products share the same code.
    #[error("duplicate product code: {0}")]
    DuplicateCode(ProductCode),

    /// A product carries a negative price.
    #[error("negative price for product {0}")]
    NegativePrice(ProductCode),
}

/// Ordered product list, unique by code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Empty catalog, as held before the first load.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Build a catalog from a fetched product list, preserving order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if codes are not unique or a price is negative.
    pub fn try_from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.code.as_str()) {
                return Err(CatalogError::DuplicateCode(product.code.clone()));
            }
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.code.clone()));
            }
        }
        Ok(Self { products })
    }

    /// Products in service order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by code.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.code.as_str() == code)
    }

    /// Stock ceiling for `code`; unknown products have a ceiling of zero.
    #[must_use]
    pub fn remain_of(&self, code: &str) -> u32 {
        self.find(code).map_or(0, |p| p.remain)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn product(code: &str, remain: u32) -> Product {
        Product::new(code, code, Price::from_minor(10), remain)
    }

    #[test]
    fn test_remain_of_unknown_is_zero() {
        let catalog = Catalog::try_from_products(vec![product("A", 3)]).unwrap_or_default();
        assert_eq!(catalog.remain_of("A"), 3);
        assert_eq!(catalog.remain_of("Z"), 0);
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let result = Catalog::try_from_products(vec![product("A", 1), product("A", 2)]);
        assert_eq!(
            result,
            Err(CatalogError::DuplicateCode(ProductCode::from("A")))
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        let bad = Product::new("B", "Broken", Price::from_minor(-1), 1);
        let result = Catalog::try_from_products(vec![product("A", 1), bad]);
        assert_eq!(result, Err(CatalogError::NegativePrice(ProductCode::from("B"))));
    }

    #[test]
    fn test_order_preserved() {
        let catalog =
            Catalog::try_from_products(vec![product("B", 1), product("A", 1)]).unwrap_or_default();
        let codes: Vec<_> = catalog.products().iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["B", "A"]);
    }
}
