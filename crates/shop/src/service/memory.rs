//! In-process Shop Service.
//!
//! Keeps the stock table in memory and applies checkouts all-or-nothing, the
//! same contract the HTTP service promises. Seedable from a YAML file:
//!
//! ```yaml
//! products:
//!   - code: A
//!     name: Americano
//!     price: 6500
//!     remain: 12
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use stockcart_core::{CartItem, Catalog, CatalogError, Product};
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::ShopService;
use crate::error::{CheckoutError, FetchError};

/// Errors loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid seed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid seed catalog: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<Product>,
}

/// Shop Service backed by an in-memory stock table.
#[derive(Debug, Default)]
pub struct MemoryShop {
    products: Mutex<Vec<Product>>,
    fetches: AtomicUsize,
    checkouts: AtomicUsize,
}

impl MemoryShop {
    /// Create a shop holding `products`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the products do not form a valid catalog.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let products = Catalog::try_from_products(products)?.products().to_vec();
        Ok(Self {
            products: Mutex::new(products),
            fetches: AtomicUsize::new(0),
            checkouts: AtomicUsize::new(0),
        })
    }

    /// Load a shop from a YAML seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the file cannot be read or parsed, or holds an
    /// invalid catalog.
    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let shop = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), "Loaded in-memory shop");
        Ok(shop)
    }

    /// Parse a shop from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the YAML is invalid or holds an invalid catalog.
    pub fn from_yaml_str(content: &str) -> Result<Self, SeedError> {
        let seed: SeedFile = serde_yaml::from_str(content)?;
        Ok(Self::new(seed.products)?)
    }

    /// Current stock table.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.lock().clone()
    }

    /// Remaining stock for `code`, if the product exists.
    #[must_use]
    pub fn remain_of(&self, code: &str) -> Option<u32> {
        self.lock()
            .iter()
            .find(|p| p.code.as_str() == code)
            .map(|p| p.remain)
    }

    /// Overwrite the remaining stock of `code`, as a sale elsewhere would.
    pub fn set_remain(&self, code: &str, remain: u32) -> bool {
        let mut products = self.lock();
        match products.iter_mut().find(|p| p.code.as_str() == code) {
            Some(product) => {
                product.remain = remain;
                true
            }
            None => false,
        }
    }

    /// Number of product-list fetches served.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of checkout calls received, successful or not.
    #[must_use]
    pub fn checkout_count(&self) -> usize {
        self.checkouts.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Product>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check every line against the stock table without touching it.
fn validate_lines(products: &[Product], items: &[CartItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::Rejected("cart is empty".to_string()));
    }

    for item in items {
        let Some(product) = products.iter().find(|p| p.code == item.code) else {
            return Err(CheckoutError::Rejected(format!(
                "unknown product {}",
                item.code
            )));
        };
        if item.quantity == 0 {
            return Err(CheckoutError::Rejected(format!(
                "invalid quantity for {}",
                item.code
            )));
        }
        let already = items
            .iter()
            .filter(|other| other.code == item.code)
            .map(|other| u64::from(other.quantity))
            .sum::<u64>();
        if already > u64::from(product.remain) {
            return Err(CheckoutError::Rejected(format!(
                "insufficient stock for {} (requested {already}, remaining {})",
                item.code, product.remain
            )));
        }
    }
    Ok(())
}

impl ShopService for MemoryShop {
    async fn get_products(&self) -> Result<Vec<Product>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.products())
    }

    #[instrument(skip(self, items), fields(lines = items.len()))]
    async fn checkout(&self, items: &[CartItem]) -> Result<(), CheckoutError> {
        self.checkouts.fetch_add(1, Ordering::SeqCst);

        let mut products = self.lock();
        validate_lines(&products, items)?;

        for item in items {
            if let Some(product) = products.iter_mut().find(|p| p.code == item.code) {
                product.remain -= item.quantity;
            }
        }
        drop(products);

        debug!("Stock decremented");
        Ok(())
    }
}
