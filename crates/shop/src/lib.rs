//! Stockcart Shop - Shop Service clients and the observable cart store.
//!
//! # Architecture
//!
//! - [`service`] - the `ShopService` seam, HTTP client and in-memory service
//! - [`store`] - `ShopStore`, the single owner of catalog, cart and checkout
//!   state, with change notification via `tokio::sync::watch`
//! - [`config`] - environment-driven configuration
//! - [`error`] - `FetchError` and `CheckoutError`
//!
//! # Example
//!
//! ```rust,ignore
//! use stockcart_shop::{HttpShopClient, ShopConfig, ShopStore};
//!
//! let config = ShopConfig::from_env()?;
//! let store = ShopStore::new(HttpShopClient::new(config.api()?)?);
//! store.refresh_catalog().await?;
//!
//! store.add_to_cart("A");
//! store.update_quantity("A", 1);
//! store.checkout().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use config::{ConfigError, ShopApiConfig, ShopConfig};
pub use error::{CheckoutError, FetchError};
pub use service::{HttpShopClient, MemoryShop, SeedError, ShopService};
pub use store::{CheckoutOutcome, CheckoutReceipt, ShopStore, StoreState};
