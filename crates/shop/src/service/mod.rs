//! The Shop Service seam.
//!
//! The store talks to the external product-listing/checkout service only
//! through [`ShopService`]. Two implementations ship with the crate:
//!
//! - [`HttpShopClient`] - JSON over HTTP (`GET /products`, `POST /checkout`)
//! - [`MemoryShop`] - in-process stock table, used for demos and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use stockcart_shop::{HttpShopClient, ShopService};
//!
//! let client = HttpShopClient::new(config.api()?)?;
//! let products = client.get_products().await?;
//! client.checkout(&cart_items).await?;
//! ```

mod http;
mod memory;

use std::future::Future;
use std::sync::Arc;

use stockcart_core::{CartItem, Product};

use crate::error::{CheckoutError, FetchError};

pub use http::HttpShopClient;
pub use memory::{MemoryShop, SeedError};

/// External product-listing and checkout service.
pub trait ShopService: Send + Sync + 'static {
    /// Fetch the full current product list.
    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>, FetchError>> + Send;

    /// Submit a cart. The service decrements stock for every line or for none.
    fn checkout(
        &self,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), CheckoutError>> + Send;
}

impl<T: ShopService> ShopService for Arc<T> {
    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>, FetchError>> + Send {
        (**self).get_products()
    }

    fn checkout(
        &self,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), CheckoutError>> + Send {
        (**self).checkout(items)
    }
}
