//! Show the catalog.

#![allow(clippy::print_stdout)]

use stockcart_core::CurrencyCode;
use stockcart_shop::{ShopService, ShopStore};

use crate::render;

/// Print every product with price and remaining stock.
pub fn list<S: ShopService>(store: &ShopStore<S>, currency: CurrencyCode) {
    print!("{}", render::catalog_table(&store.snapshot(), currency));
}
