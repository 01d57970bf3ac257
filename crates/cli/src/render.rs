//! Plain-text rendering of the store's read models.

use std::fmt::Write as _;

use stockcart_core::{Cart, CurrencyCode};
use stockcart_shop::StoreState;

/// Product table with stock net of what is already in the cart.
pub fn catalog_table(state: &StoreState, currency: CurrencyCode) -> String {
    if state.catalog.is_empty() {
        return "No products available\n".to_string();
    }

    let mut out = format!("{:<10} {:<28} {:>12} {:>8}\n", "CODE", "NAME", "PRICE", "STOCK");
    for product in state.catalog.products() {
        let available = state.cart.available_stock(product);
        let stock = if available == 0 {
            "sold out".to_string()
        } else {
            available.to_string()
        };
        let _ = writeln!(
            out,
            "{:<10} {:<28} {:>12} {:>8}",
            product.code,
            product.name,
            product.price.display(currency),
            stock
        );
    }
    out
}

/// Cart lines followed by the total.
pub fn cart_table(cart: &Cart, currency: CurrencyCode) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:<10} {:<28} {:>10} x {:<4} {:>12}",
            item.code,
            item.name,
            item.price.display(currency),
            item.quantity,
            item.line_total().display(currency)
        );
    }
    let _ = writeln!(out, "{:<59} {:>12}", "TOTAL", cart.total().display(currency));
    out
}
