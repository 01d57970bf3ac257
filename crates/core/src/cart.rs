//! Cart reconciliation rules.
//!
//! A [`Cart`] keeps one line per product code and never lets a mutation push a
//! line above the product's remaining stock. The ceiling is checked at
//! mutation time against the catalog the caller passes in; a later catalog
//! refresh can leave existing lines above the new ceiling, and the Shop
//! Service's checkout is the authority on that conflict.
//!
//! Every mutation returns `true` only when the cart actually changed. Requests
//! that hit a ceiling are silent no-ops, not errors.

use crate::catalog::Catalog;
use crate::types::{CartItem, Price, Product};

/// Ordered cart lines, unique by product code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// An existing line grows by one while it stays within `product.remain`.
    /// A new line starts at quantity 1 if the product has any stock.
    pub fn add(&mut self, product: &Product) -> bool {
        if let Some(item) = self.line_mut(product.code.as_str()) {
            if item.quantity < product.remain {
                item.quantity += 1;
                return true;
            }
            return false;
        }

        if product.is_sold_out() {
            return false;
        }
        self.items.push(CartItem::from_product(product, 1));
        true
    }

    /// Apply `delta` to the line for `code`.
    ///
    /// The new quantity is accepted only if it does not exceed the catalog's
    /// remaining stock for `code` (zero when the product is gone); otherwise
    /// the line is left as is. A resulting quantity of zero or less removes
    /// the line.
    pub fn update_quantity(&mut self, code: &str, delta: i64, catalog: &Catalog) -> bool {
        let ceiling = i64::from(catalog.remain_of(code));
        let Some(index) = self.items.iter().position(|item| item.code.as_str() == code) else {
            return false;
        };
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };

        let new_qty = i64::from(item.quantity).saturating_add(delta);
        if new_qty > ceiling {
            return false;
        }

        if new_qty <= 0 {
            self.items.remove(index);
            return true;
        }

        // new_qty is within 1..=ceiling, and ceiling came from a u32
        let new_qty = u32::try_from(new_qty).unwrap_or(item.quantity);
        if new_qty == item.quantity {
            return false;
        }
        item.quantity = new_qty;
        true
    }

    /// Remove the line for `code`, if any.
    pub fn remove(&mut self, code: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.code.as_str() != code);
        self.items.len() != before
    }

    /// Drop every line.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        true
    }

    /// Clear the cart only if `confirm` approves.
    ///
    /// `confirm` is not called when the cart is already empty.
    pub fn clear_confirmed(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if self.items.is_empty() || !confirm() {
            return false;
        }
        self.clear()
    }

    /// Quantity of `code` in the cart, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, code: &str) -> u32 {
        self.line(code).map_or(0, |item| item.quantity)
    }

    /// Units of `product` that can still be added.
    #[must_use]
    pub fn available_stock(&self, product: &Product) -> u32 {
        product
            .remain
            .saturating_sub(self.quantity_of(product.code.as_str()))
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn line(&self, code: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.code.as_str() == code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn line_mut(&mut self, code: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.code.as_str() == code)
    }
}
