//! Core types for Stockcart.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod code;
pub mod price;
pub mod product;
pub mod status;

pub use code::ProductCode;
pub use price::{CurrencyCode, Price};
pub use product::{CartItem, Product};
pub use status::CheckoutState;
