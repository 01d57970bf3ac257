//! Stockcart Core - catalog and cart reconciliation.
//!
//! This crate provides the types and rules shared by all Stockcart components:
//! - `shop` - Shop Service clients and the observable store
//! - `cli` - Operator command-line front-end
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no HTTP clients, no
//! async. Every cart mutation is a synchronous step that either changes the
//! cart or leaves it untouched.
//!
//! # Modules
//!
//! - [`types`] - Product codes, prices, products, cart lines, checkout state
//! - [`catalog`] - The product list as last fetched
//! - [`cart`] - Cart lines bounded by remaining stock

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::Cart;
pub use catalog::{Catalog, CatalogError};
pub use types::*;
