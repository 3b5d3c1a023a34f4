//! Core types for the commerce tools.
//!
//! This module provides type-safe wrappers for catalog and cart concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;

pub use cart::{Cart, CartLine, MAX_LINE_QUANTITY};
pub use catalog::{
    CategoryRef, CategorySummary, DEFAULT_SEARCH_LIMIT, Dimensions, Product, ProductAttribute,
    ProductSummary, SearchPage, SearchQuery,
};
pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency, format_amount};
