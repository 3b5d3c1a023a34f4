//! Catalog, cart and identifier types shared by the WebMCP crates.
//!
//! Nothing here performs I/O. The operation protocol lives in
//! `webmcp-tools`; the HTTP service in `webmcp-server`.
//!
//! - [`types::id`] - typed product/category ids and opaque line/session keys
//! - [`types::price`] - decimal prices and currencies
//! - [`types::catalog`] - products, categories, search queries and pages
//! - [`types::cart`] - cart lines and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
