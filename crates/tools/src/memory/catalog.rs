//! Catalog seed files.
//!
//! A seed is a YAML (or JSON) document:
//!
//! ```yaml
//! currency: USD
//! categories:
//!   - { id: 1, name: Mugs, slug: mugs }
//! products:
//!   - id: 10
//!     name: Blue Mug
//!     slug: blue-mug
//!     regular_price: "12.00"
//!     sale_price: "9.50"
//!     stock_quantity: 5
//!     categories: [mugs]
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use webmcp_core::{
    CategoryId, CategoryRef, CategorySummary, CurrencyCode, Dimensions, Price, Product,
    ProductAttribute, ProductId,
};

/// Errors loading a catalog seed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid catalog: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Parsed catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Defaults to `{base_url}/products/{slug}`.
    pub permalink: Option<String>,
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Category slugs.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub dimensions: Dimensions,
}

const fn default_in_stock() -> bool {
    true
}

impl CatalogSeed {
    /// Parse a seed from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] on malformed input.
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read or
    /// [`CatalogError::Parse`] if it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Check the seed for consistency, returning every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut category_ids = HashSet::new();
        let mut slugs = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                errors.push(format!("duplicate category id {}", category.id));
            }
            if !slugs.insert(category.slug.as_str()) {
                errors.push(format!("duplicate category slug '{}'", category.slug));
            }
        }

        let mut product_ids = HashSet::new();
        for product in &self.products {
            let label = format!("product {} ({})", product.id, product.name);
            if !product_ids.insert(product.id) {
                errors.push(format!("duplicate product id {}", product.id));
            }
            if product.name.trim().is_empty() {
                errors.push(format!("product {} has an empty name", product.id));
            }
            if product.regular_price.is_sign_negative() {
                errors.push(format!("{label}: regular_price must not be negative"));
            }
            if let Some(sale) = product.sale_price {
                if sale.is_sign_negative() {
                    errors.push(format!("{label}: sale_price must not be negative"));
                } else if sale > product.regular_price {
                    errors.push(format!("{label}: sale_price exceeds regular_price"));
                }
            }
            for slug in &product.categories {
                if !slugs.contains(slug.as_str()) {
                    errors.push(format!("{label}: unknown category '{slug}'"));
                }
            }
        }

        errors
    }
}

/// Validated, immutable catalog.
#[derive(Debug, Clone, Default)]
pub(super) struct Catalog {
    pub(super) currency: CurrencyCode,
    /// Ordered by product id.
    pub(super) products: BTreeMap<ProductId, Product>,
    /// Categories with at least one product, in declaration order.
    pub(super) categories: Vec<CategorySummary>,
}

impl Catalog {
    pub(super) fn build(seed: CatalogSeed, base_url: &str) -> Result<Self, CatalogError> {
        let errors = seed.validate();
        if !errors.is_empty() {
            return Err(CatalogError::Invalid(errors));
        }

        let currency = seed.currency;
        let refs: HashMap<&str, CategoryRef> = seed
            .categories
            .iter()
            .map(|c| {
                (
                    c.slug.as_str(),
                    CategoryRef {
                        id: c.id,
                        name: c.name.clone(),
                        slug: c.slug.clone(),
                    },
                )
            })
            .collect();

        let base_url = base_url.trim_end_matches('/');
        let products: BTreeMap<ProductId, Product> = seed
            .products
            .iter()
            .map(|p| (p.id, build_product(p, &refs, currency, base_url)))
            .collect();

        let categories = seed
            .categories
            .iter()
            .filter_map(|c| {
                let count = products.values().filter(|p| p.in_category(&c.slug)).count();
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                (count > 0).then(|| CategorySummary {
                    id: c.id,
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                    count,
                    description: c.description.clone(),
                })
            })
            .collect();

        Ok(Self {
            currency,
            products,
            categories,
        })
    }
}

fn build_product(
    seed: &ProductSeed,
    refs: &HashMap<&str, CategoryRef>,
    currency: CurrencyCode,
    base_url: &str,
) -> Product {
    let regular_price = Price::new(seed.regular_price, currency);
    let sale_price = seed.sale_price.map(|amount| Price::new(amount, currency));
    let price = sale_price.unwrap_or(regular_price);
    // Zero stock means out of stock regardless of the flag.
    let in_stock = seed.in_stock && seed.stock_quantity != Some(0);

    Product {
        id: seed.id,
        name: seed.name.clone(),
        slug: seed.slug.clone(),
        permalink: seed
            .permalink
            .clone()
            .unwrap_or_else(|| format!("{base_url}/products/{}", seed.slug)),
        price,
        regular_price,
        sale_price,
        in_stock,
        stock_quantity: seed.stock_quantity,
        short_description: seed.short_description.clone(),
        description: seed.description.clone(),
        image: seed.images.first().cloned(),
        images: seed.images.clone(),
        categories: seed
            .categories
            .iter()
            .filter_map(|slug| refs.get(slug.as_str()).cloned())
            .collect(),
        attributes: seed.attributes.clone(),
        dimensions: seed.dimensions.clone(),
    }
}
