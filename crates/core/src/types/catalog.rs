//! Catalog types: products, categories and search queries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// Default page size for catalog searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Reference to a category from a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A category with the number of products filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub count: u32,
    pub description: String,
}

/// A named product attribute with its options (e.g., "Color": red, blue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub options: Vec<String>,
}

/// Physical dimensions of a product, as free-form strings with units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

/// Full product detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub permalink: String,
    /// Current selling price (sale price when on sale).
    pub price: Price,
    pub regular_price: Price,
    pub sale_price: Option<Price>,
    pub in_stock: bool,
    pub stock_quantity: Option<u32>,
    pub short_description: String,
    pub description: String,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub categories: Vec<CategoryRef>,
    pub attributes: Vec<ProductAttribute>,
    pub dimensions: Dimensions,
}

impl Product {
    /// Whether the product is currently discounted.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.sale_price
            .is_some_and(|sale| sale.amount < self.regular_price.amount)
    }

    /// Whether the product is filed under the category with the given slug.
    #[must_use]
    pub fn in_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }

    /// Compact listing representation used in search results.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            permalink: self.permalink.clone(),
            price: self.price,
            regular_price: self.regular_price,
            sale_price: self.sale_price,
            price_display: self.price.to_string(),
            on_sale: self.on_sale(),
            in_stock: self.in_stock,
            stock_quantity: self.stock_quantity,
            short_description: self.short_description.clone(),
            image: self.image.clone(),
            categories: self.categories.clone(),
        }
    }
}

/// Compact product representation returned by catalog searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub permalink: String,
    pub price: Price,
    pub regular_price: Price,
    pub sale_price: Option<Price>,
    /// Price formatted for display (e.g., "$19.99").
    pub price_display: String,
    pub on_sale: bool,
    pub in_stock: bool,
    pub stock_quantity: Option<u32>,
    pub short_description: String,
    pub image: Option<String>,
    pub categories: Vec<CategoryRef>,
}

/// Catalog search parameters.
///
/// Price bounds are inclusive. An empty query (no text, no category, no
/// bounds) returns an unfiltered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub category_slug: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            category_slug: None,
            min_price: None,
            max_price: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchQuery {
    /// Whether a price falls within the query's inclusive bounds.
    #[must_use]
    pub fn price_matches(&self, amount: Decimal) -> bool {
        self.min_price.is_none_or(|min| amount >= min)
            && self.max_price.is_none_or(|max| amount <= max)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<ProductSummary>,
    /// Number of matching products before the page limit was applied.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::CurrencyCode;

    fn usd(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Mug".to_string(),
            slug: "mug".to_string(),
            permalink: "http://localhost/products/mug".to_string(),
            price: usd(800),
            regular_price: usd(1000),
            sale_price: Some(usd(800)),
            in_stock: true,
            stock_quantity: Some(3),
            short_description: "A mug".to_string(),
            description: "A ceramic mug".to_string(),
            image: None,
            images: Vec::new(),
            categories: vec![CategoryRef {
                id: CategoryId::new(10),
                name: "Kitchen".to_string(),
                slug: "kitchen".to_string(),
            }],
            attributes: Vec::new(),
            dimensions: Dimensions::default(),
        }
    }

    #[test]
    fn test_on_sale_requires_lower_sale_price() {
        let mut p = product();
        assert!(p.on_sale());
        p.sale_price = Some(usd(1000));
        assert!(!p.on_sale());
        p.sale_price = None;
        assert!(!p.on_sale());
    }

    #[test]
    fn test_summary_carries_display_price() {
        let summary = product().summary();
        assert_eq!(summary.price_display, "$8.00");
        assert!(summary.on_sale);
        assert_eq!(summary.categories.len(), 1);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let query = SearchQuery {
            min_price: Some(Decimal::new(10, 0)),
            max_price: Some(Decimal::new(20, 0)),
            ..SearchQuery::default()
        };
        assert!(query.price_matches(Decimal::new(10, 0)));
        assert!(query.price_matches(Decimal::new(20, 0)));
        assert!(!query.price_matches(Decimal::new(2001, 2)));
        assert!(!query.price_matches(Decimal::new(999, 2)));
    }

    #[test]
    fn test_in_category() {
        let p = product();
        assert!(p.in_category("kitchen"));
        assert!(!p.in_category("garden"));
    }
}
