//! Catalog operations: `search_products`, `get_product`, `get_categories`.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde_json::json;
use webmcp_core::{DEFAULT_SEARCH_LIMIT, Product, SearchQuery};

use super::product_id;
use crate::adapter::CommerceAdapter;
use crate::error::InvocationError;
use crate::result::{ContentBlock, summary_with_payload};
use crate::schema::Arguments;

pub(super) async fn search_products(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let query = search_query(arguments)?;
    let page = commerce.search_catalog(&query).await?;

    let mut summary = format!(
        "Found {} products. Showing {}.",
        page.total,
        page.items.len()
    );
    if !page.items.is_empty() {
        summary.push('\n');
    }
    for p in &page.items {
        let stock = if p.in_stock { "" } else { " [OUT OF STOCK]" };
        let _ = write!(
            summary,
            "\n- {}: {} (ID: {}){stock}",
            p.name, p.price_display, p.id
        );
    }

    summary_with_payload(summary, &json!({ "products": page.items, "total": page.total }))
}

fn search_query(arguments: &Arguments) -> Result<SearchQuery, InvocationError> {
    let min_price = price_bound(arguments, "min_price")?;
    let max_price = price_bound(arguments, "max_price")?;
    if matches!((min_price, max_price), (Some(min), Some(max)) if min > max) {
        return Err(InvocationError::invalid(
            "min_price",
            "must not exceed max_price",
        ));
    }

    let limit = match arguments.i64("limit") {
        Some(limit) => u32::try_from(limit)
            .map_err(|_| InvocationError::invalid("limit", "is out of range"))?,
        None => DEFAULT_SEARCH_LIMIT,
    };

    Ok(SearchQuery {
        text: arguments.str("query").map(str::to_string),
        category_slug: arguments.str("category").map(str::to_string),
        min_price,
        max_price,
        limit,
    })
}

fn price_bound(arguments: &Arguments, field: &str) -> Result<Option<Decimal>, InvocationError> {
    arguments
        .f64(field)
        .map(|value| {
            Decimal::try_from(value)
                .map_err(|_| InvocationError::invalid(field, "is not a valid price"))
        })
        .transpose()
}

pub(super) async fn get_product(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let product = commerce.get_product(product_id(arguments)?).await?;
    summary_with_payload(product_details(&product), &json!({ "product": product }))
}

fn product_details(product: &Product) -> String {
    let mut text = format!("Product: {}\nPrice: {}", product.name, product.price);
    if product.on_sale() {
        let _ = write!(text, " (on sale, regular {})", product.regular_price);
    }

    text.push_str("\nStock: ");
    if product.in_stock {
        text.push_str("In stock");
        if let Some(quantity) = product.stock_quantity {
            let _ = write!(text, " ({quantity} units)");
        }
    } else {
        text.push_str("Out of stock");
    }

    if !product.categories.is_empty() {
        let names: Vec<&str> = product.categories.iter().map(|c| c.name.as_str()).collect();
        let _ = write!(text, "\nCategories: {}", names.join(", "));
    }
    for attribute in &product.attributes {
        let _ = write!(text, "\n{}: {}", attribute.name, attribute.options.join(", "));
    }
    let _ = write!(text, "\nURL: {}", product.permalink);

    if !product.short_description.is_empty() {
        let _ = write!(text, "\n\n{}", product.short_description);
    }
    text
}

pub(super) async fn get_categories(
    commerce: &dyn CommerceAdapter,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let categories = commerce.list_categories().await?;

    let summary = if categories.is_empty() {
        "No categories available.".to_string()
    } else {
        let mut summary = String::from("Available categories:\n");
        for c in &categories {
            let _ = write!(
                summary,
                "\n- {} (slug: {}) - {} products",
                c.name, c.slug, c.count
            );
        }
        summary
    };

    summary_with_payload(summary, &json!({ "categories": categories }))
}
