//! Catalog route handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use tracing::instrument;
use webmcp_core::{DEFAULT_SEARCH_LIMIT, ProductId, SearchQuery};
use webmcp_tools::operations::MAX_SEARCH_LIMIT;
use webmcp_tools::rest::{CategoriesResponse, ProductResponse, SearchParams, SearchResponse};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Search the catalog.
#[instrument(skip(state, params))]
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(params) = params?;
    let query = search_query(params)?;
    let page = state.commerce().search_catalog(&query).await?;

    Ok(Json(SearchResponse {
        success: true,
        products: page.items,
        total: page.total,
    }))
}

fn search_query(params: SearchParams) -> Result<SearchQuery> {
    if matches!(
        (params.min_price, params.max_price),
        (Some(min), Some(max)) if min > max
    ) {
        return Err(AppError::BadRequest(
            "min_price must not exceed max_price".to_string(),
        ));
    }

    Ok(SearchQuery {
        text: params.query.filter(|q| !q.trim().is_empty()),
        category_slug: params.category.filter(|c| !c.trim().is_empty()),
        min_price: params.min_price,
        max_price: params.max_price,
        limit: params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT),
    })
}

/// Show one product.
#[instrument(skip(state, id))]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ProductResponse>> {
    let Path(id) = id?;
    let product = state.commerce().get_product(ProductId::new(id)).await?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// List categories holding at least one product.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let categories = state.commerce().list_categories().await?;

    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_search_query_clamps_limit() {
        let query = search_query(SearchParams {
            limit: Some(500),
            ..SearchParams::default()
        })
        .unwrap();
        assert_eq!(query.limit, MAX_SEARCH_LIMIT);

        let query = search_query(SearchParams {
            limit: Some(0),
            ..SearchParams::default()
        })
        .unwrap();
        assert_eq!(query.limit, 1);

        let query = search_query(SearchParams::default()).unwrap();
        assert_eq!(query.limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_search_query_blank_text_is_absent() {
        let query = search_query(SearchParams {
            query: Some("  ".to_string()),
            category: Some(String::new()),
            ..SearchParams::default()
        })
        .unwrap();
        assert!(query.text.is_none());
        assert!(query.category_slug.is_none());
    }

    #[test]
    fn test_search_query_rejects_inverted_range() {
        let result = search_query(SearchParams {
            min_price: Some(Decimal::from(20)),
            max_price: Some(Decimal::from(10)),
            ..SearchParams::default()
        });
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
