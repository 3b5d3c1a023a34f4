//! Cart operations: `add_to_cart`, `get_cart`, `update_cart_item`,
//! `remove_from_cart`.
//!
//! Mutations look up their target during preparation so that a missing
//! product or line fails before the user is asked anything.

use std::fmt::Write as _;

use serde_json::json;
use webmcp_core::{Cart, CartLine};

use super::{cart_totals, line_key, product_id};
use crate::adapter::CommerceAdapter;
use crate::context::SessionContext;
use crate::dispatcher::Preparation;
use crate::error::{CommerceError, InvocationError};
use crate::result::{ContentBlock, summary_with_payload};
use crate::schema::Arguments;

// =============================================================================
// add_to_cart
// =============================================================================

pub(super) async fn prepare_add(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
) -> Result<Preparation, InvocationError> {
    let product = commerce.get_product(product_id(arguments)?).await?;
    let quantity = arguments.require_u32("quantity")?;
    Ok(Preparation::prompt(format!(
        "Add {quantity} x \"{}\" to the cart for {} each?",
        product.name, product.price
    )))
}

pub(super) async fn add_to_cart(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
    session: &SessionContext,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let product_id = product_id(arguments)?;
    let quantity = arguments.require_u32("quantity")?;

    let key = commerce.add_to_cart(session, product_id, quantity).await?;
    let cart = commerce.get_cart(session).await?;

    let message = "Product added to cart";
    let summary = format!("{message}.\n\nCart: {}", cart_totals(&cart));
    summary_with_payload(
        summary,
        &json!({ "message": message, "cart_item_key": key, "cart": cart }),
    )
}

// =============================================================================
// get_cart
// =============================================================================

pub(super) async fn get_cart(
    commerce: &dyn CommerceAdapter,
    session: &SessionContext,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let cart = commerce.get_cart(session).await?;
    summary_with_payload(cart_listing(&cart), &json!({ "cart": cart }))
}

fn cart_listing(cart: &Cart) -> String {
    if cart.is_empty() {
        return "The cart is empty.".to_string();
    }

    let mut text = String::from("Shopping cart:\n");
    for line in &cart.items {
        let _ = write!(
            text,
            "\n- {} x{} = {} (key: {})",
            line.name,
            line.quantity,
            cart.format(line.line_total),
            line.line_key
        );
    }
    let _ = write!(
        text,
        "\n\nSubtotal: {}\nTotal: {}",
        cart.format(cart.subtotal),
        cart.format(cart.total)
    );
    text
}

// =============================================================================
// update_cart_item
// =============================================================================

pub(super) async fn prepare_update(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
    session: &SessionContext,
) -> Result<Preparation, InvocationError> {
    let line = existing_line(commerce, arguments, session).await?;
    let quantity = arguments.require_u32("quantity")?;

    let prompt = if quantity == 0 {
        format!("Remove \"{}\" from the cart?", line.name)
    } else {
        format!(
            "Change the quantity of \"{}\" from {} to {quantity}?",
            line.name, line.quantity
        )
    };
    Ok(Preparation::prompt(prompt))
}

pub(super) async fn update_cart_item(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
    session: &SessionContext,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let key = line_key(arguments)?;
    let quantity = arguments.require_u32("quantity")?;

    if !commerce.set_line_quantity(session, &key, quantity).await? {
        return Err(CommerceError::cart_item_not_found(&key).into());
    }
    let cart = commerce.get_cart(session).await?;

    let message = if quantity == 0 {
        "Product removed from cart"
    } else {
        "Cart updated"
    };
    let summary = format!("{message}.\n\nCart: {}", cart_totals(&cart));
    summary_with_payload(summary, &json!({ "message": message, "cart": cart }))
}

// =============================================================================
// remove_from_cart
// =============================================================================

pub(super) async fn prepare_remove(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
    session: &SessionContext,
) -> Result<Preparation, InvocationError> {
    let line = existing_line(commerce, arguments, session).await?;
    Ok(Preparation::prompt(format!(
        "Remove \"{}\" (x{}) from the cart?",
        line.name, line.quantity
    )))
}

pub(super) async fn remove_from_cart(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
    session: &SessionContext,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let key = line_key(arguments)?;

    if !commerce.remove_line(session, &key).await? {
        return Err(CommerceError::cart_item_not_found(&key).into());
    }
    let cart = commerce.get_cart(session).await?;

    let message = "Product removed from cart";
    let summary = format!("{message}.\n\nCart: {}", cart_totals(&cart));
    summary_with_payload(summary, &json!({ "message": message, "cart": cart }))
}

/// The cart line named by `cart_item_key`, or `NotFound`.
async fn existing_line(
    commerce: &dyn CommerceAdapter,
    arguments: &Arguments,
    session: &SessionContext,
) -> Result<CartLine, InvocationError> {
    let key = line_key(arguments)?;
    let cart = commerce.get_cart(session).await?;
    cart.line(&key)
        .cloned()
        .ok_or_else(|| CommerceError::cart_item_not_found(&key).into())
}
