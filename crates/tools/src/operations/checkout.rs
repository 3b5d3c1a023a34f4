//! `proceed_to_checkout`.
//!
//! The prompt quotes the live cart, fetched during preparation, so the user
//! approves the amount that is actually in the cart.

use serde_json::json;

use super::cart_totals;
use crate::adapter::CommerceAdapter;
use crate::context::SessionContext;
use crate::dispatcher::Preparation;
use crate::error::InvocationError;
use crate::result::{ContentBlock, summary_with_payload};

pub(super) async fn prepare(
    commerce: &dyn CommerceAdapter,
    session: &SessionContext,
) -> Result<Preparation, InvocationError> {
    let cart = commerce.get_cart(session).await?;
    if cart.is_empty() {
        let content = summary_with_payload(
            "The cart is empty. Add products before proceeding to checkout.",
            &json!({ "cart": cart }),
        )?;
        return Ok(Preparation::Finished(content));
    }

    Ok(Preparation::prompt(format!(
        "Proceed to checkout to buy {}?",
        cart_totals(&cart)
    )))
}

pub(super) async fn proceed_to_checkout(
    commerce: &dyn CommerceAdapter,
    session: &SessionContext,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let cart = commerce.get_cart(session).await?;
    let checkout_url = commerce.checkout_url(session).await?;

    let summary = format!(
        "Checkout is ready ({}). Complete the purchase at {checkout_url}",
        cart_totals(&cart)
    );
    summary_with_payload(
        summary,
        &json!({ "checkout_url": checkout_url, "cart": cart }),
    )
}
