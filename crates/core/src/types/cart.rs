//! Cart types.
//!
//! Cart identity is owned by the session layer; these types only describe the
//! contents a cart store hands back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{LineKey, ProductId};
use super::price::{CurrencyCode, format_amount};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Identifier of this line within the cart (distinct from the product id).
    pub line_key: LineKey,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub image: Option<String>,
}

/// Snapshot of a cart's contents and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
    pub total: Decimal,
    /// Sum of line quantities.
    pub item_count: u64,
    pub currency: CurrencyCode,
    pub currency_symbol: String,
}

impl Cart {
    /// An empty cart in the given currency.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
            item_count: 0,
            currency,
            currency_symbol: currency.symbol().to_string(),
        }
    }

    /// Build a cart snapshot from its lines, computing totals.
    ///
    /// Returns `None` when the subtotal does not fit in a [`Decimal`].
    #[must_use]
    pub fn from_lines(items: Vec<CartLine>, currency: CurrencyCode) -> Option<Self> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total))?;
        let item_count = items.iter().map(|line| u64::from(line.quantity)).sum();
        Some(Self {
            items,
            subtotal,
            total: subtotal,
            item_count,
            currency,
            currency_symbol: currency.symbol().to_string(),
        })
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Find a line by its key.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.items.iter().find(|line| &line.line_key == key)
    }

    /// Format an amount in this cart's currency (e.g., "$19.99").
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format_amount(amount, self.currency)
    }
}
