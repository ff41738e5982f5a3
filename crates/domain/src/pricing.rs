//! Priced view of a cart.
//!
//! A priced cart is derived data: it is rebuilt from the cart, the current
//! prices and a freshly computed promotion set every time it is requested.

use cart_store::Cart;
use common::{ArticleCode, CartId};
use serde::Serialize;

use crate::promotion::PromoSet;
use crate::{Money, PriceList};

/// A priced line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedItem {
    pub code: ArticleCode,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    /// True for lines added by a present promotion.
    pub gift: bool,
}

/// A cart with unit prices, line totals and subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedCart {
    cart_id: CartId,
    quantity: i64,
    subtotal: Money,
    items: Vec<PricedItem>,
}

impl PricedCart {
    /// Prices a cart without promotions.
    ///
    /// Lines keep the cart's insertion order. An article missing from the
    /// price list is priced at zero.
    pub fn new(cart: &Cart, prices: &PriceList) -> Self {
        let items: Vec<PricedItem> = cart
            .items()
            .into_iter()
            .map(|item| {
                let unit_price = prices
                    .get(&item.code)
                    .copied()
                    .unwrap_or_else(Money::zero);
                PricedItem {
                    code: item.code.clone(),
                    quantity: item.quantity,
                    unit_price,
                    total_price: unit_price.multiply(item.quantity),
                    gift: false,
                }
            })
            .collect();

        Self {
            cart_id: cart.id(),
            quantity: cart.quantity(),
            subtotal: items.iter().map(|i| i.total_price).sum(),
            items,
        }
    }

    /// Prices a cart and applies a promotion set in one step.
    pub fn price(cart: &Cart, prices: &PriceList, promotions: &PromoSet) -> Self {
        Self::new(cart, prices).apply_promotions(promotions)
    }

    /// Applies a promotion set.
    ///
    /// Each item discount reprices its affected units from the list unit
    /// price: `unit * (quantity - affected) + discounted_unit * affected`.
    /// When several discounts target the same article, they are applied in
    /// promotion set order and the last one determines the line total.
    /// Presents become extra zero-priced gift lines. The subtotal discount,
    /// if any, is then applied to the whole subtotal.
    pub fn apply_promotions(mut self, promotions: &PromoSet) -> Self {
        for discount in &promotions.item_discounts {
            let Some(item) = self
                .items
                .iter_mut()
                .find(|i| !i.gift && i.code == discount.code)
            else {
                continue;
            };
            let affected = discount.affected_quantity;
            let discounted_unit = discount.discount.apply_to(item.unit_price);
            item.total_price = item.unit_price.multiply(item.quantity.saturating_sub(affected))
                + discounted_unit.multiply(affected);
        }

        for present in &promotions.presents {
            self.items.push(PricedItem {
                code: present.code.clone(),
                quantity: present.quantity,
                unit_price: Money::zero(),
                total_price: Money::zero(),
                gift: true,
            });
        }

        let subtotal: Money = self.items.iter().map(|i| i.total_price).sum();
        self.subtotal = match promotions.subtotal_discount {
            Some(discount) => discount.apply_to(subtotal),
            None => subtotal,
        };
        self
    }

    /// Returns the ID of the priced cart.
    pub fn cart_id(&self) -> CartId {
        self.cart_id
    }

    /// Returns the cart quantity. Gift lines are not counted.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Returns the subtotal after promotions.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Returns the priced lines.
    pub fn items(&self) -> &[PricedItem] {
        &self.items
    }

    /// Returns the priced line of an article, ignoring gift lines.
    pub fn item(&self, code: &str) -> Option<&PricedItem> {
        self.items
            .iter()
            .find(|i| !i.gift && i.code.as_str() == code)
    }
}
