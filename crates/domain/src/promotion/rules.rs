//! Reference promotion rules.

use cart_store::Cart;
use common::ArticleCode;

use super::{CartItemDiscount, Discount, Promotion, PromotionEngine, PromotionRule, RuleId};
use crate::{Money, PriceList};

/// Buy two, get one free: every second unit of the article is free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoForOne {
    /// The promoted article.
    pub code: ArticleCode,
}

impl TwoForOne {
    /// Creates the rule for an article.
    pub fn new(code: impl Into<ArticleCode>) -> Self {
        Self { code: code.into() }
    }
}

impl Default for TwoForOne {
    fn default() -> Self {
        Self::new("VOUCHER")
    }
}

impl PromotionRule for TwoForOne {
    fn name(&self) -> &str {
        "two-for-one"
    }

    fn evaluate(&self, cart: &Cart, _prices: &PriceList) -> Vec<Promotion> {
        cart.items()
            .into_iter()
            .filter(|item| item.code == self.code && item.quantity >= 2)
            .map(|item| {
                Promotion::ItemDiscount(CartItemDiscount::new(
                    item.code.clone(),
                    Discount::Percentage(100),
                    item.quantity / 2,
                ))
            })
            .collect()
    }
}

/// Volume discount: from a minimum quantity on, every unit of the article is
/// repriced to a fixed unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDiscount {
    /// The promoted article.
    pub code: ArticleCode,

    /// Quantity from which the discount applies.
    pub min_quantity: i64,

    /// Reduced unit price.
    pub unit_price: Money,
}

impl BulkDiscount {
    /// Creates the rule for an article.
    pub fn new(code: impl Into<ArticleCode>, min_quantity: i64, unit_price: Money) -> Self {
        Self {
            code: code.into(),
            min_quantity,
            unit_price,
        }
    }
}

impl Default for BulkDiscount {
    fn default() -> Self {
        Self::new("TSHIRT", 3, Money::from_units(19))
    }
}

impl PromotionRule for BulkDiscount {
    fn name(&self) -> &str {
        "bulk-discount"
    }

    fn evaluate(&self, cart: &Cart, _prices: &PriceList) -> Vec<Promotion> {
        cart.items()
            .into_iter()
            .filter(|item| item.code == self.code && item.quantity >= self.min_quantity)
            .map(|item| {
                Promotion::ItemDiscount(CartItemDiscount::new(
                    item.code.clone(),
                    Discount::NewValue(self.unit_price),
                    item.quantity,
                ))
            })
            .collect()
    }
}

/// Registers the default two-for-one and bulk discount rules.
pub fn register_reference_rules(engine: &PromotionEngine) -> [RuleId; 2] {
    [
        engine.add_rule(TwoForOne::default()),
        engine.add_rule(BulkDiscount::default()),
    ]
}
