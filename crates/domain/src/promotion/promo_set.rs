use cart_store::Cart;
use common::ArticleCode;
use serde::{Deserialize, Serialize};

use super::{Discount, MalformedPromotion};

/// A discount on part of a cart line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemDiscount {
    /// The line item the discount applies to.
    pub code: ArticleCode,

    /// The discount applied to each affected unit.
    pub discount: Discount,

    /// Number of units the discount applies to.
    pub affected_quantity: i64,
}

impl CartItemDiscount {
    /// Creates a new item discount.
    pub fn new(code: impl Into<ArticleCode>, discount: Discount, affected_quantity: i64) -> Self {
        Self {
            code: code.into(),
            discount,
            affected_quantity,
        }
    }
}

/// A gift added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPresent {
    /// The gifted article.
    pub code: ArticleCode,

    /// Number of gifted units.
    pub quantity: i64,
}

impl CartPresent {
    /// Creates a new present.
    pub fn new(code: impl Into<ArticleCode>, quantity: i64) -> Self {
        Self {
            code: code.into(),
            quantity,
        }
    }
}

/// A candidate promotion produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Promotion {
    ItemDiscount(CartItemDiscount),
    Present(CartPresent),
    SubtotalDiscount { discount: Discount },
    ShippingDiscount { discount: Discount },
}

/// Aggregated result of applying every promotion rule once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSet {
    /// Per-item discounts, in the order they were produced.
    pub item_discounts: Vec<CartItemDiscount>,

    /// Gifts, in the order they were produced.
    pub presents: Vec<CartPresent>,

    /// Discount on the whole cart subtotal. The last one produced wins.
    pub subtotal_discount: Option<Discount>,

    /// Discount on shipping. Consumed at checkout, not by cart pricing.
    pub shipping_discount: Option<Discount>,
}

impl PromoSet {
    /// Creates an empty promotion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no promotion was collected.
    pub fn is_empty(&self) -> bool {
        self.item_discounts.is_empty()
            && self.presents.is_empty()
            && self.subtotal_discount.is_none()
            && self.shipping_discount.is_none()
    }

    /// Returns the item discounts targeting an article.
    pub fn discounts_for<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a CartItemDiscount> + 'a {
        self.item_discounts
            .iter()
            .filter(move |d| d.code.as_str() == code)
    }

    /// Returns the total number of discounted units of an article.
    pub fn affected_quantity(&self, code: &str) -> i64 {
        self.discounts_for(code).map(|d| d.affected_quantity).sum()
    }

    /// Folds a promotion into the set after checking it against the cart.
    pub fn add(&mut self, promotion: Promotion, cart: &Cart) -> Result<(), MalformedPromotion> {
        match promotion {
            Promotion::ItemDiscount(discount) => {
                let Some(item) = cart.get_item(discount.code.as_str()) else {
                    return Err(MalformedPromotion::UnknownItem {
                        code: discount.code,
                    });
                };
                if discount.affected_quantity < 0 {
                    return Err(MalformedPromotion::NegativeAffectedQuantity {
                        code: discount.code,
                        affected: discount.affected_quantity,
                    });
                }
                if discount.affected_quantity > item.quantity {
                    return Err(MalformedPromotion::AffectedQuantityExceedsItem {
                        code: discount.code,
                        affected: discount.affected_quantity,
                        quantity: item.quantity,
                    });
                }
                self.item_discounts.push(discount);
            }
            Promotion::Present(present) => {
                if present.quantity <= 0 {
                    return Err(MalformedPromotion::NonPositivePresentQuantity {
                        code: present.code,
                        quantity: present.quantity,
                    });
                }
                self.presents.push(present);
            }
            Promotion::SubtotalDiscount { discount } => self.subtotal_discount = Some(discount),
            Promotion::ShippingDiscount { discount } => self.shipping_discount = Some(discount),
        }
        Ok(())
    }
}
