//! Promotion engine, promotion values and the reference rules.

mod discount;
mod engine;
mod promo_set;
pub mod rules;

pub use discount::Discount;
pub use engine::{PromotionEngine, PromotionRule, RuleId};
pub use promo_set::{CartItemDiscount, CartPresent, PromoSet, Promotion};

use common::ArticleCode;
use thiserror::Error;

/// Errors that can occur while applying promotion rules.
///
/// These indicate a defect in a registered rule, not bad client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
    /// A rule produced a promotion that is inconsistent with the cart.
    #[error("Rule {rule_id} ({rule}) produced a malformed promotion: {reason}")]
    Malformed {
        rule_id: RuleId,
        rule: String,
        reason: MalformedPromotion,
    },
}

/// Why a promotion was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPromotion {
    /// The discount targets an article that is not in the cart.
    #[error("discount targets {code}, which is not in the cart")]
    UnknownItem { code: ArticleCode },

    /// The discount affects more units than the line item holds.
    #[error("discount affects {affected} units of {code}, but the cart holds {quantity}")]
    AffectedQuantityExceedsItem {
        code: ArticleCode,
        affected: i64,
        quantity: i64,
    },

    /// The discount affects a negative number of units.
    #[error("discount affects a negative number of units ({affected}) of {code}")]
    NegativeAffectedQuantity { code: ArticleCode, affected: i64 },

    /// A present must add at least one unit.
    #[error("present {code} has non-positive quantity {quantity}")]
    NonPositivePresentQuantity { code: ArticleCode, quantity: i64 },
}
