use serde::{Deserialize, Serialize};

use crate::Money;

/// A price reduction.
///
/// Applying a discount never clamps: an amount larger than the price or a
/// percentage above 100 yields a negative price, and that is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "kebab-case")]
pub enum Discount {
    /// Leaves the price unchanged.
    #[default]
    None,

    /// Removes a whole percentage of the price.
    Percentage(i64),

    /// Subtracts a fixed amount from the price.
    Amount(Money),

    /// Replaces the price.
    NewValue(Money),
}

impl Discount {
    /// Returns the discounted price.
    pub fn apply_to(&self, price: Money) -> Money {
        match *self {
            Discount::None => price,
            Discount::NewValue(value) => value,
            Discount::Amount(value) => price - value,
            Discount::Percentage(percent) => price.percent_of(100i64.saturating_sub(percent)),
        }
    }
}
