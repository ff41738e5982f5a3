use thiserror::Error;

use crate::{ArticleCode, CartId, Version};

/// Invariant violations raised by the cart aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Cart IDs must be strictly positive.
    #[error("Cart ID must be positive, got {0}")]
    NonPositiveId(CartId),

    /// Line item quantities must be strictly positive.
    #[error("Quantity must be positive, got {quantity}")]
    NonPositiveQuantity { quantity: i64 },

    /// The cart's total quantity would no longer fit in an `i64`.
    #[error("Quantity too large: adding {quantity} overflows the cart total")]
    QuantityTooLarge { quantity: i64 },

    /// The article is already a line item of the cart.
    #[error("Item already exists: {code}")]
    ItemAlreadyExists { code: ArticleCode },

    /// The article is not a line item of the cart.
    #[error("Item not found: {code}")]
    ItemNotFound { code: ArticleCode },
}

/// Errors that can occur when interacting with the cart store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The stored cart changed since the caller read it.
    #[error(
        "Concurrency conflict for cart {cart_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        cart_id: CartId,
        expected: Version,
        actual: Version,
    },
}

/// Result type for cart store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
