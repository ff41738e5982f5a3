//! Application service error types.

use cart_store::{CartError, StoreError};
use common::{ArticleCode, CartId};
use thiserror::Error;

use crate::promotion::PromotionError;

/// Errors returned by the cart application service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A collaborator of the service was never bound.
    #[error("Cart service is not initialized")]
    NotInitialized,

    /// The ID generator produced an unusable cart ID.
    #[error("Could not create cart with ID {0}")]
    CartCreation(CartId),

    /// No cart is stored under the ID.
    #[error("Cart not found: {0}")]
    CartNotFound(CartId),

    /// The catalog has no article with the code.
    #[error("Article not found: {0}")]
    ArticleNotFound(ArticleCode),

    /// The article is already a line item of the cart.
    #[error("Article already added to cart: {0}")]
    ArticleAlreadyAdded(ArticleCode),

    /// The article is not a line item of the cart.
    #[error("Article not in cart: {0}")]
    ArticleNotInCart(ArticleCode),

    /// Quantities must be strictly positive.
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),

    /// The quantity would overflow the cart total.
    #[error("Quantity too large: {0}")]
    QuantityTooLarge(i64),

    /// The cart changed concurrently since it was read.
    #[error("Conflict: {0}")]
    Conflict(#[from] StoreError),

    /// A promotion rule misbehaved.
    #[error("Promotion rules failed: {0}")]
    PromoRules(#[from] PromotionError),
}

impl From<CartError> for ServiceError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::NonPositiveId(id) => ServiceError::CartCreation(id),
            CartError::NonPositiveQuantity { quantity } => {
                ServiceError::NonPositiveQuantity(quantity)
            }
            CartError::QuantityTooLarge { quantity } => ServiceError::QuantityTooLarge(quantity),
            CartError::ItemAlreadyExists { code } => ServiceError::ArticleAlreadyAdded(code),
            CartError::ItemNotFound { code } => ServiceError::ArticleNotInCart(code),
        }
    }
}

impl ServiceError {
    /// Returns true for failures caused by client input rather than by the
    /// service or its collaborators.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ServiceError::NotInitialized | ServiceError::CartCreation(_) | ServiceError::PromoRules(_)
        )
    }
}

/// Result type for application service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
