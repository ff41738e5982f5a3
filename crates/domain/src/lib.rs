//! Domain layer for the shopping cart service.
//!
//! This crate provides:
//! - the article catalog and price lists
//! - the promotion engine, promotion values and the reference rules
//! - the pricing pipeline turning a cart into a priced cart
//! - the cart application service orchestrating store, catalog and engine

pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod promotion;
pub mod service;

pub use catalog::{Article, Catalog, InMemoryCatalog, PriceList};
pub use error::ServiceError;
pub use money::Money;
pub use pricing::{PricedCart, PricedItem};
pub use promotion::{
    CartItemDiscount, CartPresent, Discount, MalformedPromotion, PromoSet, Promotion,
    PromotionEngine, PromotionError, PromotionRule, RuleId,
};
pub use service::{CartService, CartServiceBuilder, IdGenerator, SequentialIdGenerator};
