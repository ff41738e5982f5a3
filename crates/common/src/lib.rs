//! Shared identity types for the shopping cart service.

pub mod types;

pub use types::{ArticleCode, CartId};
