//! Cart aggregate and the concurrent cart store.
//!
//! The store is the sole long-lived owner of cart state. Every read hands out
//! an independent copy and every save stores an independent copy, so callers
//! never share mutable state with the store or with each other.

pub mod cart;
pub mod error;
pub mod memory;
pub mod store;
pub mod version;

pub use cart::{Cart, CartItem};
pub use common::{ArticleCode, CartId};
pub use error::{CartError, Result, StoreError};
pub use memory::InMemoryCartStore;
pub use store::{CartStore, CartStoreExt, SaveOptions};
pub use version::Version;
