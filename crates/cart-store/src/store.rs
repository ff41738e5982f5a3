use crate::{Cart, CartId, Result, Version};

/// Options for saving a cart.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Expected stored version for optimistic concurrency control.
    /// If None, the save always succeeds and the last writer wins.
    pub expected_version: Option<Version>,
}

impl SaveOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the stored cart to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the cart not to be stored yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Keyed repository of carts.
///
/// Implementations must hand out independent copies from `get` and store
/// independent copies in `save`: holders of a `Cart` never observe or cause
/// mutation of the stored value. All implementations must be thread-safe.
pub trait CartStore: Send + Sync {
    /// Returns a copy of the stored cart, or None if there is no such cart.
    fn get(&self, id: CartId) -> Option<Cart>;

    /// Stores a copy of the cart, replacing any previous version.
    ///
    /// If `options.expected_version` is set, the save fails with
    /// `ConcurrencyConflict` when the stored version differs.
    ///
    /// Returns the new stored version.
    fn save(&self, cart: &Cart, options: SaveOptions) -> Result<Version>;

    /// Removes a cart. Returns whether a cart was removed.
    fn delete(&self, id: CartId) -> bool;
}

/// Extension trait providing convenience methods for cart stores.
pub trait CartStoreExt: CartStore {
    /// Checks if a cart is stored.
    fn contains(&self, id: CartId) -> bool {
        self.get(id).is_some()
    }

    /// Saves a cart expecting it to be unchanged since it was read.
    fn save_if_unchanged(&self, cart: &Cart) -> Result<Version> {
        self.save(cart, SaveOptions::expect_version(cart.version()))
    }
}

impl<T: CartStore + ?Sized> CartStoreExt for T {}
