use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    Cart, CartId, Result, StoreError, Version,
    store::{CartStore, SaveOptions},
};

/// In-memory cart store.
///
/// A single reader-writer lock guards the backing map: reads proceed
/// concurrently, saves and deletes are exclusive. Cloning the store shares
/// the same backing map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CartId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored carts.
    pub fn len(&self) -> usize {
        self.carts.read().len()
    }

    /// Returns true if no cart is stored.
    pub fn is_empty(&self) -> bool {
        self.carts.read().is_empty()
    }
}

impl CartStore for InMemoryCartStore {
    fn get(&self, id: CartId) -> Option<Cart> {
        self.carts.read().get(&id).cloned()
    }

    fn save(&self, cart: &Cart, options: SaveOptions) -> Result<Version> {
        let cart_id = cart.id();
        let mut carts = self.carts.write();

        let current_version = carts
            .get(&cart_id)
            .map(Cart::version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            tracing::debug!(%cart_id, %expected, actual = %current_version, "cart save rejected");
            return Err(StoreError::ConcurrencyConflict {
                cart_id,
                expected,
                actual: current_version,
            });
        }

        let new_version = current_version.next();
        let mut stored = cart.clone();
        stored.set_version(new_version);
        carts.insert(cart_id, stored);

        Ok(new_version)
    }

    fn delete(&self, id: CartId) -> bool {
        self.carts.write().remove(&id).is_some()
    }
}
