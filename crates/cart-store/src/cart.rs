//! Cart aggregate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ArticleCode, CartError, CartId, Version};

/// A line item of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The article this line refers to.
    pub code: ArticleCode,

    /// Number of units, always at least 1.
    pub quantity: i64,

    /// Insertion sequence number, used to keep line items in the order they
    /// were added regardless of map iteration order.
    seq: u64,
}

impl CartItem {
    /// Returns the insertion sequence number of this line.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Shopping cart aggregate root.
///
/// Invariants:
/// - the ID is strictly positive
/// - an article code appears at most once
/// - every line item quantity is at least 1
/// - `quantity()` is the sum of the line item quantities
///
/// `Clone` produces a fully independent copy; the store relies on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,

    /// Version of the stored copy this value was read from.
    #[serde(default)]
    version: Version,

    /// Last assigned insertion sequence number.
    last_seq: u64,

    /// Total quantity over all line items.
    quantity: i64,

    items: HashMap<ArticleCode, CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(id: CartId) -> Result<Self, CartError> {
        if !id.is_valid() {
            return Err(CartError::NonPositiveId(id));
        }

        Ok(Self {
            id,
            version: Version::initial(),
            last_seq: 0,
            quantity: 0,
            items: HashMap::new(),
        })
    }

    /// Returns the cart ID.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Returns the version of the stored copy this cart was read from.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version. Called by stores when saving or handing out copies.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns the total quantity over all line items.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> Vec<&CartItem> {
        let mut items: Vec<&CartItem> = self.items.values().collect();
        items.sort_by_key(|item| item.seq);
        items
    }

    /// Returns the article codes of the line items in insertion order.
    pub fn article_codes(&self) -> Vec<ArticleCode> {
        self.items().into_iter().map(|item| item.code.clone()).collect()
    }

    /// Returns a line item by article code.
    pub fn get_item(&self, code: &str) -> Option<&CartItem> {
        self.items.get(code)
    }

    /// Returns the number of distinct line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a new line item.
    ///
    /// Fails if the quantity is not positive, the article is already in the
    /// cart or the cart total would overflow. The cart is left untouched on
    /// failure.
    pub fn add_article(
        &mut self,
        code: impl Into<ArticleCode>,
        quantity: i64,
    ) -> Result<(), CartError> {
        let code = code.into();
        if quantity <= 0 {
            return Err(CartError::NonPositiveQuantity { quantity });
        }
        if self.items.contains_key(&code) {
            return Err(CartError::ItemAlreadyExists { code });
        }
        let total = self
            .quantity
            .checked_add(quantity)
            .ok_or(CartError::QuantityTooLarge { quantity })?;

        self.last_seq += 1;
        self.items.insert(
            code.clone(),
            CartItem {
                code,
                quantity,
                seq: self.last_seq,
            },
        );
        self.quantity = total;
        Ok(())
    }

    /// Replaces the quantity of an existing line item.
    ///
    /// Fails if the cart total would overflow; the cart is left untouched.
    pub fn set_quantity(&mut self, code: &str, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::NonPositiveQuantity { quantity });
        }
        let item = self
            .items
            .get_mut(code)
            .ok_or_else(|| CartError::ItemNotFound {
                code: ArticleCode::new(code),
            })?;

        let total = (self.quantity - item.quantity)
            .checked_add(quantity)
            .ok_or(CartError::QuantityTooLarge { quantity })?;

        self.quantity = total;
        item.quantity = quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cart() -> Cart {
        Cart::new(CartId::new(1)).unwrap()
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = new_cart();
        assert_eq!(cart.id(), CartId::new(1));
        assert_eq!(cart.quantity(), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.version(), Version::initial());
    }

    #[test]
    fn test_new_cart_rejects_non_positive_id() {
        assert_eq!(
            Cart::new(CartId::new(0)),
            Err(CartError::NonPositiveId(CartId::new(0)))
        );
        assert!(Cart::new(CartId::new(-3)).is_err());
    }

    #[test]
    fn test_add_article() {
        let mut cart = new_cart();
        cart.add_article("TSHIRT", 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity(), 3);
        assert_eq!(cart.get_item("TSHIRT").unwrap().quantity, 3);
    }

    #[test]
    fn test_add_article_non_positive_quantity_fails() {
        let mut cart = new_cart();
        for quantity in [0, -2] {
            let result = cart.add_article("TSHIRT", quantity);
            assert_eq!(result, Err(CartError::NonPositiveQuantity { quantity }));
        }
        assert!(cart.is_empty());
        assert_eq!(cart.quantity(), 0);
    }

    #[test]
    fn test_add_same_article_twice_fails() {
        let mut cart = new_cart();
        cart.add_article("MUG", 2).unwrap();

        let result = cart.add_article("MUG", 5);
        assert!(matches!(result, Err(CartError::ItemAlreadyExists { .. })));
        assert_eq!(cart.get_item("MUG").unwrap().quantity, 2);
        assert_eq!(cart.quantity(), 2);
    }

    #[test]
    fn test_set_quantity_adjusts_total() {
        let mut cart = new_cart();
        cart.add_article("VOUCHER", 1).unwrap();
        cart.add_article("TSHIRT", 4).unwrap();

        cart.set_quantity("VOUCHER", 3).unwrap();
        assert_eq!(cart.quantity(), 7);

        cart.set_quantity("TSHIRT", 1).unwrap();
        assert_eq!(cart.quantity(), 4);
    }

    #[test]
    fn test_set_quantity_on_missing_item_fails() {
        let mut cart = new_cart();
        let result = cart.set_quantity("MUG", 1);
        assert!(matches!(result, Err(CartError::ItemNotFound { .. })));
    }

    #[test]
    fn test_set_quantity_non_positive_fails() {
        let mut cart = new_cart();
        cart.add_article("MUG", 2).unwrap();

        let result = cart.set_quantity("MUG", 0);
        assert!(matches!(result, Err(CartError::NonPositiveQuantity { .. })));
        assert_eq!(cart.get_item("MUG").unwrap().quantity, 2);
    }

    #[test]
    fn test_total_quantity_overflow_is_rejected() {
        let mut cart = new_cart();
        cart.add_article("MUG", i64::MAX).unwrap();

        let result = cart.add_article("TSHIRT", 1);
        assert_eq!(result, Err(CartError::QuantityTooLarge { quantity: 1 }));
        assert!(cart.get_item("TSHIRT").is_none());
        assert_eq!(cart.quantity(), i64::MAX);

        cart.set_quantity("MUG", 1).unwrap();
        cart.add_article("TSHIRT", 5).unwrap();
        let result = cart.set_quantity("MUG", i64::MAX);
        assert!(matches!(result, Err(CartError::QuantityTooLarge { .. })));
        assert_eq!(cart.get_item("MUG").unwrap().quantity, 1);
        assert_eq!(cart.quantity(), 6);

        // replacing the only big line is fine
        cart.set_quantity("TSHIRT", i64::MAX - 1).unwrap();
        assert_eq!(cart.quantity(), i64::MAX);
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut cart = new_cart();
        let codes = ["ZEBRA", "APPLE", "MUG", "BANANA", "TSHIRT", "VOUCHER"];
        for code in codes {
            cart.add_article(code, 1).unwrap();
        }
        cart.set_quantity("APPLE", 9).unwrap();

        let listed: Vec<&str> = cart.items().iter().map(|i| i.code.as_str()).collect();
        assert_eq!(listed, codes);
        assert_eq!(
            cart.article_codes(),
            codes.iter().map(|c| ArticleCode::new(*c)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = new_cart();
        original.add_article("MUG", 1).unwrap();

        let mut copy = original.clone();
        copy.set_quantity("MUG", 5).unwrap();
        copy.add_article("TSHIRT", 1).unwrap();

        assert_eq!(original.quantity(), 1);
        assert!(original.get_item("TSHIRT").is_none());
        assert_ne!(original, copy);
    }

    #[test]
    fn test_serialization() {
        let mut cart = new_cart();
        cart.add_article("TSHIRT", 2).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let deserialized: Cart = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, cart);
    }
}
