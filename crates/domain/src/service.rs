//! Cart application service.
//!
//! Orchestrates the cart store, the catalog and the promotion engine. Every
//! use case reads a copy of the cart, works on it and writes it back with an
//! optimistic version check, so concurrent writers to one cart surface as
//! `ServiceError::Conflict` instead of silently overwriting each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use cart_store::{Cart, CartItem, CartStore, CartStoreExt, SaveOptions};
use common::CartId;

use crate::catalog::{Article, Catalog};
use crate::error::{Result, ServiceError};
use crate::pricing::PricedCart;
use crate::promotion::PromotionEngine;

/// Source of cart IDs.
///
/// IDs are expected to be strictly positive and unique within the process
/// lifetime. The service rejects non-positive IDs but does not check
/// uniqueness beyond the store's own version check.
pub trait IdGenerator: Send + Sync {
    /// Returns the next cart ID.
    fn next_id(&self) -> CartId;
}

/// Atomic counter starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicI64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose first ID is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a generator whose first ID is `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> CartId {
        CartId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> CartId + Send + Sync,
{
    fn next_id(&self) -> CartId {
        self()
    }
}

/// Borrowed view of a fully bound service.
struct Ready<'a> {
    ids: &'a dyn IdGenerator,
    store: &'a dyn CartStore,
    catalog: &'a dyn Catalog,
    promotions: &'a PromotionEngine,
}

/// Builder for [`CartService`].
///
/// Any collaborator may be left unbound; the resulting service then fails
/// every use case with `NotInitialized`.
#[derive(Default)]
pub struct CartServiceBuilder {
    id_generator: Option<Arc<dyn IdGenerator>>,
    store: Option<Arc<dyn CartStore>>,
    catalog: Option<Arc<dyn Catalog>>,
    promotions: Option<Arc<PromotionEngine>>,
}

impl CartServiceBuilder {
    /// Binds the ID generator.
    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Binds the cart store.
    pub fn store(mut self, store: Arc<dyn CartStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Binds the catalog.
    pub fn catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Binds the promotion engine.
    pub fn promotions(mut self, promotions: Arc<PromotionEngine>) -> Self {
        self.promotions = Some(promotions);
        self
    }

    /// Builds the service.
    pub fn build(self) -> CartService {
        CartService {
            id_generator: self.id_generator,
            store: self.store,
            catalog: self.catalog,
            promotions: self.promotions,
        }
    }
}

/// Service for managing carts.
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct CartService {
    id_generator: Option<Arc<dyn IdGenerator>>,
    store: Option<Arc<dyn CartStore>>,
    catalog: Option<Arc<dyn Catalog>>,
    promotions: Option<Arc<PromotionEngine>>,
}

impl CartService {
    /// Creates a service with every collaborator bound.
    pub fn new(
        id_generator: Arc<dyn IdGenerator>,
        store: Arc<dyn CartStore>,
        catalog: Arc<dyn Catalog>,
        promotions: Arc<PromotionEngine>,
    ) -> Self {
        Self::builder()
            .id_generator(id_generator)
            .store(store)
            .catalog(catalog)
            .promotions(promotions)
            .build()
    }

    /// Returns a builder with no collaborator bound.
    pub fn builder() -> CartServiceBuilder {
        CartServiceBuilder::default()
    }

    /// Returns true if every collaborator is bound.
    pub fn is_ready(&self) -> bool {
        self.ready().is_ok()
    }

    /// Returns the promotion engine, if bound.
    pub fn promotions(&self) -> Option<&Arc<PromotionEngine>> {
        self.promotions.as_ref()
    }

    fn ready(&self) -> Result<Ready<'_>> {
        match (
            &self.id_generator,
            &self.store,
            &self.catalog,
            &self.promotions,
        ) {
            (Some(ids), Some(store), Some(catalog), Some(promotions)) => Ok(Ready {
                ids: ids.as_ref(),
                store: store.as_ref(),
                catalog: catalog.as_ref(),
                promotions: promotions.as_ref(),
            }),
            _ => Err(ServiceError::NotInitialized),
        }
    }

    fn load(store: &dyn CartStore, cart_id: CartId) -> Result<Cart> {
        store
            .get(cart_id)
            .ok_or(ServiceError::CartNotFound(cart_id))
    }

    /// Creates an empty cart and returns its ID.
    #[tracing::instrument(skip(self))]
    pub fn create_cart(&self) -> Result<CartId> {
        let ready = self.ready()?;
        let cart_id = ready.ids.next_id();
        let cart = Cart::new(cart_id)?;

        ready.store.save(&cart, SaveOptions::expect_new())?;

        metrics::counter!("carts_created_total").increment(1);
        tracing::info!(%cart_id, "cart created");
        Ok(cart_id)
    }

    /// Adds an article to a cart and returns the new line item.
    #[tracing::instrument(skip(self))]
    pub fn add_article_to_cart(
        &self,
        cart_id: CartId,
        code: &str,
        quantity: i64,
    ) -> Result<CartItem> {
        let ready = self.ready()?;
        let mut cart = Self::load(ready.store, cart_id)?;
        let article = ready
            .catalog
            .get_article(code)
            .ok_or_else(|| ServiceError::ArticleNotFound(code.into()))?;

        cart.add_article(article.code.clone(), quantity)?;
        ready.store.save_if_unchanged(&cart)?;

        metrics::counter!("cart_items_added_total").increment(1);
        tracing::debug!(%cart_id, article = %article.code, quantity, "article added");

        cart.get_item(article.code.as_str())
            .cloned()
            .ok_or(ServiceError::ArticleNotInCart(article.code))
    }

    /// Replaces the quantity of a line item and returns the updated item.
    #[tracing::instrument(skip(self))]
    pub fn set_article_quantity(
        &self,
        cart_id: CartId,
        code: &str,
        quantity: i64,
    ) -> Result<CartItem> {
        let ready = self.ready()?;
        let mut cart = Self::load(ready.store, cart_id)?;

        cart.set_quantity(code, quantity)?;
        ready.store.save_if_unchanged(&cart)?;

        metrics::counter!("cart_items_updated_total").increment(1);
        tracing::debug!(%cart_id, article = code, quantity, "article quantity set");

        cart.get_item(code)
            .cloned()
            .ok_or_else(|| ServiceError::ArticleNotInCart(code.into()))
    }

    /// Returns the cart priced with the current catalog prices and
    /// promotions.
    #[tracing::instrument(skip(self))]
    pub fn get_cart(&self, cart_id: CartId) -> Result<PricedCart> {
        let ready = self.ready()?;
        let cart = Self::load(ready.store, cart_id)?;

        let prices = ready.catalog.get_prices(&cart.article_codes());
        let promotions = ready.promotions.apply_rules(&cart, &prices)?;

        Ok(PricedCart::price(&cart, &prices, &promotions))
    }

    /// Deletes a cart. Deleting a missing cart is not an error.
    ///
    /// Returns whether a cart was removed.
    #[tracing::instrument(skip(self))]
    pub fn delete_cart(&self, cart_id: CartId) -> Result<bool> {
        let ready = self.ready()?;
        let removed = ready.store.delete(cart_id);

        if removed {
            metrics::counter!("carts_deleted_total").increment(1);
            tracing::info!(%cart_id, "cart deleted");
        } else {
            tracing::debug!(%cart_id, "cart already absent");
        }
        Ok(removed)
    }

    /// Lists the catalog, sorted by article code.
    pub fn articles(&self) -> Result<Vec<Article>> {
        Ok(self.ready()?.catalog.articles())
    }
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("id_generator", &self.id_generator.is_some())
            .field("store", &self.store.is_some())
            .field("catalog", &self.catalog.is_some())
            .field("promotions", &self.promotions)
            .finish()
    }
}
