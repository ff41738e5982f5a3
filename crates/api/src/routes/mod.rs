//! HTTP route handlers.

pub mod articles;
pub mod carts;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use domain::CartService;
use etag_cache::EtagCache;

use crate::config::Config;
use carts::CartResponse;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: CartService,
    pub cache: Arc<dyn EtagCache<CartResponse>>,
    pub config: Config,
}
