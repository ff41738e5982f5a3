//! HTTP API server with observability for the shopping cart service.
//!
//! Provides REST endpoints for carts and the catalog, with conditional
//! requests backed by the entity-tag cache, structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use cart_store::InMemoryCartStore;
use domain::promotion::rules::register_reference_rules;
use domain::{
    Article, CartService, Catalog, InMemoryCatalog, Money, PromotionEngine, SequentialIdGenerator,
};
use etag_cache::{EtagCache, InMemoryEtagCache, NoopEtagCache};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;
use routes::carts::CartResponse;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/articles", get(routes::articles::list))
        .route("/carts", post(routes::carts::create))
        .route(
            "/carts/{id}",
            get(routes::carts::get).delete(routes::carts::delete),
        )
        .route(
            "/carts/{id}/items",
            post(routes::carts::add_item).put(routes::carts::set_item_quantity),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the catalog articles offered at startup.
pub fn default_articles(company_name: &str) -> Vec<Article> {
    vec![
        Article::new(
            "VOUCHER",
            format!("{company_name} Voucher"),
            Money::from_cents(500),
        ),
        Article::new(
            "TSHIRT",
            format!("{company_name} T-Shirt"),
            Money::from_cents(2000),
        ),
        Article::new(
            "MUG",
            format!("{company_name} Coffee Mug"),
            Money::from_cents(750),
        ),
    ]
}

/// Creates the default application state: in-memory store and cache, the
/// provisioned catalog and the reference promotion rules. The entity-tag
/// cache is replaced by a no-op cache when disabled in the config.
pub fn create_default_state(config: Config) -> Arc<AppState> {
    let catalog = InMemoryCatalog::new();
    for article in default_articles(&config.company_name) {
        if !catalog.add_article(article) {
            tracing::warn!("duplicate article in default catalog");
        }
    }

    let promotions = PromotionEngine::new();
    let rule_ids = register_reference_rules(&promotions);
    tracing::info!(
        articles = catalog.len(),
        rules = rule_ids.len(),
        "catalog and promotion rules provisioned"
    );

    let service = CartService::new(
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(InMemoryCartStore::new()),
        Arc::new(catalog),
        Arc::new(promotions),
    );

    let cache: Arc<dyn EtagCache<CartResponse>> = if config.etag_cache {
        Arc::new(InMemoryEtagCache::<CartResponse>::new())
    } else {
        tracing::info!("entity-tag cache disabled");
        Arc::new(NoopEtagCache::<CartResponse>::new())
    };

    Arc::new(AppState {
        service,
        cache,
        config,
    })
}
