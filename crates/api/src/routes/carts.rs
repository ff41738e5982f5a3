//! Cart resource endpoints with entity-tag based conditional requests.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::{ETAG, IF_MATCH, IF_NONE_MATCH, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cart_store::CartItem;
use common::CartId;
use domain::{PricedCart, PricedItem};
use etag_cache::{EntityTag, Tagged};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiError;

/// Kind prefix of cart entity tags.
const CART_KIND: &str = "cart";

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub code: String,
    pub quantity: i64,
}

// -- Response types --

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartResponse {
    pub id: String,
    pub subtotal_cents: i64,
    pub quantity: i64,
    pub items: Vec<CartItemResponse>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemResponse {
    pub code: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub gift: bool,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub code: String,
    pub quantity: i64,
    pub cart_url: String,
}

impl CartResponse {
    fn from_priced(cart: &PricedCart, url: String) -> Self {
        Self {
            id: cart.cart_id().to_string(),
            subtotal_cents: cart.subtotal().cents(),
            quantity: cart.quantity(),
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            url,
        }
    }
}

impl From<&PricedItem> for CartItemResponse {
    fn from(item: &PricedItem) -> Self {
        Self {
            code: item.code.to_string(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            total_price_cents: item.total_price.cents(),
            gift: item.gift,
        }
    }
}

impl ItemResponse {
    fn new(item: CartItem, cart_url: String) -> Self {
        Self {
            code: item.code.to_string(),
            quantity: item.quantity,
            cart_url,
        }
    }
}

// -- Helpers --

/// Decodes a path segment into a cart ID and returns it with its canonical
/// text form. Aliases such as `01` or `+1` resolve to the same key as `1`,
/// and every cache operation and self-URL uses that key.
fn parse_cart_id(id: &str) -> Result<(CartId, String), ApiError> {
    id.parse::<CartId>()
        .ok()
        .filter(CartId::is_valid)
        .map(|cart_id| (cart_id, cart_id.to_string()))
        .ok_or_else(|| ApiError::NotFound(format!("Cart not found: {id}")))
}

/// Returns a conditional header as text. A value that is not valid text is
/// treated as naming no known tag.
fn conditional_header<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .map(|value| value.to_str().unwrap_or_default())
}

/// Rejects a write whose `If-Match` header does not name the current tag of
/// the cart. Requests without `If-Match` are unconditional.
fn require_current(state: &AppState, headers: &HeaderMap, key: &str) -> Result<(), ApiError> {
    match conditional_header(headers, &IF_MATCH) {
        Some(value) if !state.cache.matches_header(value, key) => {
            tracing::debug!(cart_id = key, if_match = value, "precondition failed");
            Err(ApiError::PreconditionFailed)
        }
        _ => Ok(()),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Prices the cart, tags its representation and caches it.
///
/// The cache epoch is taken before the cart is read, so a write that lands
/// in between makes the cache drop this representation.
fn fresh_representation(
    state: &AppState,
    key: &str,
    cart_id: CartId,
) -> Result<Tagged<CartResponse>, ApiError> {
    let read_at = state.cache.epoch();
    let priced = state.service.get_cart(cart_id)?;
    let representation = CartResponse::from_priced(&priced, state.config.cart_url(key));
    let tagged = Tagged::json(CART_KIND, representation)?;
    if !state.cache.put(key, tagged.clone(), read_at) {
        tracing::debug!(cart_id = key, "representation not cached");
    }
    Ok(tagged)
}

fn tagged_response(status: StatusCode, tagged: Tagged<CartResponse>) -> Result<Response, ApiError> {
    let etag = header_value(tagged.tag.as_str())?;
    Ok((status, [(ETAG, etag)], Json(tagged.payload)).into_response())
}

// -- Handlers --

/// POST /carts: create an empty cart.
#[tracing::instrument(skip(state))]
pub async fn create(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let cart_id = state.service.create_cart()?;
    let key = cart_id.to_string();

    let tagged = fresh_representation(&state, &key, cart_id)?;
    let location = header_value(&tagged.payload.url)?;

    let mut response = tagged_response(StatusCode::CREATED, tagged)?;
    response.headers_mut().insert(LOCATION, location);
    Ok(response)
}

/// GET /carts/{id}: return the priced cart, or 304 if `If-None-Match`
/// names its current tag.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (cart_id, key) = parse_cart_id(&id)?;

    if let Some(value) = conditional_header(&headers, &IF_NONE_MATCH)
        && let Some(cached) =
            EntityTag::candidates(value).find_map(|tag| state.cache.lookup(tag, &key))
    {
        metrics::counter!("http_not_modified_total").increment(1);
        let etag = header_value(cached.tag.as_str())?;
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, etag)]).into_response());
    }

    let tagged = fresh_representation(&state, &key, cart_id)?;
    tagged_response(StatusCode::OK, tagged)
}

/// DELETE /carts/{id}: delete a cart. Deleting a missing cart succeeds.
#[tracing::instrument(skip(state, headers))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let (cart_id, key) = parse_cart_id(&id)?;
    require_current(&state, &headers, &key)?;

    state.service.delete_cart(cart_id)?;
    state.cache.evict(&key);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /carts/{id}/items: add an article to a cart.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let (cart_id, key) = parse_cart_id(&id)?;
    require_current(&state, &headers, &key)?;

    let item = state
        .service
        .add_article_to_cart(cart_id, &req.code, req.quantity)?;
    state.cache.evict(&key);

    let response = ItemResponse::new(item, state.config.cart_url(&key));
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /carts/{id}/items: replace the quantity of a line item.
#[tracing::instrument(skip(state, headers, req))]
pub async fn set_item_quantity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let (cart_id, key) = parse_cart_id(&id)?;
    require_current(&state, &headers, &key)?;

    let item = state
        .service
        .set_article_quantity(cart_id, &req.code, req.quantity)?;
    state.cache.evict(&key);

    Ok(Json(ItemResponse::new(item, state.config.cart_url(&key))))
}
