//! Inventory service routes

use super::envelope::{decode_json, parse_quantity, reply, respond};
use super::{HttpOptions, MaybeRecord};
use crate::core::InventoryApi;
use crate::types::GoodInput;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct InventoryState {
    pub inventory: Arc<dyn InventoryApi>,
    pub options: HttpOptions,
}

/// Build the inventory service router
pub fn router(state: InventoryState) -> Router {
    Router::new()
        .route("/api/goods", get(list_goods))
        .route("/api/goods/:name", get(get_good))
        .route("/api/goods/add", post(add_good))
        .route("/api/goods/update", put(update_good))
        .route("/api/goods/deduce/:name", put(reserve))
        .with_state(state)
}

/// GET /api/goods
async fn list_goods(State(state): State<InventoryState>) -> Response {
    reply(&state.options, state.inventory.list().await)
}

/// GET /api/goods/:name
async fn get_good(State(state): State<InventoryState>, Path(name): Path<String>) -> Response {
    let result = state.inventory.lookup(&name).await.map(MaybeRecord);
    reply(&state.options, result)
}

/// POST /api/goods/add
async fn add_good(State(state): State<InventoryState>, body: Bytes) -> Response {
    let result = match decode_json::<GoodInput>(&body) {
        Ok(good) => state.inventory.add(good).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successful Registration", result)
}

/// PUT /api/goods/update
async fn update_good(State(state): State<InventoryState>, body: Bytes) -> Response {
    let result = match decode_json::<GoodInput>(&body) {
        Ok(good) => state.inventory.update(good).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successfully updated good", result)
}

/// PUT /api/goods/deduce/:name
///
/// The body is the quantity; an empty body reserves one unit.
async fn reserve(
    State(state): State<InventoryState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let result = match parse_quantity(&body) {
        Ok(quantity) => state.inventory.reserve(&name, quantity).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successfully deduced item", result)
}
