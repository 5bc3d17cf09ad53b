//! Sales service routes

use super::envelope::{parse_quantity, reply, respond};
use super::{HttpOptions, MaybeRecord};
use crate::core::SalesCoordinator;
use crate::types::ShopError;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

#[derive(Clone, Debug)]
pub struct SalesState {
    pub sales: SalesCoordinator,
    pub options: HttpOptions,
}

/// Build the sales service router
///
/// `with_good_lookup` adds `GET /api/goods/:name`. Leave it off when the router
/// is merged with the inventory router, which already serves that path.
pub fn router(state: SalesState, with_good_lookup: bool) -> Router {
    let mut router = Router::new()
        .route("/api/prices", get(prices))
        .route("/api/sale/:target", post(sale))
        .route("/api/history/:username", get(history));
    if with_good_lookup {
        router = router.route("/api/goods/:name", get(good));
    }
    router.with_state(state)
}

/// Split the legacy `<username>,<name>` path segment
///
/// Usernames cannot contain a comma; good names can.
pub fn split_target(target: &str) -> Result<(&str, &str), ShopError> {
    match target.split_once(',') {
        Some((username, name)) if !username.is_empty() && !name.is_empty() => Ok((username, name)),
        _ => Err(ShopError::bad_request(format!(
            "expected <username>,<name>, got '{target}'"
        ))),
    }
}

/// GET /api/prices
async fn prices(State(state): State<SalesState>) -> Response {
    reply(&state.options, state.sales.prices().await)
}

/// GET /api/goods/:name
async fn good(State(state): State<SalesState>, Path(name): Path<String>) -> Response {
    let result = state.sales.good(&name).await.map(MaybeRecord);
    reply(&state.options, result)
}

/// POST /api/sale/:username,:name
///
/// The optional body is the quantity, one unit when absent.
async fn sale(State(state): State<SalesState>, Path(target): Path<String>, body: Bytes) -> Response {
    let result = match split_target(&target) {
        Ok((username, name)) => match parse_quantity(&body) {
            Ok(quantity) => state.sales.purchase(username, name, quantity).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    respond(&state.options, "Purchase successful", result)
}

/// GET /api/history/:username
async fn history(State(state): State<SalesState>, Path(username): Path<String>) -> Response {
    reply(&state.options, Ok(state.sales.get_history(&username)))
}
