//! Account service routes

use super::envelope::{decode_json, parse_amount, reply, respond};
use super::{HttpOptions, MaybeRecord};
use crate::core::AccountApi;
use crate::types::UserProfile;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AccountState {
    pub accounts: Arc<dyn AccountApi>,
    pub options: HttpOptions,
}

/// Build the account service router
pub fn router(state: AccountState) -> Router {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/:username", get(get_user))
        .route("/api/users/add", post(register))
        .route("/api/users/update", put(update_user))
        .route("/api/users/delete/:username", delete(delete_user))
        .route("/api/users/charge/:username", put(charge))
        .route("/api/users/deduce/:username", put(deduce))
        .with_state(state)
}

/// GET /api/users
async fn list_users(State(state): State<AccountState>) -> Response {
    reply(&state.options, state.accounts.list().await)
}

/// GET /api/users/:username
async fn get_user(State(state): State<AccountState>, Path(username): Path<String>) -> Response {
    let result = state.accounts.lookup(&username).await.map(MaybeRecord);
    reply(&state.options, result)
}

/// POST /api/users/add
async fn register(State(state): State<AccountState>, body: Bytes) -> Response {
    let result = match decode_json::<UserProfile>(&body) {
        Ok(profile) => state.accounts.register(profile).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successful Registration", result)
}

/// PUT /api/users/update
async fn update_user(State(state): State<AccountState>, body: Bytes) -> Response {
    let result = match decode_json::<UserProfile>(&body) {
        Ok(profile) => state.accounts.update(profile).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successfully updated customer", result)
}

/// DELETE /api/users/delete/:username
async fn delete_user(State(state): State<AccountState>, Path(username): Path<String>) -> Response {
    let result = state
        .accounts
        .delete(&username)
        .await
        .map(|()| Value::Object(Map::new()));
    respond(&state.options, "User deleted successfully", result)
}

/// PUT /api/users/charge/:username
async fn charge(
    State(state): State<AccountState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Response {
    let result = match parse_amount(&body) {
        Ok(amount) => state.accounts.credit(&username, amount).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successfully charged!", result)
}

/// PUT /api/users/deduce/:username
async fn deduce(
    State(state): State<AccountState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Response {
    let result = match parse_amount(&body) {
        Ok(amount) => state.accounts.debit(&username, amount).await,
        Err(e) => Err(e),
    };
    respond(&state.options, "Successfully reduced!", result)
}
