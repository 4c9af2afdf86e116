//! HTTP handlers for the bootstrap/poll API
//!
//! Clients fetch full state here; the realtime channel only pushes deltas.

pub mod friends;
pub mod messages;

pub use friends::{accept_friend, add_friend, friends_overview};
pub use messages::conversation_history;

use axum::http::HeaderMap;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Extract the bearer token from the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Resolve the calling user from the request headers or fail with 401.
pub(crate) async fn require_user(state: &AppState, headers: &HeaderMap) -> ApiResult<i64> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthenticated)?;
    state
        .sessions
        .validate(&token)
        .await?
        .ok_or(ApiError::Unauthenticated)
}
