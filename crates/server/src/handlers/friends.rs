//! Friend endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::friends::RequestOutcome;
use crate::handlers::require_user;
use crate::users::UserSummary;
use crate::AppState;

/// Bootstrap payload for the friends page.
#[derive(Debug, Serialize)]
pub struct FriendsOverview {
    pub friends: Vec<UserSummary>,
    pub all_users: Vec<UserSummary>,
    pub requests: Vec<UserSummary>,
    pub suggested: Vec<UserSummary>,
    pub current_user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FriendActionBody {
    pub friend_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActionMessage {
    pub message: String,
}

fn required_friend_id(body: &FriendActionBody) -> ApiResult<i64> {
    body.friend_id
        .ok_or_else(|| ApiError::BadRequest("friend_id is required".to_string()))
}

/// GET /api/friends
pub async fn friends_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<FriendsOverview>> {
    let user_id = require_user(&state, &headers).await?;

    let friends = state.friends.list_friends(user_id).await?;
    let requests = state.friends.list_pending_requests(user_id).await?;
    let suggested = state.friends.list_suggestions(user_id).await?;
    let all_users = state.users.list_except(user_id).await?;

    Ok(Json(FriendsOverview {
        friends,
        all_users,
        requests,
        suggested,
        current_user_id: user_id,
    }))
}

/// POST /api/add_friend
pub async fn add_friend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FriendActionBody>,
) -> ApiResult<Json<ActionMessage>> {
    let user_id = require_user(&state, &headers).await?;
    let friend_id = required_friend_id(&body)?;

    let message = match state.friends.request_friend(user_id, friend_id).await? {
        RequestOutcome::Requested => "Friend request sent.",
        RequestOutcome::AlreadyLinked => "Friend request already exists.",
        RequestOutcome::SelfReference => "Cannot send a friend request to yourself.",
    };

    Ok(Json(ActionMessage {
        message: message.to_string(),
    }))
}

/// POST /api/accept_friend
pub async fn accept_friend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FriendActionBody>,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&state, &headers).await?;
    let friend_id = required_friend_id(&body)?;

    // Accepting with no pending request is a no-op by contract.
    state.friends.accept_friend(user_id, friend_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
